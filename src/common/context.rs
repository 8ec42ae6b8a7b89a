// src/common/context.rs

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::common::error::AppError;

/// Contexto de uma requisição: quem está chamando e o token de cancelamento.
/// Atravessa todas as chamadas (service -> authorizer -> store).
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: String,
    token: CancellationToken,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_token(user_id, CancellationToken::new())
    }

    pub fn with_token(user_id: impl Into<String>, token: CancellationToken) -> Self {
        Self {
            user_id: user_id.into(),
            token,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Falha logo se o contexto já foi cancelado.
    pub fn ensure_active(&self) -> Result<(), AppError> {
        if self.token.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    /// Executa uma chamada ao store, abortando se o contexto for cancelado.
    /// Cancelamento vira `AppError::Cancelled`, nunca um "sem acesso".
    pub async fn run<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        self.ensure_active()?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}
