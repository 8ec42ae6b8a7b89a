use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Permissão negada")]
    Forbidden,

    #[error("Não encontrado: {0}")]
    NotFound(String),

    #[error("Já existe: {0}")]
    AlreadyExists(String),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Você não pode remover a sua própria associação")]
    CannotRemoveSelf,

    #[error("Requisição cancelada")]
    Cancelled,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Categorias estáveis que a camada HTTP (ou qualquer chamador) usa para decidir a resposta.
/// O texto das mensagens não faz parte do contrato.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Forbidden,
    NotFound,
    AlreadyExists,
    InvalidInput,
    CannotRemoveSelf,
    Cancelled,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AppError::CannotRemoveSelf => ErrorKind::CannotRemoveSelf,
            AppError::Cancelled => ErrorKind::Cancelled,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    pub fn already_exists(what: impl Into<String>) -> Self {
        AppError::AlreadyExists(what.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::AlreadyExists(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::CannotRemoveSelf => (StatusCode::BAD_REQUEST, self.to_string()),
            // 499: o cliente desistiu da requisição
            AppError::Cancelled => (
                StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT),
                self.to_string(),
            ),

            // Todos os outros erros viram 500. O detalhe vai para o log, não para o cliente.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": format!("{:?}", self.kind()),
        }));
        (status, body).into_response()
    }
}

/// Converte violação de unicidade do banco em `AlreadyExists`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::AlreadyExists(what.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn validation_errors_are_invalid_input() {
        let err: AppError = Named { name: String::new() }.validate().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn kinds_map_to_distinct_statuses() {
        let statuses: Vec<StatusCode> = vec![
            AppError::Forbidden,
            AppError::not_found("org"),
            AppError::already_exists("slug"),
            AppError::invalid_input("x"),
            AppError::Cancelled,
        ]
        .into_iter()
        .map(|e| e.into_response().status())
        .collect();

        assert_eq!(
            statuses,
            vec![
                StatusCode::FORBIDDEN,
                StatusCode::NOT_FOUND,
                StatusCode::CONFLICT,
                StatusCode::BAD_REQUEST,
                StatusCode::from_u16(499).unwrap(),
            ]
        );
        assert_eq!(
            AppError::CannotRemoveSelf.kind(),
            ErrorKind::CannotRemoveSelf
        );
    }
}
