// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::common::context::RequestContext;

// A autenticação acontece antes deste serviço (gateway/proxy);
// aqui só recebemos a identidade já estabelecida.
pub const USER_ID_HEADER: &str = "x-user-id";

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Usuário não autenticado." })),
    )
        .into_response()
}

/// Lê a identidade do cabeçalho e cria o `RequestContext` da requisição.
pub async fn identity_guard(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let Some(user_id) = user_id else {
        return unauthorized();
    };

    let ctx = RequestContext::new(user_id);
    // Se o cliente desconectar, o axum descarta este future e o guard cancela o token.
    let cancel_on_drop = ctx.token().clone().drop_guard();

    request.extensions_mut().insert(ctx);

    let response = next.run(request).await;
    let _ = cancel_on_drop.disarm();
    response
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}
