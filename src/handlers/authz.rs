// src/handlers/authz.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::{context::RequestContext, error::AppError},
    config::AppState,
    models::{
        membership::Membership,
        rbac::{Action, ResourceType},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFilter {
    /// `org` ou `project`; ausente = todas
    #[param(value_type = Option<String>)]
    pub resource_type: Option<ResourceType>,
}

// GET /api/me/memberships
#[utoipa::path(
    get,
    path = "/api/me/memberships",
    tag = "Authorization",
    params(MembershipFilter),
    responses((status = 200, description = "Relações do usuário", body = [Membership])),
    security(("user_id" = []))
)]
pub async fn list_my_memberships(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(filter): Query<MembershipFilter>,
) -> Result<impl IntoResponse, AppError> {
    let manager = &app_state.membership_manager;
    let memberships = match filter.resource_type {
        None => manager.get_user_memberships(&ctx, &ctx.user_id).await?,
        Some(ResourceType::Org) => manager.get_user_org_memberships(&ctx, &ctx.user_id).await?,
        Some(ResourceType::Project) => {
            manager
                .get_user_project_memberships(&ctx, &ctx.user_id)
                .await?
        }
    };
    Ok(Json(memberships))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    #[param(value_type = String, example = "view")]
    pub action: Action,
    #[param(example = "project")]
    pub resource_type: String,
    pub resource_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResponse {
    pub allowed: bool,
}

// GET /api/authz/check — usado por gateways que não querem lógica por tipo de recurso
#[utoipa::path(
    get,
    path = "/api/authz/check",
    tag = "Authorization",
    params(CheckQuery),
    responses((status = 200, description = "Decisão de acesso", body = CheckResponse)),
    security(("user_id" = []))
)]
pub async fn check(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<CheckQuery>,
) -> Result<impl IntoResponse, AppError> {
    let allowed = app_state
        .authorizer
        .check_raw(
            &ctx,
            &ctx.user_id,
            query.action,
            &query.resource_type,
            &query.resource_id,
        )
        .await?;
    Ok(Json(CheckResponse { allowed }))
}
