// src/handlers/organizations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{context::RequestContext, error::AppError},
    config::AppState,
    models::{
        membership::{AddMemberPayload, Membership, UpdateMemberRolePayload},
        organization::{CreateOrgPayload, OrgWithRole, Organization, UpdateOrgPayload},
    },
};

// POST /api/orgs
#[utoipa::path(
    post,
    path = "/api/orgs",
    tag = "Organizations",
    request_body = CreateOrgPayload,
    responses(
        (status = 201, description = "Organização criada; o chamador vira dono", body = Organization),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Slug já em uso")
    ),
    security(("user_id" = []))
)]
pub async fn create_org(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Json(payload): Json<CreateOrgPayload>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.org_service.create_org(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(org)))
}

// GET /api/orgs
#[utoipa::path(
    get,
    path = "/api/orgs",
    tag = "Organizations",
    responses((status = 200, description = "Organizações do usuário com o papel em cada uma", body = [OrgWithRole])),
    security(("user_id" = []))
)]
pub async fn list_my_orgs(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let orgs = app_state.org_service.list_user_orgs_with_role(&ctx).await?;
    Ok(Json(orgs))
}

// GET /api/orgs/{org_id}
#[utoipa::path(
    get,
    path = "/api/orgs/{org_id}",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    responses(
        (status = 200, description = "OK", body = Organization),
        (status = 403, description = "Sem acesso"),
        (status = 404, description = "Não encontrada")
    ),
    security(("user_id" = []))
)]
pub async fn get_org(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.org_service.get_org(&ctx, org_id).await?;
    Ok(Json(org))
}

// PATCH /api/orgs/{org_id}
#[utoipa::path(
    patch,
    path = "/api/orgs/{org_id}",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    request_body = UpdateOrgPayload,
    responses((status = 200, description = "OK", body = Organization), (status = 403, description = "Sem permissão"), (status = 404, description = "Não encontrado")),
    security(("user_id" = []))
)]
pub async fn update_org(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<UpdateOrgPayload>,
) -> Result<impl IntoResponse, AppError> {
    let org = app_state.org_service.update_org(&ctx, org_id, payload).await?;
    Ok(Json(org))
}

// DELETE /api/orgs/{org_id}
#[utoipa::path(
    delete,
    path = "/api/orgs/{org_id}",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    responses((status = 204, description = "Removido"), (status = 403, description = "Sem permissão"), (status = 404, description = "Não encontrado")),
    security(("user_id" = []))
)]
pub async fn delete_org(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.org_service.delete_org(&ctx, org_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/orgs/{org_id}/members
#[utoipa::path(
    get,
    path = "/api/orgs/{org_id}/members",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    responses((status = 200, description = "OK", body = [Membership]), (status = 403, description = "Sem permissão")),
    security(("user_id" = []))
)]
pub async fn list_org_members(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.org_service.list_org_members(&ctx, org_id).await?;
    Ok(Json(members))
}

// POST /api/orgs/{org_id}/members
#[utoipa::path(
    post,
    path = "/api/orgs/{org_id}/members",
    tag = "Organizations",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Criado", body = Membership),
        (status = 400, description = "Tentativa de adicionar outro dono"),
        (status = 403, description = "Sem permissão"),
        (status = 409, description = "Usuário já é membro")
    ),
    security(("user_id" = []))
)]
pub async fn add_org_member(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let membership = app_state
        .org_service
        .add_org_member(&ctx, org_id, &payload.user_id, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

// PATCH /api/orgs/{org_id}/members/{user_id}
#[utoipa::path(
    patch,
    path = "/api/orgs/{org_id}/members/{user_id}",
    tag = "Organizations",
    params(
        ("org_id" = Uuid, Path, description = "ID da organização"),
        ("user_id" = String, Path, description = "Usuário alvo")
    ),
    request_body = UpdateMemberRolePayload,
    responses((status = 200, description = "OK", body = Membership), (status = 400, description = "Dados inválidos"), (status = 403, description = "Sem permissão"), (status = 404, description = "Não encontrado")),
    security(("user_id" = []))
)]
pub async fn update_org_member_role(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path((org_id, user_id)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateMemberRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .org_service
        .update_org_member_role(&ctx, org_id, &user_id, payload.role)
        .await?;
    Ok(Json(membership))
}

// DELETE /api/orgs/{org_id}/members/{user_id}
#[utoipa::path(
    delete,
    path = "/api/orgs/{org_id}/members/{user_id}",
    tag = "Organizations",
    params(
        ("org_id" = Uuid, Path, description = "ID da organização"),
        ("user_id" = String, Path, description = "Usuário alvo")
    ),
    responses(
        (status = 204, description = "Removido"),
        (status = 400, description = "Remoção do dono ou de si mesmo"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn remove_org_member(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path((org_id, user_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .org_service
        .remove_org_member(&ctx, org_id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
