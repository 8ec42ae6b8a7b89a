// src/handlers/projects.rs

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
        project::{CreateProjectPayload, Project, ProjectWithRole, UpdateProjectPayload},
    },
};

// POST /api/orgs/{org_id}/projects
#[utoipa::path(
    post,
    path = "/api/orgs/{org_id}/projects",
    tag = "Projects",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Projeto criado, aberto para a organização", body = Project),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão"),
        (status = 409, description = "Slug já em uso na organização")
    ),
    security(("user_id" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state
        .project_service
        .create_project(&ctx, org_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/orgs/{org_id}/projects
#[utoipa::path(
    get,
    path = "/api/orgs/{org_id}/projects",
    tag = "Projects",
    params(("org_id" = Uuid, Path, description = "ID da organização")),
    responses(
        (status = 200, description = "Projetos acessíveis da organização", body = [ProjectWithRole]),
        (status = 403, description = "Sem acesso à organização")
    ),
    security(("user_id" = []))
)]
pub async fn list_org_projects(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(org_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state
        .project_service
        .list_org_projects_with_role(&ctx, org_id)
        .await?;
    Ok(Json(projects))
}

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses((status = 200, description = "Projetos visíveis ao usuário", body = [ProjectWithRole])),
    security(("user_id" = []))
)]
pub async fn list_my_projects(
    State(app_state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state
        .project_service
        .list_user_projects_with_role(&ctx)
        .await?;
    Ok(Json(projects))
}

// GET /api/projects/{project_id}
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(("project_id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "OK", body = Project),
        (status = 403, description = "Sem acesso"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.get_project(&ctx, project_id).await?;
    Ok(Json(project))
}

// PATCH /api/projects/{project_id}
#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(("project_id" = Uuid, Path, description = "ID do projeto")),
    request_body = UpdateProjectPayload,
    responses(
        (status = 200, description = "OK", body = Project),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state
        .project_service
        .update_project(&ctx, project_id, payload)
        .await?;
    Ok(Json(project))
}

// DELETE /api/projects/{project_id}
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    tag = "Projects",
    params(("project_id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 204, description = "Removido"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_service
        .delete_project(&ctx, project_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/projects/{project_id}/members
#[utoipa::path(
    get,
    path = "/api/projects/{project_id}/members",
    tag = "Projects",
    params(("project_id" = Uuid, Path, description = "ID do projeto")),
    responses(
        (status = 200, description = "Membros explícitos do projeto", body = [Membership]),
        (status = 403, description = "Sem permissão")
    ),
    security(("user_id" = []))
)]
pub async fn list_project_members(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state
        .project_service
        .list_project_members(&ctx, project_id)
        .await?;
    Ok(Json(members))
}

// POST /api/projects/{project_id}/members
#[utoipa::path(
    post,
    path = "/api/projects/{project_id}/members",
    tag = "Projects",
    params(("project_id" = Uuid, Path, description = "ID do projeto")),
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Membro adicionado; o projeto passa a ser fechado", body = Membership),
        (status = 400, description = "Papel owner ou usuário fora da organização"),
        (status = 403, description = "Sem permissão"),
        (status = 409, description = "Usuário já é membro")
    ),
    security(("user_id" = []))
)]
pub async fn add_project_member(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let membership = app_state
        .project_service
        .add_project_member(&ctx, project_id, &payload.user_id, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

// PATCH /api/projects/{project_id}/members/{user_id}
#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}/members/{user_id}",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "ID do projeto"),
        ("user_id" = String, Path, description = "Usuário alvo")
    ),
    request_body = UpdateMemberRolePayload,
    responses(
        (status = 200, description = "OK", body = Membership),
        (status = 400, description = "Papel owner"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn update_project_member_role(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path((project_id, user_id)): Path<(Uuid, String)>,
    Json(payload): Json<UpdateMemberRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let membership = app_state
        .project_service
        .update_project_member_role(&ctx, project_id, &user_id, payload.role)
        .await?;
    Ok(Json(membership))
}

// DELETE /api/projects/{project_id}/members/{user_id}
#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}/members/{user_id}",
    tag = "Projects",
    params(
        ("project_id" = Uuid, Path, description = "ID do projeto"),
        ("user_id" = String, Path, description = "Usuário alvo")
    ),
    responses(
        (status = 204, description = "Removido"),
        (status = 400, description = "Remoção de si mesmo"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("user_id" = []))
)]
pub async fn remove_project_member(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    Path((project_id, user_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .project_service
        .remove_project_member(&ctx, project_id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
