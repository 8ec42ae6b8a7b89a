// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::identity_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Tudo abaixo exige a identidade do chamador
    let org_routes = Router::new()
        .route(
            "/",
            post(handlers::organizations::create_org).get(handlers::organizations::list_my_orgs),
        )
        .route(
            "/{org_id}",
            get(handlers::organizations::get_org)
                .patch(handlers::organizations::update_org)
                .delete(handlers::organizations::delete_org),
        )
        .route(
            "/{org_id}/members",
            get(handlers::organizations::list_org_members)
                .post(handlers::organizations::add_org_member),
        )
        .route(
            "/{org_id}/members/{user_id}",
            axum::routing::patch(handlers::organizations::update_org_member_role)
                .delete(handlers::organizations::remove_org_member),
        )
        .route(
            "/{org_id}/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_org_projects),
        );

    let project_routes = Router::new()
        .route("/", get(handlers::projects::list_my_projects))
        .route(
            "/{project_id}",
            get(handlers::projects::get_project)
                .patch(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/{project_id}/members",
            get(handlers::projects::list_project_members)
                .post(handlers::projects::add_project_member),
        )
        .route(
            "/{project_id}/members/{user_id}",
            axum::routing::patch(handlers::projects::update_project_member_role)
                .delete(handlers::projects::remove_project_member),
        );

    let protected = Router::new()
        .nest("/api/orgs", org_routes)
        .nest("/api/projects", project_routes)
        .route("/api/me/memberships", get(handlers::authz::list_my_memberships))
        .route("/api/authz/check", get(handlers::authz::check))
        .layer(axum_middleware::from_fn(identity_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(protected)
        .with_state(app_state)
}
