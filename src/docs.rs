// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Organizations ---
        handlers::organizations::create_org,
        handlers::organizations::list_my_orgs,
        handlers::organizations::get_org,
        handlers::organizations::update_org,
        handlers::organizations::delete_org,
        handlers::organizations::list_org_members,
        handlers::organizations::add_org_member,
        handlers::organizations::update_org_member_role,
        handlers::organizations::remove_org_member,

        // --- Projects ---
        handlers::projects::create_project,
        handlers::projects::list_org_projects,
        handlers::projects::list_my_projects,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::list_project_members,
        handlers::projects::add_project_member,
        handlers::projects::update_project_member_role,
        handlers::projects::remove_project_member,

        // --- Authorization ---
        handlers::authz::list_my_memberships,
        handlers::authz::check,
    ),
    components(
        schemas(
            models::rbac::Role,
            models::rbac::Action,
            models::rbac::ResourceType,

            models::membership::Membership,
            models::membership::AddMemberPayload,
            models::membership::UpdateMemberRolePayload,

            models::organization::Organization,
            models::organization::CreateOrgPayload,
            models::organization::UpdateOrgPayload,
            models::organization::OrgWithRole,

            models::project::Project,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,
            models::project::ProjectWithRole,

            handlers::authz::CheckResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Organizations", description = "Organizações e seus membros"),
        (name = "Projects", description = "Projetos, herança e membros explícitos"),
        (name = "Authorization", description = "Decisões de acesso")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::middleware::auth::USER_ID_HEADER,
                ))),
            );
        }
    }
}
