// src/models/membership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::{ResourceRef, ResourceType, Role};

// ---
// Membership (a "relação")
// ---
// Liga um usuário a uma organização ou projeto com um papel.
// No máximo uma linha por (user_id, resource_type, resource_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    #[schema(example = "user-123")]
    pub user_id: String,
    pub resource_type: ResourceType,
    pub resource_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invited_by: Option<String>,
}

impl Membership {
    pub fn resource(&self) -> ResourceRef {
        ResourceRef::new(self.resource_type, self.resource_id)
    }
}

/// Dados para inserir uma nova relação. Id e timestamps são do servidor.
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub user_id: String,
    pub resource: ResourceRef,
    pub role: Role,
    pub invited_by: Option<String>,
}

/// Fotografia consistente usada para resolver o papel num projeto.
/// Tudo lido no mesmo snapshot (uma query ou uma transação).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProjectAccess {
    /// Papel explícito do usuário no projeto, se existir.
    pub explicit_role: Option<Role>,
    /// Se o projeto tem QUALQUER membro explícito (de qualquer usuário).
    pub has_explicit_members: bool,
    /// Papel do usuário na organização dona do projeto.
    pub org_role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    #[validate(length(min = 1, message = "O id do usuário é obrigatório."))]
    #[schema(example = "user-456")]
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRolePayload {
    pub role: Role,
}
