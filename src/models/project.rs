// src/models/project.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::Role;

// ---
// Project (sempre dentro de uma organização)
// ---
// Não tem dono: o acesso é explícito (memberships do projeto) ou herdado da org.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    /// Imutável depois da criação.
    pub organization_id: Uuid,
    #[schema(example = "Web")]
    pub name: String,
    /// Único dentro da organização, não globalmente.
    #[schema(example = "web")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "O nome do projeto é obrigatório."))]
    #[schema(example = "Web")]
    pub name: String,

    #[validate(length(min = 1, message = "O slug do projeto é obrigatório."))]
    #[schema(example = "web")]
    pub slug: String,

    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, message = "O nome do projeto não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithRole {
    #[serde(flatten)]
    pub project: Project,
    /// `None` quando a listagem mostra o projeto mas o usuário não resolve papel
    /// (dono da org vendo projeto fechado).
    pub role: Option<Role>,
}
