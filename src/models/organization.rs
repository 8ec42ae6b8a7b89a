// src/models/organization.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::rbac::Role;

// ---
// Organization (o nível de cima da hierarquia)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    #[schema(example = "Acme")]
    pub name: String,
    /// Único entre todas as organizações (case-sensitive).
    #[schema(example = "acme")]
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
pub struct CreateOrgPayload {
    #[validate(length(min = 1, message = "O nome da organização é obrigatório."))]
    #[schema(example = "Acme")]
    pub name: String,

    #[validate(length(min = 1, message = "O slug da organização é obrigatório."))]
    #[schema(example = "acme")]
    pub slug: String,

    pub description: Option<String>,
}

/// Campos omitidos não são alterados. O slug é imutável.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrgPayload {
    #[validate(length(min = 1, message = "O nome da organização não pode ser vazio."))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgWithRole {
    #[serde(flatten)]
    pub organization: Organization,
    pub role: Option<Role>,
}
