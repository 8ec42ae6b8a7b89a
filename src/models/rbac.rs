// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

/// Papéis possíveis numa relação usuário -> recurso.
/// A ordem de privilégio é owner > admin > member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// Nível numérico de privilégio (maior = mais privilégio).
    pub fn rank(&self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Admin => 2,
            Role::Member => 1,
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(AppError::InvalidInput(format!("Papel desconhecido: '{}'", other))),
        }
    }
}

/// Ações verificadas pela matriz de permissões.
/// `Manage` = administração de membros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Org,
    Project,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Org => "org",
            ResourceType::Project => "project",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "org" => Ok(ResourceType::Org),
            "project" => Ok(ResourceType::Project),
            other => Err(AppError::InvalidInput(format!(
                "Tipo de recurso desconhecido: '{}'",
                other
            ))),
        }
    }
}

/// Referência tipada a um recurso: o tipo e o id andam juntos,
/// então um tipo inválido não é representável.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Org(Uuid),
    Project(Uuid),
}

impl ResourceRef {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceRef::Org(_) => ResourceType::Org,
            ResourceRef::Project(_) => ResourceType::Project,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            ResourceRef::Org(id) | ResourceRef::Project(id) => *id,
        }
    }

    pub fn new(resource_type: ResourceType, id: Uuid) -> Self {
        match resource_type {
            ResourceType::Org => ResourceRef::Org(id),
            ResourceType::Project => ResourceRef::Project(id),
        }
    }

    /// Converte o par (tipo, id) vindo de fora (rotas, headers).
    /// Retorna `None` para tipos ou ids inválidos.
    pub fn parse(resource_type: &str, id: &str) -> Option<Self> {
        let resource_type = resource_type.parse::<ResourceType>().ok()?;
        let id = Uuid::parse_str(id).ok()?;
        Some(Self::new(resource_type, id))
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_follows_privilege() {
        assert!(Role::Owner > Role::Admin);
        assert!(Role::Admin > Role::Member);
        assert_eq!(Role::Owner.max(Role::Member), Role::Owner);
    }

    #[test]
    fn role_parses_only_known_values() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("Admin".parse::<Role>().is_err());
        assert!("viewer".parse::<Role>().is_err());
    }

    #[test]
    fn resource_ref_parse_rejects_unknown_types() {
        let id = Uuid::new_v4();
        assert_eq!(
            ResourceRef::parse("project", &id.to_string()),
            Some(ResourceRef::Project(id))
        );
        assert_eq!(ResourceRef::parse("team", &id.to_string()), None);
        assert_eq!(ResourceRef::parse("org", "not-a-uuid"), None);
    }
}
