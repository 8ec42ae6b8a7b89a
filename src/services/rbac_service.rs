// src/services/rbac_service.rs

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::{context::RequestContext, error::AppError};
use crate::db::store::MembershipStore;
use crate::models::{
    membership::ProjectAccess,
    rbac::{Action, ResourceRef, ResourceType, Role},
};
use crate::services::permissions::{has_permission, map_org_role_to_project_role};

/// Capacidade de decisão de acesso. Os services dependem só deste trait,
/// então um motor de grafo de relações pode substituir o `SimpleAuthorizer`.
///
/// `Ok(None)` / `Ok(false)` significam "sem relação"; `Err` significa que a
/// consulta falhou, e os dois casos nunca se confundem.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn get_org_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        org_id: Uuid,
    ) -> Result<Option<Role>, AppError>;

    /// Projeto inexistente retorna `AppError::NotFound`, não "sem acesso".
    async fn get_project_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<Role>, AppError>;

    async fn can_access_org(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        org_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self.get_org_role(ctx, user_id, org_id).await?.is_some())
    }

    async fn can_perform_org_action(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        org_id: Uuid,
        action: Action,
    ) -> Result<bool, AppError> {
        Ok(self
            .get_org_role(ctx, user_id, org_id)
            .await?
            .is_some_and(|role| has_permission(ResourceType::Org, role, action)))
    }

    async fn can_access_project(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self
            .get_project_role(ctx, user_id, project_id)
            .await?
            .is_some())
    }

    async fn can_perform_project_action(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
        action: Action,
    ) -> Result<bool, AppError> {
        Ok(self
            .get_project_role(ctx, user_id, project_id)
            .await?
            .is_some_and(|role| has_permission(ResourceType::Project, role, action)))
    }

    /// Ponto de entrada genérico para middlewares.
    /// Recurso inexistente é simplesmente "sem acesso"; falhas de consulta
    /// e cancelamento são propagados.
    async fn check(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        action: Action,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        let decision = match resource {
            ResourceRef::Org(id) => self.can_perform_org_action(ctx, user_id, id, action).await,
            ResourceRef::Project(id) => {
                self.can_perform_project_action(ctx, user_id, id, action)
                    .await
            }
        };

        match decision {
            Err(AppError::NotFound(_)) => Ok(false),
            other => other,
        }
    }

    /// Variante não tipada de `check`; tipo ou id inválidos resultam em `false`.
    async fn check_raw(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        action: Action,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<bool, AppError> {
        match ResourceRef::parse(resource_type, resource_id) {
            Some(resource) => self.check(ctx, user_id, action, resource).await,
            None => Ok(false),
        }
    }
}

/// Resolve o papel efetivo num projeto a partir de um snapshot consistente.
///
/// 1. Relação explícita no projeto: vale como está, sem mapeamento.
/// 2. Projeto com QUALQUER membro explícito está fechado: quem não é membro
///    explícito não tem acesso, mesmo sendo da organização.
/// 3. Projeto sem membros explícitos está aberto: herda o papel da org,
///    rebaixado por `map_org_role_to_project_role`.
pub fn resolve_project_role(access: ProjectAccess) -> Option<Role> {
    if let Some(role) = access.explicit_role {
        return Some(role);
    }
    if access.has_explicit_members {
        return None;
    }
    access.org_role.map(map_org_role_to_project_role)
}

/// Authorizer apoiado diretamente no store de relações.
#[derive(Clone)]
pub struct SimpleAuthorizer {
    memberships: Arc<dyn MembershipStore>,
}

impl SimpleAuthorizer {
    pub fn new(memberships: Arc<dyn MembershipStore>) -> Self {
        Self { memberships }
    }
}

#[async_trait]
impl Authorizer for SimpleAuthorizer {
    async fn get_org_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        org_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let role = self
            .memberships
            .get(ctx, user_id, ResourceRef::Org(org_id))
            .await?
            .map(|m| m.role);

        tracing::debug!(user_id, %org_id, ?role, "papel na organização resolvido");
        Ok(role)
    }

    async fn get_project_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let access = self
            .memberships
            .project_access(ctx, user_id, project_id)
            .await?
            .ok_or_else(|| AppError::not_found("projeto"))?;

        let role = resolve_project_role(access);
        tracing::debug!(user_id, %project_id, ?access, ?role, "papel no projeto resolvido");
        Ok(role)
    }
}
