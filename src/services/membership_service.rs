// src/services/membership_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::common::{context::RequestContext, error::AppError};
use crate::db::store::MembershipStore;
use crate::models::{
    membership::{Membership, NewMembership},
    rbac::{ResourceRef, ResourceType, Role},
};

/// API de escrita das relações. NÃO faz checagem de permissão: quem chama
/// (os services) verifica antes. Assim o backend pode virar um serviço de
/// grafo de relações sem mexer nos chamadores.
#[derive(Clone)]
pub struct MembershipManager {
    store: Arc<dyn MembershipStore>,
}

impl MembershipManager {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn MembershipStore {
        self.store.as_ref()
    }

    /// Falha com `AlreadyExists` se a tupla já existe.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
        invited_by: Option<&str>,
    ) -> Result<Membership, AppError> {
        let membership = self
            .store
            .insert(
                ctx,
                NewMembership {
                    user_id: user_id.to_string(),
                    resource,
                    role,
                    invited_by: invited_by.map(str::to_string),
                },
            )
            .await?;

        tracing::info!(user_id, %resource, %role, "associação criada");
        Ok(membership)
    }

    /// Falha com `NotFound` se não há relação.
    pub async fn update_member_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
    ) -> Result<Membership, AppError> {
        let membership = self
            .store
            .update_role(ctx, user_id, resource, role)
            .await?
            .ok_or_else(|| AppError::not_found("associação"))?;

        tracing::info!(user_id, %resource, %role, "papel atualizado");
        Ok(membership)
    }

    /// Falha com `NotFound` se não há relação. Para idempotência, o chamador
    /// deve tratar `NotFound` como "já removido".
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<(), AppError> {
        if !self.store.delete(ctx, user_id, resource).await? {
            return Err(AppError::not_found("associação"));
        }

        tracing::info!(user_id, %resource, "associação removida");
        Ok(())
    }

    pub async fn get_membership(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<Option<Membership>, AppError> {
        self.store.get(ctx, user_id, resource).await
    }

    pub async fn get_user_memberships(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Membership>, AppError> {
        self.store.list_for_user(ctx, user_id, None).await
    }

    pub async fn get_user_org_memberships(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Membership>, AppError> {
        self.store
            .list_for_user(ctx, user_id, Some(ResourceType::Org))
            .await
    }

    pub async fn get_user_project_memberships(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Membership>, AppError> {
        self.store
            .list_for_user(ctx, user_id, Some(ResourceType::Project))
            .await
    }

    pub async fn get_resource_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<Membership>, AppError> {
        self.store.list_for_resource(ctx, resource).await
    }

    /// Ausência não é erro: retorna `false`.
    pub async fn is_member(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        Ok(self.store.get(ctx, user_id, resource).await?.is_some())
    }

    pub async fn has_any_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        self.store.has_any_members(ctx, resource).await
    }

    pub async fn org_owner(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        Ok(self
            .store
            .list_for_resource(ctx, ResourceRef::Org(org_id))
            .await?
            .into_iter()
            .find(|m| m.role == Role::Owner))
    }
}
