// src/services/organization_service.rs

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::common::{context::RequestContext, error::AppError};
use crate::db::store::OrganizationStore;
use crate::models::{
    membership::Membership,
    organization::{CreateOrgPayload, OrgWithRole, Organization, UpdateOrgPayload},
    rbac::{Action, ResourceRef, Role},
};
use crate::services::{
    fail_closed, membership_service::MembershipManager, rbac_service::Authorizer,
};

#[derive(Clone)]
pub struct OrganizationService {
    orgs: Arc<dyn OrganizationStore>,
    authz: Arc<dyn Authorizer>,
    members: MembershipManager,
}

impl OrganizationService {
    pub fn new(
        orgs: Arc<dyn OrganizationStore>,
        authz: Arc<dyn Authorizer>,
        members: MembershipManager,
    ) -> Self {
        Self {
            orgs,
            authz,
            members,
        }
    }

    /// LÓGICA DE NEGÓCIO: cria a organização e torna o criador o seu único dono.
    /// As duas escritas são uma unidade (ver `OrganizationStore::create_with_owner`):
    /// se a associação falhar, a organização não fica e o erro original é devolvido.
    pub async fn create_org(
        &self,
        ctx: &RequestContext,
        payload: CreateOrgPayload,
    ) -> Result<Organization, AppError> {
        payload.validate()?;

        if self.orgs.get_by_slug(ctx, &payload.slug).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "organização com slug '{}'",
                payload.slug
            )));
        }

        let org = self
            .orgs
            .create_with_owner(ctx, &payload, &ctx.user_id, self.members.store())
            .await?;

        tracing::info!(org_id = %org.id, slug = %org.slug, owner = %ctx.user_id, "✅ organização criada");
        Ok(org)
    }

    pub async fn get_org(&self, ctx: &RequestContext, org_id: Uuid) -> Result<Organization, AppError> {
        let allowed = fail_closed(self.authz.can_access_org(ctx, &ctx.user_id, org_id).await)?;
        if !allowed {
            return Err(self.denied(ctx, org_id).await);
        }

        self.orgs
            .get(ctx, org_id)
            .await?
            .ok_or_else(|| AppError::not_found("organização"))
    }

    pub async fn update_org(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        payload: UpdateOrgPayload,
    ) -> Result<Organization, AppError> {
        self.require(ctx, org_id, Action::Update).await?;
        payload.validate()?;

        self.orgs
            .update(ctx, org_id, &payload)
            .await?
            .ok_or_else(|| AppError::not_found("organização"))
    }

    pub async fn delete_org(&self, ctx: &RequestContext, org_id: Uuid) -> Result<(), AppError> {
        self.require(ctx, org_id, Action::Delete).await?;

        if !self.orgs.delete(ctx, org_id).await? {
            return Err(AppError::not_found("organização"));
        }

        tracing::info!(%org_id, by = %ctx.user_id, "organização removida");
        Ok(())
    }

    /// Organizações do usuário, cada uma com o seu papel.
    pub async fn list_user_orgs_with_role(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrgWithRole>, AppError> {
        let orgs = self.orgs.list_for_user(ctx, &ctx.user_id).await?;

        // N+1 consultas de papel; aceitável nesta camada.
        let mut result = Vec::with_capacity(orgs.len());
        for organization in orgs {
            let role = self
                .authz
                .get_org_role(ctx, &ctx.user_id, organization.id)
                .await?;
            result.push(OrgWithRole { organization, role });
        }

        Ok(result)
    }

    pub async fn list_org_members(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> Result<Vec<Membership>, AppError> {
        let allowed = fail_closed(
            self.authz
                .can_perform_org_action(ctx, &ctx.user_id, org_id, Action::View)
                .await,
        )?;
        if !allowed {
            return Err(self.denied(ctx, org_id).await);
        }

        self.members
            .get_resource_members(ctx, ResourceRef::Org(org_id))
            .await
    }

    pub async fn add_org_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        target_user_id: &str,
        role: Role,
    ) -> Result<Membership, AppError> {
        self.require(ctx, org_id, Action::Manage).await?;

        if role == Role::Owner {
            return Err(AppError::invalid_input(
                "A organização já tem um dono; não é possível adicionar outro.",
            ));
        }

        self.members
            .add_member(
                ctx,
                target_user_id,
                ResourceRef::Org(org_id),
                role,
                Some(&ctx.user_id),
            )
            .await
    }

    pub async fn update_org_member_role(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        target_user_id: &str,
        role: Role,
    ) -> Result<Membership, AppError> {
        self.require(ctx, org_id, Action::Manage).await?;

        if role == Role::Owner {
            return Err(AppError::invalid_input(
                "Não é possível promover um membro a dono.",
            ));
        }

        let resource = ResourceRef::Org(org_id);
        let current = self
            .members
            .get_membership(ctx, target_user_id, resource)
            .await?
            .ok_or_else(|| AppError::not_found("associação"))?;

        if current.role == Role::Owner {
            return Err(AppError::invalid_input(
                "O papel do dono da organização não pode ser alterado.",
            ));
        }

        self.members
            .update_member_role(ctx, target_user_id, resource, role)
            .await
    }

    pub async fn remove_org_member(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        target_user_id: &str,
    ) -> Result<(), AppError> {
        // Vale para qualquer papel, antes mesmo da checagem de permissão.
        if ctx.user_id == target_user_id {
            return Err(AppError::CannotRemoveSelf);
        }

        self.require(ctx, org_id, Action::Manage).await?;

        let resource = ResourceRef::Org(org_id);
        let current = self
            .members
            .get_membership(ctx, target_user_id, resource)
            .await?
            .ok_or_else(|| AppError::not_found("associação"))?;

        if current.role == Role::Owner {
            return Err(AppError::invalid_input(
                "O dono da organização não pode ser removido.",
            ));
        }

        self.members
            .remove_member(ctx, target_user_id, resource)
            .await
    }

    // Checagem de escrita: qualquer falha de consulta é propagada.
    async fn require(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        action: Action,
    ) -> Result<(), AppError> {
        if self
            .authz
            .can_perform_org_action(ctx, &ctx.user_id, org_id, action)
            .await?
        {
            return Ok(());
        }

        tracing::debug!(user_id = %ctx.user_id, %org_id, %action, "ação negada na organização");
        Err(self.denied(ctx, org_id).await)
    }

    // Sem relação com uma org que nem existe vira NotFound; senão Forbidden.
    async fn denied(&self, ctx: &RequestContext, org_id: Uuid) -> AppError {
        match self.orgs.get(ctx, org_id).await {
            Ok(None) => AppError::not_found("organização"),
            Ok(Some(_)) => AppError::Forbidden,
            Err(AppError::Cancelled) => AppError::Cancelled,
            Err(_) => AppError::Forbidden,
        }
    }
}
