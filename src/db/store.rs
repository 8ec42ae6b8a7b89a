// src/db/store.rs

//! Portas de persistência. Os services e o authorizer só conhecem estes traits;
//! o backend (Postgres, memória, ou um motor de grafo de relações) é trocável.

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::{context::RequestContext, error::AppError};
use crate::models::{
    membership::{Membership, NewMembership, ProjectAccess},
    organization::{CreateOrgPayload, Organization, UpdateOrgPayload},
    project::{CreateProjectPayload, Project, UpdateProjectPayload},
    rbac::{ResourceRef, ResourceType, Role},
};

/// CRUD sobre a relação (user, resource_type, resource_id) -> role.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insere a relação. A unicidade da tupla é garantida pelo próprio store:
    /// uma duplicata retorna `AppError::AlreadyExists`.
    async fn insert(
        &self,
        ctx: &RequestContext,
        membership: NewMembership,
    ) -> Result<Membership, AppError>;

    async fn get(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<Option<Membership>, AppError>;

    /// Retorna `None` se não havia relação para atualizar.
    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
    ) -> Result<Option<Membership>, AppError>;

    /// Retorna `false` se não havia relação para remover.
    async fn delete(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<bool, AppError>;

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<Membership>, AppError>;

    async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<Membership>, AppError>;

    /// Verificação de existência (não contagem).
    async fn has_any_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<bool, AppError>;

    /// Lê num único snapshot tudo que é preciso para resolver o papel do
    /// usuário no projeto. `None` se o projeto não existe.
    async fn project_access(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<ProjectAccess>, AppError>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Slug duplicado retorna `AppError::AlreadyExists`.
    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
    ) -> Result<Organization, AppError>;

    /// Cria a organização com `owner_id` como único dono. As duas escritas são
    /// uma unidade: se a associação falhar, a organização não permanece.
    ///
    /// A versão padrão grava pelos dois stores e desfaz a organização com um
    /// delete compensatório. Backends transacionais sobrescrevem.
    async fn create_with_owner(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
        owner_id: &str,
        memberships: &dyn MembershipStore,
    ) -> Result<Organization, AppError> {
        let org = self.create(ctx, payload).await?;

        let owner = NewMembership {
            user_id: owner_id.to_string(),
            resource: ResourceRef::Org(org.id),
            role: Role::Owner,
            invited_by: None,
        };
        if let Err(e) = memberships.insert(ctx, owner).await {
            tracing::warn!(org_id = %org.id, error = %e, "falha ao criar o dono; desfazendo a organização");
            // A compensação roda mesmo que a requisição tenha sido cancelada.
            let cleanup_ctx = RequestContext::new(ctx.user_id.clone());
            if let Err(cleanup_err) = self.delete(&cleanup_ctx, org.id).await {
                tracing::error!(org_id = %org.id, error = %cleanup_err, "falha na compensação da organização");
            }
            return Err(e);
        }

        Ok(org)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid)
    -> Result<Option<Organization>, AppError>;

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        slug: &str,
    ) -> Result<Option<Organization>, AppError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateOrgPayload,
    ) -> Result<Option<Organization>, AppError>;

    /// Remove a organização, seus projetos e todas as relações deles.
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError>;

    /// Organizações em que o usuário tem alguma relação.
    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Slug duplicado dentro da mesma organização retorna `AppError::AlreadyExists`.
    async fn create(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError>;

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Project>, AppError>;

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        slug: &str,
    ) -> Result<Option<Project>, AppError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateProjectPayload,
    ) -> Result<Option<Project>, AppError>;

    /// Remove o projeto e suas relações.
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError>;

    async fn list_for_org(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> Result<Vec<Project>, AppError>;

    /// Projetos visíveis ao usuário: membro explícito do projeto; dono da org
    /// (todos os projetos dela); ou qualquer outro papel na org, só nos
    /// projetos abertos (sem membros explícitos).
    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Project>, AppError>;
}
