// src/services/project_service.rs

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::common::{context::RequestContext, error::AppError};
use crate::db::store::{OrganizationStore, ProjectStore};
use crate::models::{
    membership::Membership,
    project::{CreateProjectPayload, Project, ProjectWithRole, UpdateProjectPayload},
    rbac::{Action, ResourceRef, Role},
};
use crate::services::{
    fail_closed, membership_service::MembershipManager, rbac_service::Authorizer,
};

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectStore>,
    orgs: Arc<dyn OrganizationStore>,
    authz: Arc<dyn Authorizer>,
    members: MembershipManager,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        orgs: Arc<dyn OrganizationStore>,
        authz: Arc<dyn Authorizer>,
        members: MembershipManager,
    ) -> Self {
        Self {
            projects,
            orgs,
            authz,
            members,
        }
    }

    /// Cria o projeto SEM nenhuma associação: até alguém adicionar o primeiro
    /// membro explícito, o acesso é herdado da organização.
    pub async fn create_project(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
        payload: CreateProjectPayload,
    ) -> Result<Project, AppError> {
        if !self
            .authz
            .can_perform_org_action(ctx, &ctx.user_id, org_id, Action::Create)
            .await?
        {
            return Err(match self.orgs.get(ctx, org_id).await? {
                None => AppError::not_found("organização"),
                Some(_) => AppError::Forbidden,
            });
        }

        payload.validate()?;

        if self
            .projects
            .get_by_slug(ctx, org_id, &payload.slug)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists(format!(
                "projeto com slug '{}' nesta organização",
                payload.slug
            )));
        }

        let project = self.projects.create(ctx, org_id, &payload).await?;

        tracing::info!(project_id = %project.id, %org_id, slug = %project.slug, "✅ projeto criado");
        Ok(project)
    }

    pub async fn get_project(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> Result<Project, AppError> {
        let allowed = fail_closed(
            self.authz
                .can_access_project(ctx, &ctx.user_id, project_id)
                .await,
        )?;
        if !allowed {
            return Err(AppError::Forbidden);
        }

        self.load(ctx, project_id).await
    }

    pub async fn update_project(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        payload: UpdateProjectPayload,
    ) -> Result<Project, AppError> {
        self.require(ctx, project_id, Action::Update).await?;
        payload.validate()?;

        self.projects
            .update(ctx, project_id, &payload)
            .await?
            .ok_or_else(|| AppError::not_found("projeto"))
    }

    pub async fn delete_project(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> Result<(), AppError> {
        self.require(ctx, project_id, Action::Delete).await?;

        if !self.projects.delete(ctx, project_id).await? {
            return Err(AppError::not_found("projeto"));
        }

        tracing::info!(%project_id, by = %ctx.user_id, "projeto removido");
        Ok(())
    }

    pub async fn list_project_members(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> Result<Vec<Membership>, AppError> {
        let allowed = fail_closed(
            self.authz
                .can_perform_project_action(ctx, &ctx.user_id, project_id, Action::View)
                .await,
        )?;
        if !allowed {
            return Err(AppError::Forbidden);
        }

        self.members
            .get_resource_members(ctx, ResourceRef::Project(project_id))
            .await
    }

    /// O alvo precisa já pertencer à organização do projeto.
    /// O primeiro membro explícito "fecha" o projeto.
    pub async fn add_project_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        target_user_id: &str,
        role: Role,
    ) -> Result<Membership, AppError> {
        self.require(ctx, project_id, Action::Manage).await?;

        if role == Role::Owner {
            return Err(AppError::invalid_input("Projetos não têm dono."));
        }

        let project = self.load(ctx, project_id).await?;
        let in_org = self
            .members
            .is_member(ctx, target_user_id, ResourceRef::Org(project.organization_id))
            .await?;
        if !in_org {
            return Err(AppError::invalid_input(
                "O usuário precisa ser membro da organização antes de entrar no projeto.",
            ));
        }

        let was_open = !self
            .members
            .has_any_members(ctx, ResourceRef::Project(project_id))
            .await?;

        let membership = self
            .members
            .add_member(
                ctx,
                target_user_id,
                ResourceRef::Project(project_id),
                role,
                Some(&ctx.user_id),
            )
            .await?;

        if was_open {
            tracing::info!(%project_id, "projeto passou a ter membros explícitos; herança da organização desligada");
        }
        Ok(membership)
    }

    pub async fn update_project_member_role(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        target_user_id: &str,
        role: Role,
    ) -> Result<Membership, AppError> {
        self.require(ctx, project_id, Action::Manage).await?;

        if role == Role::Owner {
            return Err(AppError::invalid_input("Projetos não têm dono."));
        }

        self.members
            .update_member_role(ctx, target_user_id, ResourceRef::Project(project_id), role)
            .await
    }

    pub async fn remove_project_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        target_user_id: &str,
    ) -> Result<(), AppError> {
        if ctx.user_id == target_user_id {
            return Err(AppError::CannotRemoveSelf);
        }

        self.require(ctx, project_id, Action::Manage).await?;

        self.members
            .remove_member(ctx, target_user_id, ResourceRef::Project(project_id))
            .await
    }

    /// Projetos da organização que o usuário consegue acessar, com o papel de cada um.
    pub async fn list_org_projects_with_role(
        &self,
        ctx: &RequestContext,
        org_id: Uuid,
    ) -> Result<Vec<ProjectWithRole>, AppError> {
        let allowed = fail_closed(self.authz.can_access_org(ctx, &ctx.user_id, org_id).await)?;
        if !allowed {
            return Err(match self.orgs.get(ctx, org_id).await? {
                None => AppError::not_found("organização"),
                Some(_) => AppError::Forbidden,
            });
        }

        let projects = self.projects.list_for_org(ctx, org_id).await?;

        let mut result = Vec::with_capacity(projects.len());
        for project in projects {
            if let Some(role) = self.role_in(ctx, project.id).await? {
                result.push(ProjectWithRole {
                    project,
                    role: Some(role),
                });
            }
        }

        Ok(result)
    }

    /// Todos os projetos visíveis ao usuário. A visibilidade segue a query de
    /// listagem (dono da org vê tudo), e o papel segue `get_project_role`;
    /// por isso um dono pode ver um projeto fechado com `role: None`.
    pub async fn list_user_projects_with_role(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ProjectWithRole>, AppError> {
        let projects = self.projects.list_for_user(ctx, &ctx.user_id).await?;

        let mut result = Vec::with_capacity(projects.len());
        for project in projects {
            match self.authz.get_project_role(ctx, &ctx.user_id, project.id).await {
                Ok(role) => result.push(ProjectWithRole { project, role }),
                // Removido entre a listagem e a consulta do papel
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }

    async fn role_in(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        match self.authz.get_project_role(ctx, &ctx.user_id, project_id).await {
            Err(AppError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    async fn load(&self, ctx: &RequestContext, project_id: Uuid) -> Result<Project, AppError> {
        self.projects
            .get(ctx, project_id)
            .await?
            .ok_or_else(|| AppError::not_found("projeto"))
    }

    // Projeto inexistente já sai como NotFound do authorizer.
    async fn require(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        action: Action,
    ) -> Result<(), AppError> {
        if self
            .authz
            .can_perform_project_action(ctx, &ctx.user_id, project_id, action)
            .await?
        {
            return Ok(());
        }

        tracing::debug!(user_id = %ctx.user_id, %project_id, %action, "ação negada no projeto");
        Err(AppError::Forbidden)
    }
}
