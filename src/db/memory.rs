// src/db/memory.rs

//! Backend em memória. Implementa as três portas sobre um único `RwLock`,
//! então cada operação enxerga um estado consistente. Usado nos testes e
//! quando o servidor sobe sem `DATABASE_URL`.

use async_trait::async_trait;
use chrono::Utc;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::common::{context::RequestContext, error::AppError};
use crate::db::store::{MembershipStore, OrganizationStore, ProjectStore};
use crate::models::{
    membership::{Membership, NewMembership, ProjectAccess},
    organization::{CreateOrgPayload, Organization, UpdateOrgPayload},
    project::{CreateProjectPayload, Project, UpdateProjectPayload},
    rbac::{ResourceRef, ResourceType, Role},
};

type MembershipKey = (String, ResourceRef);

#[derive(Default)]
struct State {
    organizations: HashMap<Uuid, Organization>,
    projects: HashMap<Uuid, Project>,
    // A chave é a própria tupla única (user, recurso).
    memberships: HashMap<MembershipKey, Membership>,
}

impl State {
    fn membership(&self, user_id: &str, resource: ResourceRef) -> Option<&Membership> {
        self.memberships.get(&(user_id.to_string(), resource))
    }

    fn has_any_members(&self, resource: ResourceRef) -> bool {
        self.memberships.values().any(|m| m.resource() == resource)
    }

    fn remove_resource_memberships(&mut self, resource: ResourceRef) {
        self.memberships.retain(|(_, r), _| *r != resource);
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<Utc>,
{
    items.sort_by_key(|item| key(item));
    items
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn insert(
        &self,
        ctx: &RequestContext,
        membership: NewMembership,
    ) -> Result<Membership, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        let key = (membership.user_id.clone(), membership.resource);
        if state.memberships.contains_key(&key) {
            return Err(AppError::already_exists("associação para este recurso"));
        }
        // Mesma regra do índice parcial no Postgres: um owner por organização.
        if membership.role == Role::Owner
            && state.memberships.values().any(|m| {
                m.resource() == membership.resource && m.role == Role::Owner
            })
        {
            return Err(AppError::already_exists("dono da organização"));
        }

        let now = Utc::now();
        let created = Membership {
            id: Uuid::new_v4(),
            user_id: membership.user_id,
            resource_type: membership.resource.resource_type(),
            resource_id: membership.resource.id(),
            role: membership.role,
            created_at: now,
            updated_at: now,
            invited_by: membership.invited_by,
        };
        state.memberships.insert(key, created.clone());

        Ok(created)
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<Option<Membership>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        Ok(state.membership(user_id, resource).cloned())
    }

    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        let key = (user_id.to_string(), resource);
        if role == Role::Owner
            && state
                .memberships
                .iter()
                .any(|(k, m)| *k != key && m.resource() == resource && m.role == Role::Owner)
        {
            return Err(AppError::already_exists("dono da organização"));
        }

        Ok(state.memberships.get_mut(&key).map(|m| {
            m.role = role;
            m.updated_at = Utc::now();
            m.clone()
        }))
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;
        Ok(state
            .memberships
            .remove(&(user_id.to_string(), resource))
            .is_some())
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<Membership>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        let found = state
            .memberships
            .values()
            .filter(|m| m.user_id == user_id)
            .filter(|m| resource_type.is_none_or(|t| m.resource_type == t))
            .cloned()
            .collect();
        Ok(sorted_by_creation(found, |m: &Membership| m.created_at))
    }

    async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<Membership>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        let found = state
            .memberships
            .values()
            .filter(|m| m.resource() == resource)
            .cloned()
            .collect();
        Ok(sorted_by_creation(found, |m: &Membership| m.created_at))
    }

    async fn has_any_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        Ok(state.has_any_members(resource))
    }

    async fn project_access(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<ProjectAccess>, AppError> {
        ctx.ensure_active()?;
        // As três leituras acontecem sob o mesmo guard.
        let state = self.state.read().await;

        let Some(project) = state.projects.get(&project_id) else {
            return Ok(None);
        };
        let resource = ResourceRef::Project(project_id);

        Ok(Some(ProjectAccess {
            explicit_role: state.membership(user_id, resource).map(|m| m.role),
            has_explicit_members: state.has_any_members(resource),
            org_role: state
                .membership(user_id, ResourceRef::Org(project.organization_id))
                .map(|m| m.role),
        }))
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
    ) -> Result<Organization, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        if state.organizations.values().any(|o| o.slug == payload.slug) {
            return Err(AppError::already_exists("organização com este slug"));
        }

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: payload.name.clone(),
            slug: payload.slug.clone(),
            description: payload.description.clone(),
            settings: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state
            .organizations
            .insert(organization.id, organization.clone());

        Ok(organization)
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        ctx.ensure_active()?;
        Ok(self.state.read().await.organizations.get(&id).cloned())
    }

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        slug: &str,
    ) -> Result<Option<Organization>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        Ok(state
            .organizations
            .values()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateOrgPayload,
    ) -> Result<Option<Organization>, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        Ok(state.organizations.get_mut(&id).map(|o| {
            if let Some(name) = &payload.name {
                o.name = name.clone();
            }
            if let Some(description) = &payload.description {
                o.description = Some(description.clone());
            }
            if let Some(settings) = &payload.settings {
                o.settings = Some(settings.clone());
            }
            if let Some(is_active) = payload.is_active {
                o.is_active = is_active;
            }
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        if state.organizations.remove(&id).is_none() {
            return Ok(false);
        }

        let project_ids: Vec<Uuid> = state
            .projects
            .values()
            .filter(|p| p.organization_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in project_ids {
            state.projects.remove(&project_id);
            state.remove_resource_memberships(ResourceRef::Project(project_id));
        }
        state.remove_resource_memberships(ResourceRef::Org(id));

        Ok(true)
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        let found = state
            .organizations
            .values()
            .filter(|o| state.membership(user_id, ResourceRef::Org(o.id)).is_some())
            .cloned()
            .collect();
        Ok(sorted_by_creation(found, |o: &Organization| o.created_at))
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        if !state.organizations.contains_key(&organization_id) {
            return Err(AppError::not_found("organização"));
        }
        if state
            .projects
            .values()
            .any(|p| p.organization_id == organization_id && p.slug == payload.slug)
        {
            return Err(AppError::already_exists(
                "projeto com este slug na organização",
            ));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            organization_id,
            name: payload.name.clone(),
            slug: payload.slug.clone(),
            description: payload.description.clone(),
            settings: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());

        Ok(project)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Project>, AppError> {
        ctx.ensure_active()?;
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        slug: &str,
    ) -> Result<Option<Project>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        Ok(state
            .projects
            .values()
            .find(|p| p.organization_id == organization_id && p.slug == slug)
            .cloned())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateProjectPayload,
    ) -> Result<Option<Project>, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        Ok(state.projects.get_mut(&id).map(|p| {
            if let Some(name) = &payload.name {
                p.name = name.clone();
            }
            if let Some(description) = &payload.description {
                p.description = Some(description.clone());
            }
            if let Some(settings) = &payload.settings {
                p.settings = Some(settings.clone());
            }
            if let Some(is_active) = payload.is_active {
                p.is_active = is_active;
            }
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError> {
        ctx.ensure_active()?;
        let mut state = self.state.write().await;

        if state.projects.remove(&id).is_none() {
            return Ok(false);
        }
        state.remove_resource_memberships(ResourceRef::Project(id));

        Ok(true)
    }

    async fn list_for_org(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> Result<Vec<Project>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;
        let found = state
            .projects
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(found, |p: &Project| p.created_at))
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Project>, AppError> {
        ctx.ensure_active()?;
        let state = self.state.read().await;

        let found = state
            .projects
            .values()
            .filter(|p| {
                let resource = ResourceRef::Project(p.id);
                if state.membership(user_id, resource).is_some() {
                    return true;
                }
                match state
                    .membership(user_id, ResourceRef::Org(p.organization_id))
                    .map(|m| m.role)
                {
                    Some(Role::Owner) => true,
                    Some(_) => !state.has_any_members(resource),
                    None => false,
                }
            })
            .cloned()
            .collect();
        Ok(sorted_by_creation(found, |p: &Project| p.created_at))
    }
}
