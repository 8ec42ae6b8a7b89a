#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use uuid::Uuid;

use rebac::{
    db::{MemoryStore, MembershipStore, OrganizationStore},
    models::{
        membership::{Membership, NewMembership, ProjectAccess},
        organization::{CreateOrgPayload, Organization, UpdateOrgPayload},
        project::{CreateProjectPayload, Project},
        rbac::{ResourceRef, ResourceType, Role},
    },
    AppError, AppState, RequestContext,
};

pub fn ctx(user_id: &str) -> RequestContext {
    RequestContext::new(user_id)
}

pub fn org_payload(name: &str, slug: &str) -> CreateOrgPayload {
    CreateOrgPayload {
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
    }
}

pub fn project_payload(name: &str, slug: &str) -> CreateProjectPayload {
    CreateProjectPayload {
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(format!("projeto {name}")),
    }
}

/// Estado completo sobre um único `MemoryStore`.
pub struct Harness {
    pub state: AppState,
    pub store: MemoryStore,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let state = AppState::from_stores(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        Self { state, store }
    }

    pub async fn create_org(&self, owner: &str, slug: &str) -> Organization {
        self.state
            .org_service
            .create_org(&ctx(owner), org_payload(slug, slug))
            .await
            .expect("create org")
    }

    pub async fn create_project(&self, actor: &str, org_id: Uuid, slug: &str) -> Project {
        self.state
            .project_service
            .create_project(&ctx(actor), org_id, project_payload(slug, slug))
            .await
            .expect("create project")
    }

    pub async fn add_org_member(&self, actor: &str, org_id: Uuid, user: &str, role: Role) {
        self.state
            .org_service
            .add_org_member(&ctx(actor), org_id, user, role)
            .await
            .expect("add org member");
    }

    pub async fn add_project_member(&self, actor: &str, project_id: Uuid, user: &str, role: Role) {
        self.state
            .project_service
            .add_project_member(&ctx(actor), project_id, user, role)
            .await
            .expect("add project member");
    }

    pub async fn project_role(&self, user: &str, project_id: Uuid) -> Option<Role> {
        self.state
            .authorizer
            .get_project_role(&ctx(user), user, project_id)
            .await
            .expect("project role")
    }
}

fn injected_failure() -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("falha injetada"))
}

/// Store de relações que delega ao `MemoryStore` mas pode falhar sob demanda.
#[derive(Clone, Default)]
pub struct FlakyMembershipStore {
    pub inner: MemoryStore,
    fail_inserts: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl FlakyMembershipStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for FlakyMembershipStore {
    async fn insert(
        &self,
        ctx: &RequestContext,
        membership: NewMembership,
    ) -> Result<Membership, AppError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        self.inner.insert(ctx, membership).await
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<Option<Membership>, AppError> {
        self.check_reads()?;
        MembershipStore::get(&self.inner, ctx, user_id, resource).await
    }

    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        self.inner.update_role(ctx, user_id, resource, role).await
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        MembershipStore::delete(&self.inner, ctx, user_id, resource).await
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<Membership>, AppError> {
        self.check_reads()?;
        MembershipStore::list_for_user(&self.inner, ctx, user_id, resource_type).await
    }

    async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<Membership>, AppError> {
        self.check_reads()?;
        self.inner.list_for_resource(ctx, resource).await
    }

    async fn has_any_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        self.check_reads()?;
        self.inner.has_any_members(ctx, resource).await
    }

    async fn project_access(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<ProjectAccess>, AppError> {
        self.check_reads()?;
        self.inner.project_access(ctx, user_id, project_id).await
    }
}

/// Estado cujo store de relações é o `FlakyMembershipStore`.
pub fn flaky_state() -> (AppState, FlakyMembershipStore) {
    let store = MemoryStore::new();
    let flaky = FlakyMembershipStore::new(store.clone());
    let state = AppState::from_stores(
        Arc::new(flaky.clone()),
        Arc::new(store.clone()),
        Arc::new(store),
    );
    (state, flaky)
}

/// Store de organizações que delega ao `MemoryStore` e guarda o id da última criada.
#[derive(Clone, Default)]
pub struct RecordingOrgStore {
    pub inner: MemoryStore,
    last_created: Arc<Mutex<Option<Uuid>>>,
}

impl RecordingOrgStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn last_created(&self) -> Option<Uuid> {
        *self.last_created.lock().unwrap()
    }
}

#[async_trait]
impl OrganizationStore for RecordingOrgStore {
    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
    ) -> Result<Organization, AppError> {
        let org = OrganizationStore::create(&self.inner, ctx, payload).await?;
        *self.last_created.lock().unwrap() = Some(org.id);
        Ok(org)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Organization>, AppError> {
        OrganizationStore::get(&self.inner, ctx, id).await
    }

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        slug: &str,
    ) -> Result<Option<Organization>, AppError> {
        OrganizationStore::get_by_slug(&self.inner, ctx, slug).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateOrgPayload,
    ) -> Result<Option<Organization>, AppError> {
        OrganizationStore::update(&self.inner, ctx, id, payload).await
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError> {
        OrganizationStore::delete(&self.inner, ctx, id).await
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError> {
        OrganizationStore::list_for_user(&self.inner, ctx, user_id).await
    }
}

/// Estado com relações instáveis e organizações observadas.
pub fn recording_state() -> (AppState, FlakyMembershipStore, RecordingOrgStore) {
    let store = MemoryStore::new();
    let flaky = FlakyMembershipStore::new(store.clone());
    let orgs = RecordingOrgStore::new(store.clone());
    let state = AppState::from_stores(
        Arc::new(flaky.clone()),
        Arc::new(orgs.clone()),
        Arc::new(store),
    );
    (state, flaky, orgs)
}
