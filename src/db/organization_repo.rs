// src/db/organization_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::{
    context::RequestContext,
    error::{map_unique_violation, AppError},
};
use crate::db::{
    membership_repo::MembershipRepository,
    store::{MembershipStore, OrganizationStore},
};
use crate::models::{
    membership::NewMembership,
    organization::{CreateOrgPayload, Organization, UpdateOrgPayload},
    rbac::{ResourceRef, Role},
};

const ORG_COLUMNS: &str =
    "id, name, slug, description, settings, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// INSERT da organização. Aceita pool ou transação.
    pub async fn insert_org<'e, E>(
        executor: E,
        payload: &CreateOrgPayload,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO organizations (name, slug, description)
            VALUES ($1, $2, $3)
            RETURNING {ORG_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Organization>(&sql)
            .bind(&payload.name)
            .bind(&payload.slug)
            .bind(payload.description.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, "organização com este slug"))
    }

    async fn create_with_owner_tx(
        &self,
        payload: &CreateOrgPayload,
        owner_id: &str,
    ) -> Result<Organization, AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria a organização
        let org = Self::insert_org(&mut *tx, payload).await?;

        // 3. Cria o dono na mesma transação
        MembershipRepository::insert_membership(
            &mut *tx,
            &NewMembership {
                user_id: owner_id.to_string(),
                resource: ResourceRef::Org(org.id),
                role: Role::Owner,
                invited_by: None,
            },
        )
        .await?;

        // 4. Commit
        tx.commit().await?;

        Ok(org)
    }

    // Remove as relações da org e dos seus projetos; os projetos caem via FK.
    async fn delete_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM memberships
            WHERE (resource_type = 'org' AND resource_id = $1)
               OR (resource_type = 'project' AND resource_id IN (
                    SELECT id FROM projects WHERE organization_id = $1
                  ))
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn create(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
    ) -> Result<Organization, AppError> {
        ctx.run(Self::insert_org(&self.pool, payload)).await
    }

    // Mesma transação; descartar o future faz rollback.
    async fn create_with_owner(
        &self,
        ctx: &RequestContext,
        payload: &CreateOrgPayload,
        owner_id: &str,
        _memberships: &dyn MembershipStore,
    ) -> Result<Organization, AppError> {
        ctx.run(self.create_with_owner_tx(payload, owner_id)).await
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let sql = format!("SELECT {ORG_COLUMNS} FROM organizations WHERE id = $1");

        ctx.run(async {
            sqlx::query_as::<_, Organization>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn get_by_slug(
        &self,
        ctx: &RequestContext,
        slug: &str,
    ) -> Result<Option<Organization>, AppError> {
        let sql = format!("SELECT {ORG_COLUMNS} FROM organizations WHERE slug = $1");

        ctx.run(async {
            sqlx::query_as::<_, Organization>(&sql)
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: &UpdateOrgPayload,
    ) -> Result<Option<Organization>, AppError> {
        // Campos NULL mantêm o valor atual
        let sql = format!(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                settings = COALESCE($4, settings),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORG_COLUMNS}
            "#
        );

        ctx.run(async {
            sqlx::query_as::<_, Organization>(&sql)
                .bind(id)
                .bind(payload.name.as_deref())
                .bind(payload.description.as_deref())
                .bind(payload.settings.clone())
                .bind(payload.is_active)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<bool, AppError> {
        ctx.run(self.delete_cascade(id)).await
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Organization>, AppError> {
        ctx.run(async {
            sqlx::query_as::<_, Organization>(
                r#"
                SELECT o.id, o.name, o.slug, o.description, o.settings,
                       o.is_active, o.created_at, o.updated_at
                FROM organizations o
                JOIN memberships m
                  ON m.resource_type = 'org' AND m.resource_id = o.id
                WHERE m.user_id = $1
                ORDER BY o.created_at
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
        })
        .await
    }
}
