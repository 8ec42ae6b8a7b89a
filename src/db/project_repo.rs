// src/db/project_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::{
    context::RequestContext,
    error::{map_unique_violation, AppError},
};
use crate::db::store::ProjectStore;
use crate::models::project::{CreateProjectPayload, Project, UpdateProjectPayload};

const PROJECT_COLUMNS: &str = "id, organization_id, name, slug, description, settings, \
                               is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// INSERT do projeto. Aceita pool ou transação.
    pub async fn insert_project<'e, E>(
        executor: E,
        organization_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO projects (organization_id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Project>(&sql)
            .bind(organization_id)
            .bind(&payload.name)
            .bind(&payload.slug)
            .bind(payload.description.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, "projeto com este slug na organização"))
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM memberships WHERE resource_type = 'project' AND resource_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn create(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        payload: &CreateProjectPayload,
    ) -> Result<Project, AppError> {
        ctx.run(Self::insert_project(&self.pool, organization_id, payload))
            .await
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Option<Project>, AppError> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");

        ctx.run(async {
            sqlx::query_as::<_, Project>(&sql)
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
        organization_id: Uuid,
        slug: &str,
    ) -> Result<Option<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE organization_id = $1 AND slug = $2"
        );

        ctx.run(async {
            sqlx::query_as::<_, Project>(&sql)
                .bind(organization_id)
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
        payload: &UpdateProjectPayload,
    ) -> Result<Option<Project>, AppError> {
        let sql = format!(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                settings = COALESCE($4, settings),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        );

        ctx.run(async {
            sqlx::query_as::<_, Project>(&sql)
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

    async fn list_for_org(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> Result<Vec<Project>, AppError> {
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE organization_id = $1 ORDER BY created_at"
        );

        ctx.run(async {
            sqlx::query_as::<_, Project>(&sql)
                .bind(organization_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<Project>, AppError> {
        // Dono da org vê todos os projetos dela; os outros papéis da org só
        // veem projetos abertos (sem nenhum membro explícito).
        let sql = format!(
            r#"
            SELECT {PROJECT_COLUMNS}
            FROM projects p
            WHERE EXISTS (
                    SELECT 1 FROM memberships m
                    WHERE m.resource_type = 'project' AND m.resource_id = p.id
                      AND m.user_id = $1)
               OR EXISTS (
                    SELECT 1 FROM memberships m
                    WHERE m.resource_type = 'org' AND m.resource_id = p.organization_id
                      AND m.user_id = $1 AND m.role = 'owner')
               OR (EXISTS (
                    SELECT 1 FROM memberships m
                    WHERE m.resource_type = 'org' AND m.resource_id = p.organization_id
                      AND m.user_id = $1)
                   AND NOT EXISTS (
                    SELECT 1 FROM memberships m
                    WHERE m.resource_type = 'project' AND m.resource_id = p.id))
            ORDER BY p.created_at
            "#
        );

        ctx.run(async {
            sqlx::query_as::<_, Project>(&sql)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::from)
        })
        .await
    }
}
