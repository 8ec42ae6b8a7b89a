// src/db/membership_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::common::{
    context::RequestContext,
    error::{map_unique_violation, AppError},
};
use crate::db::store::MembershipStore;
use crate::models::{
    membership::{Membership, NewMembership, ProjectAccess},
    rbac::{ResourceRef, ResourceType, Role},
};

const MEMBERSHIP_COLUMNS: &str =
    "id, user_id, resource_type, resource_id, role, created_at, updated_at, invited_by";

// Linha crua da tabela; os enums ficam como TEXT no banco.
#[derive(Debug, FromRow)]
struct MembershipRow {
    id: Uuid,
    user_id: String,
    resource_type: String,
    resource_id: Uuid,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    invited_by: Option<String>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: row.id,
            user_id: row.user_id,
            resource_type: row.resource_type.parse()?,
            resource_id: row.resource_id,
            role: row.role.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            invited_by: row.invited_by,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProjectAccessRow {
    explicit_role: Option<String>,
    has_explicit_members: bool,
    org_role: Option<String>,
}

impl TryFrom<ProjectAccessRow> for ProjectAccess {
    type Error = AppError;

    fn try_from(row: ProjectAccessRow) -> Result<Self, Self::Error> {
        Ok(ProjectAccess {
            explicit_role: row.explicit_role.as_deref().map(str::parse).transpose()?,
            has_explicit_members: row.has_explicit_members,
            org_role: row.org_role.as_deref().map(str::parse).transpose()?,
        })
    }
}

fn into_memberships(rows: Vec<MembershipRow>) -> Result<Vec<Membership>, AppError> {
    rows.into_iter().map(Membership::try_from).collect()
}

/// Relações usuário -> recurso no Postgres.
#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// INSERT da relação. Aceita pool ou transação, para compor com a
    /// criação da organização.
    pub async fn insert_membership<'e, E>(
        executor: E,
        membership: &NewMembership,
    ) -> Result<Membership, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO memberships (user_id, resource_type, resource_id, role, invited_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, MembershipRow>(&sql)
            .bind(&membership.user_id)
            .bind(membership.resource.resource_type().as_str())
            .bind(membership.resource.id())
            .bind(membership.role.as_str())
            .bind(membership.invited_by.as_deref())
            .fetch_one(executor)
            .await
            // A constraint UNIQUE resolve inserções concorrentes da mesma tupla.
            .map_err(|e| map_unique_violation(e, "associação para este recurso"))?;

        row.try_into()
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn insert(
        &self,
        ctx: &RequestContext,
        membership: NewMembership,
    ) -> Result<Membership, AppError> {
        ctx.run(Self::insert_membership(&self.pool, &membership))
            .await
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<Option<Membership>, AppError> {
        let sql = format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE user_id = $1 AND resource_type = $2 AND resource_id = $3
            "#
        );

        let row = ctx
            .run(async {
                sqlx::query_as::<_, MembershipRow>(&sql)
                    .bind(user_id)
                    .bind(resource.resource_type().as_str())
                    .bind(resource.id())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        row.map(Membership::try_from).transpose()
    }

    async fn update_role(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
        role: Role,
    ) -> Result<Option<Membership>, AppError> {
        let sql = format!(
            r#"
            UPDATE memberships
            SET role = $4, updated_at = NOW()
            WHERE user_id = $1 AND resource_type = $2 AND resource_id = $3
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        );

        let row = ctx
            .run(async {
                sqlx::query_as::<_, MembershipRow>(&sql)
                    .bind(user_id)
                    .bind(resource.resource_type().as_str())
                    .bind(resource.id())
                    .bind(role.as_str())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| map_unique_violation(e, "dono da organização"))
            })
            .await?;

        row.map(Membership::try_from).transpose()
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        let result = ctx
            .run(async {
                sqlx::query(
                    r#"
                    DELETE FROM memberships
                    WHERE user_id = $1 AND resource_type = $2 AND resource_id = $3
                    "#,
                )
                .bind(user_id)
                .bind(resource.resource_type().as_str())
                .bind(resource.id())
                .execute(&self.pool)
                .await
                .map_err(AppError::from)
            })
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        resource_type: Option<ResourceType>,
    ) -> Result<Vec<Membership>, AppError> {
        // $2 NULL = todos os tipos
        let sql = format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR resource_type = $2)
            ORDER BY created_at
            "#
        );

        let rows = ctx
            .run(async {
                sqlx::query_as::<_, MembershipRow>(&sql)
                    .bind(user_id)
                    .bind(resource_type.map(|t| t.as_str()))
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        into_memberships(rows)
    }

    async fn list_for_resource(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<Vec<Membership>, AppError> {
        let sql = format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM memberships
            WHERE resource_type = $1 AND resource_id = $2
            ORDER BY created_at
            "#
        );

        let rows = ctx
            .run(async {
                sqlx::query_as::<_, MembershipRow>(&sql)
                    .bind(resource.resource_type().as_str())
                    .bind(resource.id())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        into_memberships(rows)
    }

    async fn has_any_members(
        &self,
        ctx: &RequestContext,
        resource: ResourceRef,
    ) -> Result<bool, AppError> {
        // SELECT EXISTS: só queremos saber se existe, não quantos.
        let exists: bool = ctx
            .run(async {
                sqlx::query_scalar(
                    r#"
                    SELECT EXISTS (
                        SELECT 1 FROM memberships
                        WHERE resource_type = $1 AND resource_id = $2
                    )
                    "#,
                )
                .bind(resource.resource_type().as_str())
                .bind(resource.id())
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)
            })
            .await?;

        Ok(exists)
    }

    async fn project_access(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        project_id: Uuid,
    ) -> Result<Option<ProjectAccess>, AppError> {
        // Uma única query = um único snapshot. Um AddMember concorrente não
        // consegue "fechar" o projeto no meio da resolução.
        let row = ctx
            .run(async {
                sqlx::query_as::<_, ProjectAccessRow>(
                    r#"
                    SELECT
                        (SELECT m.role FROM memberships m
                          WHERE m.resource_type = 'project'
                            AND m.resource_id = p.id
                            AND m.user_id = $1) AS explicit_role,
                        EXISTS (SELECT 1 FROM memberships m
                          WHERE m.resource_type = 'project'
                            AND m.resource_id = p.id) AS has_explicit_members,
                        (SELECT m.role FROM memberships m
                          WHERE m.resource_type = 'org'
                            AND m.resource_id = p.organization_id
                            AND m.user_id = $1) AS org_role
                    FROM projects p
                    WHERE p.id = $2
                    "#,
                )
                .bind(user_id)
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::from)
            })
            .await?;

        row.map(ProjectAccess::try_from).transpose()
    }
}
