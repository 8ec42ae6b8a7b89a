// src/config.rs

use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};

use crate::db::{
    MemoryStore, MembershipRepository, MembershipStore, OrganizationRepository,
    OrganizationStore, ProjectRepository, ProjectStore,
};
use crate::services::{
    Authorizer, MembershipManager, OrganizationService, ProjectService, SimpleAuthorizer,
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    /// Sem `DATABASE_URL` o servidor sobe com o backend em memória.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub bind_addr: String,
    pub run_migrations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            bind_addr: "0.0.0.0:3000".to_string(),
            run_migrations: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout: Duration::from_secs(parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            run_migrations: parse_var("RUN_MIGRATIONS", defaults.run_migrations)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<dyn Authorizer>,
    pub membership_manager: MembershipManager,
    pub org_service: OrganizationService,
    pub project_service: ProjectService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let Some(database_url) = &config.database_url else {
            tracing::warn!("⚠️ DATABASE_URL não definida; usando armazenamento em memória");
            return Ok(Self::in_memory());
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        if config.run_migrations {
            sqlx::migrate!().run(&db_pool).await?;
            tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
        }

        Ok(Self::from_stores(
            Arc::new(MembershipRepository::new(db_pool.clone())),
            Arc::new(OrganizationRepository::new(db_pool.clone())),
            Arc::new(ProjectRepository::new(db_pool)),
        ))
    }

    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self::from_stores(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
        )
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_stores(
        memberships: Arc<dyn MembershipStore>,
        orgs: Arc<dyn OrganizationStore>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        let authorizer: Arc<dyn Authorizer> = Arc::new(SimpleAuthorizer::new(memberships.clone()));
        let membership_manager = MembershipManager::new(memberships);

        let org_service = OrganizationService::new(
            orgs.clone(),
            authorizer.clone(),
            membership_manager.clone(),
        );
        let project_service = ProjectService::new(
            projects,
            orgs,
            authorizer.clone(),
            membership_manager.clone(),
        );

        Self {
            authorizer,
            membership_manager,
            org_service,
            project_service,
        }
    }
}
