//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rebac::{config::Config, routes::build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger; RUST_LOG controla o nível (padrão: info).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    // Se a configuração ou o banco falharem, a aplicação não deve iniciar.
    let app_state = AppState::new(&config).await?;

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
