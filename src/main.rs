use todo_api::application::item_service::ItemServiceImpl;
use todo_api::config::{self, Settings};
use todo_api::domain::repository::ItemRepository;
use todo_api::http::routing::{self, items};
use todo_api::infrastructure::sqlite_repo::SqliteItemRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    config::prepare_sqlite_file(&settings.database_url)?;
    let repo = SqliteItemRepository::connect(&settings.database_url).await?;
    repo.init().await?;
    let service = ItemServiceImpl::new(repo);
    let router = routing::app(items::router(items::AppState { service }));

    tracing::info!(addr = %settings.bind_addr, database_url = %settings.database_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(settings.bind_addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
