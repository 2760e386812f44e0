use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{error, info};

use bookgrid::bootstrap::app::create_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "bookgrid=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let app = match create_app() {
        Ok(app) => app,
        Err(e) => {
            error!(error = ?e, "application bootstrap failed");
            return Err(e.into());
        }
    };
    let cfg = app.context().cfg.clone();
    info!(port = cfg.api_port, production = cfg.is_production, "Starting bookgrid backend");

    bookgrid::infrastructure::db::migrate(app.context().db().pool()).await?;

    let groups: Vec<&str> = app.route_groups().iter().map(|g| g.name).collect();
    info!(?groups, pages = ?app.pages(), "routes mounted");

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    info!(%api_addr, "HTTP API listening");

    axum::serve(listener, app.into_router())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(?e, "failed to listen for shutdown signal");
            }
        })
        .await?;
    Ok(())
}
