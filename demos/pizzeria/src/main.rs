use forno::prelude::*;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod app_module;
mod domain;
mod features;
mod infrastructure;

use app_module::build_application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pizzeria=debug,forno=info,tower_http=info")),
        )
        .init();

    tracing::info!("🍕 Starting pizzeria...");

    let config = ConfigService::new();
    let host = config.get_or("HOST", "127.0.0.1");
    let port = config.get_or("PORT", "3000");

    let app = build_application(config)?;
    for route in app.route_table().manifest() {
        tracing::debug!(
            route = %route.route(),
            anonymous = !route.requires_authorization,
            "mapped"
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    app.layer(TraceLayer::new_for_http()).serve(listener).await?;
    Ok(())
}
