//! storefront-api binary

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::config::Config;
use storefront_api::http::{router, AppState};
use storefront_api::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connecting to postgres")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("running migrations")?;
            tracing::info!("using postgres store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store with demo data");
            Arc::new(MemoryStore::demo().map_err(|e| anyhow::anyhow!("seeding demo data: {e}"))?)
        }
    };

    let nats = match &config.nats_url {
        Some(url) => {
            let client = async_nats::connect(url)
                .await
                .context("connecting to nats")?;
            tracing::info!("publishing domain events to nats");
            Some(client)
        }
        None => None,
    };

    if config.test_pay_enabled() {
        tracing::warn!("PAYPAL_CLIENT_ID not set; synthetic payment captures enabled");
    }

    let port = config.port;
    let app = router(AppState::new(store, config, nats));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "storefront-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
