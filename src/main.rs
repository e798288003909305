use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use hirevantage_backend::{
    config::{get_config, init_config, StoreBackend},
    database::{memory_store::MemoryStore, pg_store::PgStore, pool::create_pool},
    notifier_from_config, routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let notifier = notifier_from_config(config);
    let app_state = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = create_pool(config).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Using PostgreSQL store");
            AppState::with_store(Arc::new(PgStore::new(pool)), notifier, &config.jwt_secret)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on restart");
            AppState::with_store(Arc::new(MemoryStore::new()), notifier, &config.jwt_secret)
        }
    };

    let app = routes::router(app_state, config.api_rps)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
