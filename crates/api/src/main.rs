use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use kanban_api::config::ServerConfig;
use kanban_api::kanban::KanbanService;
use kanban_api::membership::HttpMembershipOracle;
use kanban_api::router::build_app_router;
use kanban_api::state::AppState;
use kanban_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "kanban_api=debug,kanban_db=info,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        membership_url = %config.membership_url,
        retry_limit = config.chain_retry_limit,
        "Loaded board configuration",
    );

    let pool = prepare_database().await;

    let membership = HttpMembershipOracle::new(
        config.membership_url.clone(),
        Duration::from_millis(config.membership_timeout_ms),
    )
    .expect("Failed to build membership client");

    let kanban = KanbanService::new(pool.clone(), Arc::new(membership), config.chain_retry_limit);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        kanban: Arc::new(kanban),
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Board service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Board service stopped");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify and migrate. Startup aborts if any step fails.
async fn prepare_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = kanban_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    kanban_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    kanban_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready");
    pool
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Ctrl-C received, draining connections"),
        () = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
