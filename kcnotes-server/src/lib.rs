//! kcnotes-server: servizio HTTP per note con autenticazione a token su SQLite.

use std::sync::Arc;

use anyhow::Context;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

pub mod auth;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod extract;
pub mod routes;
pub mod store;

pub use auth::TokenService;
pub use config::Config;
pub use database::{build_sqlite_url, connect_pool, run_migrations, sqlite_url_for_path};
pub use error::AppError;
pub use store::Store;

/// Stato condiviso passato esplicitamente a ogni handler tramite `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub tokens: TokenService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Store::new(pool),
            tokens: TokenService::new(&config.secret, config.token_ttl),
            config: Arc::new(config),
        })
    }
}

/// Logging su stdout; il filtro si controlla con RUST_LOG.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kcnotes_server=debug,tower_http=debug"));
    fmt().with_env_filter(filter).init();
}

/// Avvio completo: database, migrazioni, listener e serve fino al segnale di shutdown.
pub async fn run(config: Config) -> anyhow::Result<()> {
    // Costruisci l'URL del database SQLite
    let db_url = build_sqlite_url(&config.database_url).context("build sqlite DATABASE_URL")?;
    info!("Using DATABASE_URL = {}", db_url);
    let pool = connect_pool(&db_url).await.context("connect to sqlite")?;
    info!("Connected to DB");

    // senza schema nessuna operazione ha senso: un errore qui termina il processo
    let applied = run_migrations(&pool).await.context("run migrations")?;
    info!("Schema up to date ({} migrations applied now)", applied.len());

    let addr = config.bind_addr();
    let app = routes::router(AppState::new(pool.clone(), config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind tcp listener on {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;

    pool.close().await;
    info!("Disconnected from DB, server has been gracefully terminated");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
