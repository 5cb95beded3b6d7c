//! Applica le migrazioni e termina, senza avviare il server.

use anyhow::Context;
use tracing::info;

use kcnotes_server::{build_sqlite_url, connect_pool, init_tracing, run_migrations, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let raw = Config::database_url_from_env()?;
    let db_url = build_sqlite_url(&raw).context("build sqlite DATABASE_URL")?;
    let pool = connect_pool(&db_url).await.context("connect to sqlite")?;
    let applied = run_migrations(&pool).await.context("run migrations")?;
    pool.close().await;
    if applied.is_empty() {
        info!("Migrations already up to date");
    } else {
        info!("Migrations applied successfully: {}", applied.join(", "));
    }
    Ok(())
}
