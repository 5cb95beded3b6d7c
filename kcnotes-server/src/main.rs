use anyhow::Context;
use tracing::error;

use kcnotes_server::{init_tracing, run, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env().context("load configuration")?;
    if let Err(e) = run(config).await {
        error!("fatal: {e:#}");
        return Err(e);
    }
    Ok(())
}
