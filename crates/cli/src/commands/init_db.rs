use anyhow::{Context, Result};
use unisync_storage::SyncStore;

use super::{connect_storage, load_config};

pub(crate) async fn run() -> Result<()> {
    let config = load_config()?;
    let storage = connect_storage(&config)?;

    let mut session = storage.begin().await.context("could not connect to database")?;
    session.ensure_schema().await?;
    session.commit().await?;
    storage.close().await;

    tracing::info!("table universities is ready");
    Ok(())
}
