use anyhow::Result;
use unisync_storage::SyncStore;

use super::{connect_storage, load_config};

pub(crate) async fn run() -> Result<()> {
    let config = load_config()?;
    let storage = connect_storage(&config)?;
    let count = storage.count_rows().await?;
    storage.close().await;
    println!("{count}");
    Ok(())
}
