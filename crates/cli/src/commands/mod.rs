pub(crate) mod classify;
pub(crate) mod count;
pub(crate) mod init_db;
pub(crate) mod run;
pub(crate) mod schedule;

use std::sync::Arc;

use anyhow::{Context, Result};
use unisync_core::SyncConfig;
use unisync_service::{notifier_from_config, Notifier, SyncPipeline};
use unisync_source::SourceClient;
use unisync_storage::PgStorage;

/// Everything wired together from a validated configuration.
pub(crate) struct App {
    pub(crate) config: SyncConfig,
    pub(crate) storage: Arc<PgStorage>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) pipeline: Arc<SyncPipeline>,
}

pub(crate) fn load_config() -> Result<SyncConfig> {
    let config = SyncConfig::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

pub(crate) fn connect_storage(config: &SyncConfig) -> Result<Arc<PgStorage>> {
    let storage = PgStorage::new(&config.database_url).context("invalid DATABASE_URL")?;
    Ok(Arc::new(storage))
}

pub(crate) fn build_app() -> Result<App> {
    let config = load_config()?;
    let storage = connect_storage(&config)?;
    let source = SourceClient::new(&config.source)?;
    let notifier = notifier_from_config(&config.notify)?;
    let pipeline = Arc::new(SyncPipeline::new(Arc::new(source), storage.clone(), notifier.clone()));
    Ok(App { config, storage, notifier, pipeline })
}
