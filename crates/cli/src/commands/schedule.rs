use anyhow::Result;
use unisync_service::Scheduler;

use super::build_app;

pub(crate) async fn run() -> Result<()> {
    let app = build_app()?;
    let scheduler = Scheduler::new(app.pipeline.clone(), app.notifier.clone(), app.config.schedule);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    scheduler.run_until(shutdown).await;

    app.storage.close().await;
    Ok(())
}
