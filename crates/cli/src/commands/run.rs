use anyhow::Result;

use super::build_app;

pub(crate) async fn run(strict: bool) -> Result<()> {
    let app = build_app()?;
    let report = app.pipeline.run().await;
    app.storage.close().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if strict && let Some(failure) = &report.failure {
        anyhow::bail!("sync run aborted ({}): {}", failure.kind, failure.message);
    }
    Ok(())
}
