use anyhow::{bail, Context, Result};
use backup_check_core::{render_verdict, BackupChecker, MonitorConfig, S3Connector};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub async fn run(
    config_path: &Path,
    environment: &str,
    service: &str,
    store_timeout: Duration,
) -> Result<()> {
    info!("Loading configuration from: {}", config_path.display());
    let config = MonitorConfig::load(config_path).await?;

    let environment_config = config
        .environment(environment)
        .with_context(|| format!("Could not find environment `{}`", environment))??;

    let checker = BackupChecker::new(Arc::new(S3Connector::new(store_timeout)));
    let verdict = checker
        .check(&environment_config, service, Utc::now())
        .await?;

    let (status, message) = render_verdict(&verdict, service);
    println!("{}", message);

    if !verdict.is_ok() {
        bail!("{}/{} failed with status {}: {}", environment, service, status.as_u16(), verdict);
    }
    Ok(())
}
