use anyhow::Result;
use backup_check_core::{CheckServer, CheckServerConfig};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub async fn run(bind: IpAddr, port: u16, config_path: &Path, store_timeout: Duration) -> Result<()> {
    let config = CheckServerConfig {
        bind_address: SocketAddr::new(bind, port),
        config_path: config_path.to_path_buf(),
        store_timeout,
    };

    info!(
        "Starting backup check server on {} with config {}",
        config.bind_address,
        config_path.display()
    );

    CheckServer::with_s3(config).run_until_shutdown().await?;

    info!("Backup check server stopped");
    Ok(())
}
