//! End-to-end HTTP tests against a locally bound check server.

use backup_check_core::{CheckServer, CheckServerConfig, ObjectSummary, StoreConnector};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use super::helpers::{
    connector_with, http_get, object_aged, write_config, SlowStoreConnector, SAMPLE_CONFIG,
};

/// Start a server on an ephemeral port, returning its address and a
/// shutdown handle
async fn start_server(
    config_path: std::path::PathBuf,
    objects: Vec<ObjectSummary>,
) -> (SocketAddr, broadcast::Sender<()>) {
    start_server_with(config_path, Arc::new(connector_with(objects))).await
}

async fn start_server_with(
    config_path: std::path::PathBuf,
    connector: Arc<dyn StoreConnector>,
) -> (SocketAddr, broadcast::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = CheckServerConfig::default().config_path(config_path);
    let server = CheckServer::new(config, connector);

    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(async move { server.serve(listener, rx).await });
    (addr, tx)
}

#[tokio::test]
async fn test_check_over_http() {
    let now = Utc::now();
    let (_dir, path) = write_config(SAMPLE_CONFIG);
    let (addr, shutdown) = start_server(
        path,
        vec![object_aged("postgres/2024-08-31.sql.gz", now, 2, 256)],
    )
    .await;

    assert_eq!(
        http_get(addr, "/prod/db").await,
        (200, "Backup is OK!".to_string())
    );
    assert_eq!(
        http_get(addr, "/prod/media").await,
        (
            404,
            "Could not find any files matching `media` backup settings".to_string()
        )
    );
    assert_eq!(
        http_get(addr, "/prod").await,
        (400, "Please specify an environment and service".to_string())
    );
    assert_eq!(
        http_get(addr, "/staging/db").await,
        (404, "Could not find environment".to_string())
    );

    let (status, body) = http_get(addr, "/metrics").await;
    assert_eq!(status, 200);
    assert!(body.contains("backup_check_checks_total"));

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_stale_and_small_backups_over_http() {
    let now = Utc::now();
    let (_dir, path) = write_config(SAMPLE_CONFIG);

    let (addr, shutdown) = start_server(
        path.clone(),
        vec![object_aged("postgres/old.sql.gz", now, 50, 200)],
    )
    .await;
    assert_eq!(
        http_get(addr, "/prod/db").await,
        (500, "Latest backup found is too old".to_string())
    );
    shutdown.send(()).unwrap();

    let (addr, shutdown) = start_server(
        path,
        vec![object_aged("postgres/small.sql.gz", now, 10, 50)],
    )
    .await;
    assert_eq!(
        http_get(addr, "/prod/db").await,
        (500, "Latest backup found is too small".to_string())
    );
    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_token_protected_config() {
    let now = Utc::now();
    let protected = SAMPLE_CONFIG.replacen('{', r#"{"token": "let-me-in","#, 1);
    let (_dir, path) = write_config(&protected);
    let (addr, shutdown) = start_server(
        path,
        vec![object_aged("postgres/2024-08-31.sql.gz", now, 2, 256)],
    )
    .await;

    assert_eq!(
        http_get(addr, "/prod/db").await,
        (403, "Access forbidden".to_string())
    );
    assert_eq!(http_get(addr, "/prod/db?token=wrong").await.0, 403);
    assert_eq!(
        http_get(addr, "/prod/db?token=let-me-in").await,
        (200, "Backup is OK!".to_string())
    );

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_config_is_reread_per_request() {
    let now = Utc::now();
    let (_dir, path) = write_config(SAMPLE_CONFIG);
    let (addr, shutdown) = start_server(
        path.clone(),
        vec![object_aged("postgres/2024-08-31.sql.gz", now, 30, 256)],
    )
    .await;

    assert_eq!(http_get(addr, "/prod/db").await.0, 500);

    // Relax the threshold; the next request must pick it up
    std::fs::write(&path, SAMPLE_CONFIG.replace(r#""age": "1D""#, r#""age": "2D""#)).unwrap();
    assert_eq!(http_get(addr, "/prod/db").await.0, 200);

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let (_dir, path) = write_config(SAMPLE_CONFIG);
    let connector = SlowStoreConnector {
        delay: Duration::from_secs(5),
        timeout: Duration::from_millis(50),
    };
    let (addr, shutdown) = start_server_with(path, Arc::new(connector)).await;

    assert_eq!(
        http_get(addr, "/prod/db").await,
        (500, "Could not list backup files".to_string())
    );

    let (_, metrics) = http_get(addr, "/metrics").await;
    assert!(metrics.contains(r#"error_type="timeout""#));
    assert!(metrics.contains(r#"outcome="error""#));

    shutdown.send(()).unwrap();
}

#[tokio::test]
async fn test_malformed_sibling_backup_over_http() {
    let now = Utc::now();
    let config = SAMPLE_CONFIG.replace(
        r#""media": {"age": "2W", "prefix": "media/"}"#,
        r#""media": {"age": 1.5}"#,
    );
    let (_dir, path) = write_config(&config);
    let (addr, shutdown) = start_server(
        path,
        vec![object_aged("postgres/2024-08-31.sql.gz", now, 2, 256)],
    )
    .await;

    assert_eq!(
        http_get(addr, "/prod/db").await,
        (200, "Backup is OK!".to_string())
    );
    assert_eq!(
        http_get(addr, "/prod/web").await,
        (400, "Could not find `web` backup settings".to_string())
    );
    assert_eq!(
        http_get(addr, "/prod/media").await,
        (
            500,
            "Backup configuration is improperly configured".to_string()
        )
    );

    shutdown.send(()).unwrap();
}
