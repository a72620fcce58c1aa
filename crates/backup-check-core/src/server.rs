//! HTTP front end for backup checks.
//!
//! Built on Hyper 1.x. Endpoints:
//! - `GET /{environment}/{service}[?token=...]` - run one backup check
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /healthz` - process liveness
//!
//! The config file is re-read on every check request, so edits take effect
//! without a restart.

use bytes::Bytes;
use chrono::Utc;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::checker::BackupChecker;
use crate::config::MonitorConfig;
use crate::metrics::{CheckMetrics, CheckTimer, UNKNOWN_LABEL};
use crate::storage::{S3Connector, StoreConnector, DEFAULT_LIST_TIMEOUT};
use crate::verdict::{FailureReason, Verdict};
use crate::Error;

const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";

/// Default port of the check server.
pub const DEFAULT_PORT: u16 = 9090;

/// Configuration for the check server.
#[derive(Debug, Clone)]
pub struct CheckServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,
    /// Path of the JSON monitor configuration.
    pub config_path: PathBuf,
    /// Bound on a single object store listing.
    pub store_timeout: Duration,
}

impl Default for CheckServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            config_path: PathBuf::from("./config.json"),
            store_timeout: DEFAULT_LIST_TIMEOUT,
        }
    }
}

impl CheckServerConfig {
    /// Set the config file path.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }
}

/// HTTP server answering backup checks.
pub struct CheckServer {
    config: CheckServerConfig,
    state: Arc<ServerState>,
}

impl CheckServer {
    /// Create a new server listing through `connector`.
    pub fn new(config: CheckServerConfig, connector: Arc<dyn StoreConnector>) -> Self {
        let metrics = Arc::new(CheckMetrics::new());
        let state = Arc::new(ServerState {
            config_path: config.config_path.clone(),
            checker: BackupChecker::new(connector).with_metrics(Arc::clone(&metrics)),
            metrics,
        });
        Self { config, state }
    }

    /// Create a new server listing from S3 with the configured timeout.
    pub fn with_s3(config: CheckServerConfig) -> Self {
        let connector = Arc::new(S3Connector::new(config.store_timeout));
        Self::new(config, connector)
    }

    /// Metrics recorded by this server.
    pub fn metrics(&self) -> &Arc<CheckMetrics> {
        &self.state.metrics
    }

    /// Bind the configured address and serve until `shutdown` fires.
    pub async fn run(&self, shutdown: broadcast::Receiver<()>) -> crate::Result<()> {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| {
                crate::Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to bind check server on {}: {}",
                        self.config.bind_address, e
                    ),
                ))
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` fires.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> crate::Result<()> {
        let local_addr = listener.local_addr()?;
        info!(
            "Ready for service on http://{} (config: {})",
            local_addr,
            self.config.config_path.display()
        );

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("Connection from {}", addr);

                            let io = TokioIo::new(stream);
                            let state = Arc::clone(&self.state);

                            // One task per connection; checks share no mutable state
                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    let state = Arc::clone(&state);
                                    async move {
                                        Ok::<_, Infallible>(handle_request(req, &state).await)
                                    }
                                });

                                if let Err(err) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    // Monitoring clients often hang up before the check finishes
                                    if err.is_incomplete_message() || err.is_canceled() {
                                        debug!("Client {} went away: {}", addr, err);
                                    } else {
                                        warn!("Error serving connection from {}: {}", addr, err);
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Check server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run the server until Ctrl-C is received.
    pub async fn run_until_shutdown(self) -> crate::Result<()> {
        let (tx, rx) = broadcast::channel(1);

        let shutdown_tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for ctrl-c: {}", e);
            }
            let _ = shutdown_tx.send(());
        });

        self.run(rx).await
    }
}

/// Shared state for request handling.
struct ServerState {
    config_path: PathBuf,
    checker: BackupChecker,
    metrics: Arc<CheckMetrics>,
}

async fn handle_request(req: Request<Incoming>, state: &ServerState) -> Response<Full<Bytes>> {
    let (parts, _body) = req.into_parts();
    respond(&parts.method, &parts.uri, state).await
}

/// Route a request to its response.
async fn respond(method: &Method, uri: &Uri, state: &ServerState) -> Response<Full<Bytes>> {
    if *method != Method::GET {
        return make_response(StatusCode::METHOD_NOT_ALLOWED, TEXT_PLAIN, "Method Not Allowed");
    }

    match uri.path() {
        "/metrics" => {
            return make_response(
                StatusCode::OK,
                "text/plain; version=0.0.4; charset=utf-8",
                &state.metrics.encode(),
            );
        }
        "/healthz" => return make_response(StatusCode::OK, TEXT_PLAIN, "OK"),
        _ => {}
    }

    let Some((environment, service)) = split_target(uri.path()) else {
        return text_response(
            StatusCode::BAD_REQUEST,
            "Please specify an environment and service",
        );
    };

    let (status, body) = run_check(environment, service, query_token(uri).as_deref(), state).await;
    text_response(status, &body)
}

async fn run_check(
    environment: &str,
    service: &str,
    token: Option<&str>,
    state: &ServerState,
) -> (StatusCode, String) {
    let config = match MonitorConfig::load(&state.config_path).await {
        Ok(config) => config,
        Err(Error::ConfigDecode(e)) => {
            error!("Could not decode {}: {}", state.config_path.display(), e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not decode config file".to_string(),
            );
        }
        Err(e) => {
            error!("{}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not find config file".to_string(),
            );
        }
    };

    if !config.authorize(token) {
        warn!("Rejected check of {}/{}: bad or missing token", environment, service);
        return (StatusCode::FORBIDDEN, "Access forbidden".to_string());
    }

    let environment_config = match config.environment(environment) {
        None => {
            debug!("Unknown environment `{}`", environment);
            return (
                StatusCode::NOT_FOUND,
                "Could not find environment".to_string(),
            );
        }
        Some(Err(e)) => {
            let verdict =
                Verdict::failure_with(FailureReason::ImproperlyConfigured, e.to_string());
            state
                .metrics
                .record_check(environment, UNKNOWN_LABEL, verdict.outcome(), 0.0);
            warn!("{}/{}: {}", environment, service, verdict);
            return render_verdict(&verdict, service);
        }
        Some(Ok(environment_config)) => environment_config,
    };

    let service_label = if environment_config.backups.contains_key(service) {
        service
    } else {
        UNKNOWN_LABEL
    };
    let timer = CheckTimer::start(&state.metrics, environment, service_label);

    match state
        .checker
        .check(&environment_config, service, Utc::now())
        .await
    {
        Ok(verdict) => {
            timer.finish(verdict.outcome());
            if verdict.is_ok() {
                info!("{}/{}: backup is OK", environment, service);
            } else {
                warn!("{}/{}: {}", environment, service, verdict);
            }
            render_verdict(&verdict, service)
        }
        Err(e) => {
            error!("{}/{}: check failed: {}", environment, service, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not list backup files".to_string(),
            )
        }
    }
}

/// Status code and body reported for a verdict.
pub fn render_verdict(verdict: &Verdict, service: &str) -> (StatusCode, String) {
    let Verdict::Failure { reason, .. } = verdict else {
        return (StatusCode::OK, "Backup is OK!".to_string());
    };

    match reason {
        FailureReason::ImproperlyConfigured => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Backup configuration is improperly configured".to_string(),
        ),
        FailureReason::ConfigNotFound => (
            StatusCode::BAD_REQUEST,
            format!("Could not find `{}` backup settings", service),
        ),
        FailureReason::FileNotFound => (
            StatusCode::NOT_FOUND,
            format!(
                "Could not find any files matching `{}` backup settings",
                service
            ),
        ),
        FailureReason::TooSmall => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Latest backup found is too small".to_string(),
        ),
        FailureReason::TooOld => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Latest backup found is too old".to_string(),
        ),
    }
}

/// Split `/{environment}/{service}` into its two segments.
fn split_target(path: &str) -> Option<(&str, &str)> {
    let mut segments = path.trim_matches('/').split('/');
    let environment = segments.next()?;
    let service = segments.next()?;
    if segments.next().is_some() || environment.is_empty() || service.is_empty() {
        return None;
    }
    Some((environment, service))
}

/// The `token` query value, with repeated values concatenated in order.
fn query_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    let mut values = url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "token")
        .map(|(_, value)| value)
        .peekable();
    values.peek()?;
    Some(values.collect())
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    make_response(status, TEXT_PLAIN, body)
}

/// Create an HTTP response.
fn make_response(status: StatusCode, content_type: &str, body: &str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    if let Ok(value) = content_type.parse() {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}
