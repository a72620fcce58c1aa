use anyhow::Result;
use backup_check_core::DEFAULT_PORT;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "backup-check")]
#[command(about = "Report whether the latest backup in a bucket is fresh enough", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Listen to this port to run the HTTP server
    #[arg(short, long, global = true, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Path to config.json
    #[arg(short, long, global = true, default_value = "./config.json")]
    config: PathBuf,

    /// Seconds to wait for an object store listing before failing the check
    #[arg(long, global = true, default_value = "30")]
    store_timeout: u64,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP check server (default)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,
    },

    /// Check one backup and exit non-zero unless it is OK
    Check {
        /// Environment name from the config file
        environment: String,

        /// Backup name within the environment
        service: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let store_timeout = Duration::from_secs(cli.store_timeout);

    match cli.command {
        None => {
            commands::serve::run(
                IpAddr::from([0, 0, 0, 0]),
                cli.port,
                &cli.config,
                store_timeout,
            )
            .await?;
        }
        Some(Commands::Serve { bind }) => {
            commands::serve::run(bind, cli.port, &cli.config, store_timeout).await?;
        }
        Some(Commands::Check {
            environment,
            service,
        }) => {
            commands::check::run(&cli.config, &environment, &service, store_timeout).await?;
        }
    }

    Ok(())
}
