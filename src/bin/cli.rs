//! syncpoint CLI: wait for or announce service readiness

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use syncpoint::common::DEFAULT_STATUS;
use syncpoint::coordination::query_status;
use syncpoint::{
    Error, HttpStoreClient, NotifyPublisher, NotifyRequest, Settings, WaitCoordinator,
    WaitRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for argument errors, kept clear of the mismatch code
const USAGE_EXIT: u8 = 11;

#[derive(Parser)]
#[command(name = "syncpoint")]
#[command(about = "Coordinate service startup through a shared key-value store")]
#[command(version)]
struct Cli {
    /// Store URL (overrides SYNCPOINT_ENDPOINT and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Block until a service reports a status
    Wait {
        /// Service name
        service: String,

        /// Seconds to wait (0 waits forever)
        #[arg(short = 't', long, default_value_t = 0)]
        timeout: u64,

        /// Status to wait for
        #[arg(short = 's', long, default_value = DEFAULT_STATUS)]
        status: String,
    },

    /// Publish a service status
    Notify {
        /// Service name
        service: String,

        /// Status to publish
        #[arg(short = 's', long, default_value = DEFAULT_STATUS)]
        status: String,

        /// Expire the status after this many seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Print the current status of a service
    Status {
        /// Service name
        service: String,
    },
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))?,
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

async fn run(cli: Cli, settings: Settings) -> syncpoint::Result<()> {
    let store = HttpStoreClient::new(&settings)?;
    tracing::debug!("Using store at {}", store.endpoint());

    match cli.command {
        Commands::Wait {
            service,
            timeout,
            status,
        } => {
            let request = WaitRequest::new(service)
                .expecting(status)
                .with_timeout(timeout);
            WaitCoordinator::new(store).wait(&request).await?;
        }

        Commands::Notify {
            service,
            status,
            ttl,
        } => {
            let request = NotifyRequest::new(service)
                .with_status(status)
                .with_ttl(ttl);
            NotifyPublisher::new(store).publish(&request).await?;
        }

        Commands::Status { service } => match query_status(&store, &service).await? {
            Some(status) => println!("{} {}", service, status),
            None => println!("{} absent", service),
        },
    }

    Ok(())
}

fn report(e: &Error) -> ExitCode {
    e.log();
    ExitCode::from(e.exit_code() as u8)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(USAGE_EXIT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let settings = match Settings::load(cli.config.as_deref())
        .and_then(|s| s.with_endpoint(cli.endpoint.clone()))
    {
        Ok(settings) => settings,
        Err(e) => {
            let _ = init_tracing("warn");
            return report(&e);
        }
    };

    if let Err(e) = init_tracing(&settings.log_level) {
        eprintln!("syncpoint: logging disabled: {}", e);
    }

    match run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}
