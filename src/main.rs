//! SimpleWeb operator entrypoint.
//!
//! This is the process bootstrap around the reconcile core: CLI parsing,
//! logging, and the controller runtime.

use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use simpleweb_operator::controller;
use simpleweb_operator::error::{ClientError, OperatorError, Result};
use simpleweb_operator::settings::OperatorSettings;

/// SimpleWeb operator - derives Deployments and Services from SimpleWeb
/// resources.
#[derive(Parser, Debug)]
#[command(name = "simpleweb-operator")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Namespace to watch (defaults to all namespaces).
    #[arg(short, long, env = "SIMPLEWEB_NAMESPACE")]
    namespace: Option<String>,

    /// Finalizer name recorded on watched resources.
    #[arg(long, env = "SIMPLEWEB_FINALIZER")]
    finalizer: Option<String>,

    /// Disable posting reconcile outcomes to the resource status.
    #[arg(long)]
    no_status_posting: bool,
}

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Load .env if present; kubeconfig discovery reads the environment.
    dotenvy::dotenv().ok();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let client = kube::Client::try_default()
        .await
        .map_err(|e| OperatorError::Client(ClientError::from(e)))?;

    let mut settings = OperatorSettings::default();
    if let Some(namespace) = cli.namespace {
        settings = settings.with_namespace(namespace);
    }
    if let Some(finalizer) = cli.finalizer {
        settings.finalizer = finalizer;
    }
    if cli.no_status_posting {
        settings = settings.without_status_posting();
    }

    info!("SimpleWeb operator started successfully");
    controller::run(client, settings).await
}
