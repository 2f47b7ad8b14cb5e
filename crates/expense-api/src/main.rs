//! Expense gateway entry point.
//!
//! Binary name: `expense-gateway`
//!
//! Parses CLI arguments, sets up tracing, connects to the pod, then either
//! serves the REST API or runs a one-off command.

mod cli;
mod http;
mod state;

use clap::Parser;
use expense_observe::tracing_setup::{init_tracing, shutdown_tracing, TracingConfig};
use url::Url;

use cli::{Cli, Commands, ServeArgs};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,expense_gateway=debug,expense_core=debug,expense_infra=debug",
        _ => "trace",
    };
    let tracing_config = TracingConfig::new(filter).json(cli.log_json).otel(cli.otel);
    init_tracing(&tracing_config)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Pods { webid, json, solid } => {
            let state = AppState::init(&solid)?;
            print_pods(&state, &webid, json).await
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::init(&args.solid)?.with_upload_limit(args.max_upload_bytes);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, upload_limit = args.max_upload_bytes, "expense gateway listening");

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn print_pods(state: &AppState, webid: &Url, json: bool) -> anyhow::Result<()> {
    let pods = state.expense_service.list_pods(webid).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pods)?);
    } else if pods.is_empty() {
        eprintln!("{webid} declares no storage");
    } else {
        for pod in &pods {
            println!("{pod}");
        }
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
