// crates/server/src/main.rs
//! chat-analytics binary.
//!
//! `serve` (the default) starts the dashboard API; `report` and `demo` work
//! on an export file without a server.

use std::time::Instant;

use anyhow::Result;
use chat_analytics_core::fixtures::DemoOptions;
use chat_analytics_server::cli::{Cli, Commands, ServeArgs};
use chat_analytics_server::commands::{run_demo, run_report};
use chat_analytics_server::{create_app, init_metrics, AppState, Config};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,chat_analytics_server=info,chat_analytics_db=info";
const VERBOSE_LOG_FILTER: &str =
    "info,chat_analytics_server=debug,chat_analytics_db=debug,chat_analytics_core=debug";

fn init_tracing(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn serve(args: ServeArgs) -> Result<()> {
    let startup_start = Instant::now();
    init_metrics();

    eprintln!("\nchat-analytics v{}\n", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().with_overrides(args.host, args.port, args.static_dir);
    let addr = config.addr();
    if config.static_dir.is_none() {
        tracing::info!("No static directory found, running in API-only mode");
    }

    let app = create_app(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let url = format!("http://{}", addr);
    eprintln!(
        "  Ready in {}ms\n  -> {}\n",
        startup_start.elapsed().as_millis(),
        url
    );
    if args.open {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "Could not open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => serve(ServeArgs::default()).await,
        Some(Commands::Serve(args)) => serve(args).await,
        Some(Commands::Report { file, format }) => {
            let output = run_report(&file, format).await?;
            println!("{}", output);
            Ok(())
        }
        Some(Commands::Demo {
            input,
            output,
            months,
            max,
            truncate,
        }) => {
            let options = DemoOptions {
                months,
                max_conversations: max,
                truncate_chars: truncate,
            };
            let kept = run_demo(&input, &output, &options).await?;
            eprintln!("Wrote {} conversations to {}", kept, output.display());
            Ok(())
        }
    }
}
