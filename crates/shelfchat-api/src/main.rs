//! shelfchat entry point.
//!
//! Binary name: `shelfchat`
//!
//! Parses CLI arguments, sets up tracing, then serves the web chat, runs the
//! terminal chat or handles a history command.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, HistoryCommand};
use shelfchat_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(default_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(shell, &mut cmd, "shelfchat", &mut std::io::stdout());
        }

        Commands::Serve { port, host, model } => {
            let state = AppState::init(model).await?;

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!();
                println!(
                    "  {} {} listening on {}",
                    console::style("⚡").bold(),
                    console::style(&state.config.title).bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {}  {}",
                    console::style("Model:").bold(),
                    console::style(&state.config.model).dim()
                );
                println!(
                    "  {}   {}",
                    console::style("Data:").bold(),
                    console::style(state.data_dir.display()).dim()
                );
                if let Some(reason) = state.session.lock().await.status().halted_reason() {
                    println!("  {} {}", console::style("!").red().bold(), reason);
                }
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Chat { model } => {
            let state = AppState::init(model).await?;
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::History { action } => {
            let history = state::open_history().await?;
            match action {
                HistoryCommand::Show { limit } => {
                    cli::history::show_history(&history, limit, cli.json).await?;
                }
                HistoryCommand::Clear { force } => {
                    cli::history::clear_history(&history, force, cli.json).await?;
                }
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
