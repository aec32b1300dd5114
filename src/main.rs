//! fitplan CLI binary entry point.

use clap::Parser;
use fitplan::cli::Cli;
use fitplan::config::FitplanConfig;
use fitplan::session::{SessionEvent, SessionManager};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = FitplanConfig::from_env();
    if let Some(url) = cli.api_url.clone() {
        config = config.with_base_url(url);
    }

    let session = match SessionManager::from_config(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    session.on_event(Arc::new(|event: &SessionEvent| {
        if let SessionEvent::Redirect { .. } = event {
            eprintln!("⚠️  Your session has expired. Run `fitplan auth login <username>`.");
        }
    }));

    if let Err(e) = fitplan::cli::run(cli.command, &session).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
