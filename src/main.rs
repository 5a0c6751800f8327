//! NeuralAudit client
//!
//! Uploads a chat transcript and its context document to an audit server,
//! then shows the relevance and faithfulness scores, cost and latency, an
//! activity log and a five-axis chart.

mod cli;
mod core;
mod models;
mod view;

use crate::cli::Cli;
use crate::core::config::Config;
use crate::core::logging::init_logging;
use crate::core::providers::HttpTransport;
use crate::core::session::AuditSession;
use crate::core::transport::AuditError;
use crate::models::audit::{AuditResponse, FileSlot};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

/// Exit code for a completed audit
const EXIT_OK: i32 = 0;

/// Exit code when the audit ran and failed
const EXIT_AUDIT_FAILED: i32 = 1;

/// Exit code for missing input or bad configuration
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(EXIT_USAGE);
        }
    };

    init_logging(&config.log_level);
    print_startup_banner(&config);

    let transport = match HttpTransport::new(config.analyze_url(), config.request_timeout) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            std::process::exit(EXIT_USAGE);
        }
    };

    let session = AuditSession::new(Arc::new(transport), config.extra_axes);
    if let Some(path) = &cli.chat {
        session.select_file(FileSlot::Chat, path).await;
    }
    if let Some(path) = &cli.context {
        session.select_file(FileSlot::Context, path).await;
    }

    let result = session.run_audit().await;
    let view = session.view().await;

    for alert in view.alerts() {
        eprintln!("{}", alert);
    }

    match &result {
        Ok(response) if cli.json => print_json(response),
        _ => println!("{}", view.render()),
    }

    std::process::exit(exit_code(&result));
}

fn exit_code(result: &Result<AuditResponse, AuditError>) -> i32 {
    match result {
        Ok(_) => EXIT_OK,
        Err(e) if e.is_local() => EXIT_USAGE,
        Err(_) => EXIT_AUDIT_FAILED,
    }
}

fn print_json(response: &AuditResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to serialize response: {}", e),
    }
}

/// Log the effective configuration
fn print_startup_banner(config: &Config) {
    info!("NeuralAudit client v{}", env!("CARGO_PKG_VERSION"));
    info!("   Endpoint: {}", config.analyze_url());
    info!("   Request Timeout: {}s", config.request_timeout);
    info!("   Extra chart axes: {:?}", config.extra_axes);
}
