use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod model;
mod protocol;
mod services;

use config::AppConfig;
use services::ai::HttpBackend;
use services::session::Session;

fn init_logging() {
    // stdout carries protocol responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let config = AppConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; requests will be sent without credentials");
    }

    let backend = match HttpBackend::new(&config) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(endpoint = %config.api_url, "huayu-core ready");
    let session = Session::new(config, Box::new(backend));

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| protocol::handle(&session, &line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }

    ExitCode::SUCCESS
}
