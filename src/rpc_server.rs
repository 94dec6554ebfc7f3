//! Tabspaces stdio harness: drives the workspace engine over newline-delimited JSON.
//!
//! Input, one object per line:
//!   {"channel":"ui","message":{"type":"group","verb":"create","info":{"name":"Work"}}}
//!   {"channel":"host","action":{"kind":"open"}}
//! Output: every engine→UI message, one per line. Logs go to stderr.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tabspaces::app::App;
use tabspaces::rpc_handler::handle_line;
use tabspaces::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Points the harness at a specific settings file.
const CONFIG_ENV: &str = "TABSPACES_CONFIG";

fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings_engine = SettingsEngine::new(std::env::var(CONFIG_ENV).ok());
    let load_result = settings_engine.load();
    init_logging(&settings_engine.get_settings().log_filter);
    if let Err(e) = load_result {
        warn!(error = %e, "settings unreadable, using defaults");
    }

    let app = App::new(settings_engine)?;
    let mut events = app.startup().await?;
    info!(version = env!("CARGO_PKG_VERSION"), "tabspaces ready");

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events.recv().await {
            let mut line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "failed to encode UI message");
                    continue;
                }
            };
            line.push('\n');
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(reply) = handle_line(&app, &line).await {
            app.post(reply).await;
        }
    }

    app.shutdown().await?;
    writer.await?;
    Ok(())
}
