#![warn(rust_2018_idioms)]

use std::env;
use std::io::Write;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

mod cli;

use cli::{Cli, Output};

#[tokio::main]
async fn main() -> cli::Result<()> {
    let _guard = init_logger();

    let cli = Cli::parse();
    let output = match cli::run(cli).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!("TrueVault command failed: {}", e);
            return Err(e);
        }
    };

    let mut stdout = std::io::stdout().lock();
    match output {
        Output::Json(value) => writeln!(stdout, "{}", serde_json::to_string_pretty(&value)?)?,
        Output::Bytes(bytes) => stdout.write_all(&bytes)?,
        Output::Written(path) => writeln!(stdout, "{}", path.display())?,
    }
    Ok(())
}

fn init_logger() -> Option<WorkerGuard> {
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_log::LogTracer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    if !env::var("JSON_LOG").map_or(false, |s| s.parse().unwrap_or_default()) {
        // stdout carries command output
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    // Redirect the logs from log library to tracing's subscribers.
    LogTracer::init().expect("Unable to setup log tracer!");

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);
    let subscriber = Registry::default()
        .with(env_filter())
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);
    tracing::subscriber::set_global_default(subscriber).expect("Unable to set global subscriber");
    Some(guard)
}

const DEFAULT_LOG_FILTER: &str = "warn,truevault=info,truevault_client=info";

/// `RUST_LOG` when set, otherwise info for this crate and the client
fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
}
