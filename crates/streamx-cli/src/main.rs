//! `streamx-publish`: publishes CloudEvents read from a file or stdin.
//!
//! Usage: `streamx-publish [FILE]`. The client is configured from
//! `STREAMX_INGESTION_URL`, `STREAMX_INGESTION_PATH`, `STREAMX_AUTH_TOKEN`
//! and `STREAMX_TIMEOUT_SECS`.

use std::error::Error;
use std::io::Read;
use std::process::ExitCode;

use streamx_ingestion::{ClientConfig, Publisher, RequestOptions};
use tracing_subscriber::EnvFilter;

mod input;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let raw = match std::env::args().nth(1) {
        Some(path) if path != "-" => std::fs::read(&path)
            .map_err(|e| format!("failed to read {path}: {e}"))?,
        _ => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    let events = input::parse_events(&raw)?;

    let client = ClientConfig::from_env()?.into_builder().build()?;
    tracing::info!(
        endpoint = %client.ingestion_endpoint(),
        events = events.len(),
        "Publishing events"
    );

    let publisher = client.new_publisher();
    let options = RequestOptions::default();
    let outcome = match events.as_slice() {
        [event] => publisher.send(event, &options).await.map(|result| vec![result]),
        _ => publisher.send_multi(&events, &options).await,
    };

    match outcome {
        Ok(results) => {
            println!("{}", input::render_events(&results)?);
            Ok(())
        }
        Err(e) => {
            if !e.response_events().is_empty() {
                eprintln!("{}", input::render_events(e.response_events())?);
            }
            Err(e.into())
        }
    }
}
