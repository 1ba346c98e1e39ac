use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cyberwar_client::config::ClientConfig;
use cyberwar_client::render::TracingSink;
use cyberwar_client::replay::{feed, parse_transcript};
use cyberwar_client::runtime::{TokioClock, run};
use cyberwar_client::Client;
use cyberwar_core::net::protocol::encode_client_json;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: cyberwar-replay <transcript.jsonl> [--linger-ms=N]");
        std::process::exit(2);
    };

    let linger_ms = std::env::args()
        .nth(2)
        .and_then(|a| a.strip_prefix("--linger-ms=").map(String::from))
        .and_then(|p| p.parse::<u64>().ok())
        .unwrap_or(2000);

    let config = ClientConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Failed to read {path}: {e}");
            std::process::exit(1);
        },
    };
    let entries = match parse_transcript(&content) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        },
    };

    tracing::info!(entries = entries.len(), "Replaying {path}");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let (tx, rx) = mpsc::channel(64);
    let mut client = Client::new(&config, Box::new(TokioClock::new()), TracingSink, out_tx);

    tokio::join!(run(&mut client, rx), feed(entries, tx, linger_ms));

    while let Ok(msg) = out_rx.try_recv() {
        match encode_client_json(&msg) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode outbound command"),
        }
    }
}
