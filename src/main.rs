use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use url::Url;

use wacz_exhibitor::{EmbedParams, Inbound, Relay, ReplayWidget};

/// Stdio harness for the exhibitor relay: inbound envelopes arrive as JSON
/// lines on stdin, outbound messages leave as JSON lines on stdout. The embed
/// page address (with its query string) comes from argv.
#[tokio::main]
async fn main() -> Result<()> {
    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let raw = std::env::args()
        .nth(1)
        .context("usage: wacz-exhibitor <embed-page-url>")?;
    let page = Url::parse(&raw).context("invalid embed page url")?;
    let params =
        EmbedParams::from_query(page.query().unwrap_or("")).context("startup configuration")?;

    tracing::info!(target = "harness", source = %params.source, page = %page, "starting relay");

    let widget = Arc::new(ReplayWidget::new(&params));
    // The in-memory widget "renders" immediately.
    widget.hydrate(json!({}));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let relay = Relay::new(widget, page, tx);

    tokio::spawn(async move {
        let mut out = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(line) => {
                    if out.write_all(line.as_bytes()).await.is_err()
                        || out.write_all(b"\n").await.is_err()
                    {
                        break;
                    }
                    let _ = out.flush().await;
                }
                Err(err) => {
                    tracing::error!(target = "harness", error = %err, "serialize outbound");
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Inbound>(&line) {
            Ok(message) => relay.on_message(message),
            Err(err) => {
                tracing::warn!(target = "harness", error = %err, "unparseable inbound line");
            }
        }
    }

    Ok(())
}
