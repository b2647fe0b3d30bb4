//! Property-inspector bridge process.
//!
//! Launched by the host alongside the configuration panel with the same flag
//! convention as the plugin, plus `-actionInfo`. Opens its own socket,
//! registers once, then relays form edits to the plugin and plugin payloads
//! back onto the bridge's refresh channel. Stdin stands in for the form
//! layer: each `field=value` line is forwarded as one relay frame.

use anyhow::Context as _;
use deck_counter::inspector::InspectorBridge;
use deck_counter::launch::LaunchArgs;
use deck_counter::protocol::InspectorField;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = LaunchArgs::from_host_argv(std::env::args());
    let action_info = args
        .action_info
        .as_deref()
        .context("the bridge requires -actionInfo")?;

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let mut bridge = InspectorBridge::new(&args.uuid, action_info, outbound_tx)?;

    let url = format!("ws://127.0.0.1:{}", args.port);
    let (socket, _) = connect_async(&url)
        .await
        .with_context(|| format!("connecting to host at {url}"))?;
    let (mut sink, mut stream) = socket.split();
    bridge.socket_opened(&args.register_event)?;
    info!(action = %bridge.action_info().action, "inspector bridge registered");

    // Writer side: everything the bridge queues goes out on the socket.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if sink.send(Message::text(frame)).await.is_err() {
                break;
            }
        }
    });

    // Log refreshed values the way the panel's form layer would consume them.
    let mut refresh = bridge.subscribe();
    tokio::spawn(async move {
        while refresh.changed().await.is_ok() {
            let value = refresh.borrow_and_update().clone();
            info!(%value, "form values refreshed");
        }
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => bridge.handle_frame(text.as_str()),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err).context("reading from host socket"),
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line.context("reading stdin")? else { break };
                match parse_form_line(&line) {
                    Ok(field) => bridge.send_to_plugin(field),
                    Err(err) => warn!(%err, line, "ignoring form input"),
                }
            }
        }
    }

    drop(bridge);
    let _ = writer.await;
    info!("host closed the socket");
    Ok(())
}

/// Parse a `field=value` line from the stand-in form layer.
fn parse_form_line(line: &str) -> Result<InspectorField, String> {
    let (name, raw) = line
        .split_once('=')
        .ok_or_else(|| "expected field=value".to_string())?;
    InspectorField::parse(name.trim(), &Value::String(raw.trim().to_string()))
}
