//! Plugin-side WebSocket client.
//!
//! Connects to the loopback port the host handed us at launch, registers the
//! plugin instance, then pumps inbound events through [`CounterAction`] and
//! writes the resulting commands back on the same socket. The host guarantees
//! serialized event delivery per action instance, so one read loop with no
//! further coordination is enough. There is no reconnect: if the socket drops,
//! the host relaunches the plugin process.

use anyhow::Context as _;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::action::CounterAction;
use crate::launch::LaunchArgs;
use crate::protocol::{InboundEvent, Registration};

pub async fn run(args: LaunchArgs) -> anyhow::Result<()> {
    let url = format!("ws://127.0.0.1:{}", args.port);
    let (socket, _) = connect_async(&url)
        .await
        .with_context(|| format!("connecting to host at {url}"))?;
    let (mut sink, mut stream) = socket.split();

    // The one Disconnected → Registered transition: exactly one registration
    // frame, sent only after the socket is open.
    let registration = serde_json::to_string(&Registration {
        event: &args.register_event,
        uuid: &args.uuid,
    })?;
    sink.send(Message::text(registration))
        .await
        .context("sending registration frame")?;
    info!(uuid = %args.uuid, "registered with host");

    let action = CounterAction::new();
    while let Some(frame) = stream.next().await {
        let frame = frame.context("reading from host socket")?;
        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by the transport layer.
            _ => continue,
        };
        let event = match serde_json::from_str::<InboundEvent>(text.as_str()) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "skipping malformed host frame");
                continue;
            }
        };
        if matches!(event, InboundEvent::Unknown) {
            debug!(frame = %text, "ignoring unhandled event");
            continue;
        }
        for command in action.handle(event) {
            let frame = serde_json::to_string(&command)?;
            sink.send(Message::text(frame))
                .await
                .context("sending command to host")?;
        }
    }

    info!("host closed the socket");
    Ok(())
}
