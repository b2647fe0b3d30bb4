//! Property-inspector bridge.
//!
//! The configuration panel runs as its own process with its own socket to the
//! host. This module is the connection context for that socket: the instance
//! UUID, the action binding parsed once at startup, and the outbound frame
//! queue, threaded explicitly instead of living in module globals. Form-field
//! edits are relayed to the plugin (or to other open inspectors) one field per
//! frame; values arriving from the plugin are published on a same-process
//! watch channel so the form layer can refresh.

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::protocol::{InspectorField, Registration, RelayFrame};

/// Action binding delivered at launch, read-only after the initial parse.
/// Extra fields in the blob (coordinates, device, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionInfo {
    pub action: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Disconnected,
    Registered,
}

pub struct InspectorBridge {
    uuid: String,
    action_info: ActionInfo,
    outbound: mpsc::UnboundedSender<String>,
    state: BridgeState,
    /// Refresh signal for the form layer: seeded with the action-info blob so
    /// the form can pre-populate, then fed every relayed payload.
    refresh: watch::Sender<Value>,
}

impl InspectorBridge {
    /// Parse the action-info blob and build the bridge in `Disconnected`
    /// state. A malformed blob is a startup error; the host restarts panels.
    pub fn new(
        uuid: &str,
        action_info_json: &str,
        outbound: mpsc::UnboundedSender<String>,
    ) -> anyhow::Result<Self> {
        let blob: Value =
            serde_json::from_str(action_info_json).context("parsing action info")?;
        let action_info: ActionInfo =
            serde_json::from_value(blob.clone()).context("binding action info")?;
        let (refresh, _) = watch::channel(blob);
        Ok(Self {
            uuid: uuid.to_string(),
            action_info,
            outbound,
            state: BridgeState::Disconnected,
            refresh,
        })
    }

    pub fn action_info(&self) -> &ActionInfo {
        &self.action_info
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Watch channel carrying the initial action info and every payload the
    /// plugin relays back.
    pub fn subscribe(&self) -> watch::Receiver<Value> {
        self.refresh.subscribe()
    }

    /// The socket reported open: send the registration frame and move to
    /// `Registered`. Calling this again is a no-op; registration goes out
    /// exactly once per socket.
    pub fn socket_opened(&mut self, register_event: &str) -> anyhow::Result<()> {
        if self.state == BridgeState::Registered {
            return Ok(());
        }
        let frame = serde_json::to_string(&Registration {
            event: register_event,
            uuid: &self.uuid,
        })?;
        self.outbound
            .send(frame)
            .context("queueing registration frame")?;
        self.state = BridgeState::Registered;
        Ok(())
    }

    /// Relay one form field to the plugin. Silent no-op until registered.
    pub fn send_to_plugin(&self, field: InspectorField) {
        self.relay("sendToPlugin", field);
    }

    /// Relay one form field to other open inspectors for the same action.
    /// Silent no-op until registered.
    pub fn send_to_inspectors(&self, field: InspectorField) {
        self.relay("sendToPropertyInspector", field);
    }

    fn relay(&self, event: &str, field: InspectorField) {
        if self.state != BridgeState::Registered {
            debug!(event, field = field.name(), "socket not open, dropping relay");
            return;
        }
        let frame = RelayFrame {
            action: &self.action_info.action,
            event,
            context: &self.uuid,
            payload: field.to_value(),
        };
        match serde_json::to_string(&frame) {
            Ok(text) => {
                let _ = self.outbound.send(text);
            }
            Err(err) => warn!(%err, "failed to encode relay frame"),
        }
    }

    /// Handle one inbound text frame. Only relayed payloads are interesting;
    /// everything else is ignored.
    pub fn handle_frame(&self, text: &str) {
        let frame: Value = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "skipping malformed inspector frame");
                return;
            }
        };
        match frame["event"].as_str() {
            Some("sendToPropertyInspector") => {
                self.refresh.send_replace(frame["payload"].clone());
            }
            other => debug!(event = ?other, "ignoring inspector event"),
        }
    }
}
