//! Counter demo plugin for a WebSocket-driven control-surface host.
//!
//! Two processes, one library: the plugin binary handles input events and
//! persists a per-instance counter, the `pi-bridge` binary relays
//! configuration-form values between the panel and the plugin. Both speak the
//! host's JSON envelope over a loopback WebSocket and register themselves
//! once per socket.

pub mod action;
pub mod client;
pub mod inspector;
pub mod launch;
pub mod protocol;
pub mod settings;

pub use action::CounterAction;
pub use inspector::{BridgeState, InspectorBridge};
pub use launch::LaunchArgs;
pub use settings::CounterSettings;
