//! Wire envelopes exchanged with the host over the local WebSocket.
//!
//! The host speaks JSON text frames discriminated by an `event` field. We only
//! model the subset this plugin produces and consumes; everything else is
//! decoded as `Unknown` and ignored by the dispatch loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::settings::{coerce_i64, CounterSettings};

// ---------------------------------------------------------------------------
// Inbound events (host → plugin)
// ---------------------------------------------------------------------------

/// Which physical control an action instance is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Controller {
    #[default]
    Keypad,
    Encoder,
    /// Controllers this plugin has no special handling for take the
    /// encoder rendering path, same as `Encoder`.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppearPayload {
    #[serde(default)]
    pub controller: Controller,
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsPayload {
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotatePayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub ticks: i64,
}

/// Events delivered by the host, one frame each. Fields we don't use
/// (`action`, `device`, coordinates, ...) are ignored during decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event")]
pub enum InboundEvent {
    #[serde(rename = "willAppear")]
    WillAppear { context: String, payload: AppearPayload },
    #[serde(rename = "keyDown")]
    KeyDown { context: String, payload: SettingsPayload },
    #[serde(rename = "dialDown")]
    DialDown { context: String, payload: SettingsPayload },
    #[serde(rename = "dialRotate")]
    DialRotate { context: String, payload: RotatePayload },
    #[serde(rename = "touchTap")]
    TouchTap { context: String, payload: SettingsPayload },
    #[serde(rename = "sendToPlugin")]
    SendToPlugin {
        context: String,
        #[serde(default)]
        payload: Value,
    },
    #[serde(rename = "didReceiveSettings")]
    DidReceiveSettings { context: String, payload: SettingsPayload },
    /// Any event kind this plugin doesn't handle.
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Outbound commands (plugin → host)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePayload {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePayload {
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPayload {
    pub layout: String,
}

/// Named fields for a dial/touch feedback layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub value: i64,
    pub icon: String,
}

/// Commands the plugin sends back to the host after handling an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Command {
    SetTitle { context: String, payload: TitlePayload },
    SetImage { context: String, payload: ImagePayload },
    SetSettings { context: String, payload: Value },
    GetSettings { context: String },
    SetFeedbackLayout { context: String, payload: LayoutPayload },
    SetFeedback { context: String, payload: Feedback },
}

impl Command {
    pub fn set_title(context: &str, title: impl Into<String>) -> Self {
        Command::SetTitle {
            context: context.to_string(),
            payload: TitlePayload { title: title.into() },
        }
    }

    pub fn set_image(context: &str, image: &str) -> Self {
        Command::SetImage {
            context: context.to_string(),
            payload: ImagePayload { image: image.to_string() },
        }
    }

    pub fn set_settings(context: &str, settings: CounterSettings) -> Self {
        Command::SetSettings {
            context: context.to_string(),
            payload: settings.to_value(),
        }
    }

    pub fn set_feedback_layout(context: &str, layout: &str) -> Self {
        Command::SetFeedbackLayout {
            context: context.to_string(),
            payload: LayoutPayload { layout: layout.to_string() },
        }
    }

    pub fn set_feedback(context: &str, title: Option<&str>, value: i64, icon: &str) -> Self {
        Command::SetFeedback {
            context: context.to_string(),
            payload: Feedback {
                title: title.map(str::to_string),
                value,
                icon: icon.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Registration and inspector relay frames
// ---------------------------------------------------------------------------

/// Sent exactly once per socket, immediately after it opens. The event name
/// is supplied by the host at launch (`registerPlugin` /
/// `registerPropertyInspector`), so it can't live in the tagged enum above.
#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub event: &'a str,
    pub uuid: &'a str,
}

/// A single configuration-form field relayed between the property inspector
/// and the plugin. The wire form is a single-key map (`{"increment": 5}`);
/// unknown keys are rejected at the boundary instead of being passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorField {
    Increment(i64),
}

impl InspectorField {
    pub fn name(self) -> &'static str {
        match self {
            InspectorField::Increment(_) => "increment",
        }
    }

    /// Parse a named form field, coercing the value like a settings field.
    pub fn parse(name: &str, value: &Value) -> Result<Self, String> {
        match name {
            "increment" => coerce_i64(value)
                .map(InspectorField::Increment)
                .ok_or_else(|| format!("non-numeric increment: {value}")),
            other => Err(format!("unknown relay field: {other}")),
        }
    }

    /// Decode a relay payload map. Exactly one known field is expected.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let map = value
            .as_object()
            .ok_or_else(|| format!("relay payload is not an object: {value}"))?;
        let mut field = None;
        for (name, v) in map {
            field = Some(Self::parse(name, v)?);
        }
        field.ok_or_else(|| "empty relay payload".to_string())
    }

    pub fn to_value(self) -> Value {
        match self {
            InspectorField::Increment(n) => serde_json::json!({ "increment": n }),
        }
    }
}

/// Relay envelope used for `sendToPlugin` / `sendToPropertyInspector`.
#[derive(Debug, Serialize)]
pub struct RelayFrame<'a> {
    pub action: &'a str,
    pub event: &'a str,
    pub context: &'a str,
    pub payload: Value,
}
