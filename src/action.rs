//! The increment-counter action.
//!
//! Each handler is a pure function of the inbound event plus the settings the
//! host delivered with it: it returns the outbound commands for the dispatch
//! loop to send, with `setSettings` ordered before the redraw so the persisted
//! state never lags the display. The only local state is a per-context cache
//! of the last seen settings, which lets `sendToPlugin` read the current count
//! without a host round-trip.

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::protocol::{Command, Controller, InboundEvent, InspectorField};
use crate::settings::CounterSettings;

/// Host-resolved asset identifiers, opaque to the plugin.
const IMG_MARKETPLACE: &str = "imgs/plugin/marketplace";
const IMG_KEY: &str = "imgs/actions/counter/key";
const IMG_CATEGORY: &str = "imgs/plugin/category_icon";
/// Feedback layout for dial/touch displays.
const LAYOUT_VALUE: &str = "$A1";

/// Count shown when the touchscreen is tapped.
const TOUCH_TAP_COUNT: i64 = 100;

#[derive(Default)]
pub struct CounterAction {
    /// Last settings seen per action-instance context. The host serializes
    /// event delivery per instance, so no further coordination is needed.
    cache: DashMap<String, CounterSettings>,
}

impl CounterAction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch one inbound event to its handler.
    pub fn handle(&self, event: InboundEvent) -> Vec<Command> {
        match event {
            InboundEvent::WillAppear { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.on_will_appear(&context, payload.controller, settings)
            }
            InboundEvent::KeyDown { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.on_key_down(&context, settings)
            }
            InboundEvent::DialDown { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.on_dial_down(&context, settings)
            }
            InboundEvent::DialRotate { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.on_dial_rotate(&context, settings, payload.ticks)
            }
            InboundEvent::TouchTap { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.on_touch_tap(&context, settings)
            }
            InboundEvent::SendToPlugin { context, payload } => {
                self.on_send_to_plugin(&context, &payload)
            }
            InboundEvent::DidReceiveSettings { context, payload } => {
                let settings = self.load(&context, &payload.settings);
                self.persist(&context, settings)
            }
            InboundEvent::Unknown => Vec::new(),
        }
    }

    /// Load the event's settings with defaults and refresh the cache.
    fn load(&self, context: &str, blob: &Value) -> CounterSettings {
        let settings = CounterSettings::from_value(blob);
        self.cache.insert(context.to_string(), settings);
        settings
    }

    /// Update the cache and emit the `setSettings` command.
    fn persist(&self, context: &str, settings: CounterSettings) -> Vec<Command> {
        self.cache.insert(context.to_string(), settings);
        vec![Command::set_settings(context, settings)]
    }

    fn on_will_appear(
        &self,
        context: &str,
        controller: Controller,
        settings: CounterSettings,
    ) -> Vec<Command> {
        match controller {
            Controller::Keypad => vec![
                Command::set_image(context, IMG_MARKETPLACE),
                Command::set_title(context, settings.count.to_string()),
            ],
            // Dial and touch placements render through a feedback layout.
            Controller::Encoder | Controller::Other => vec![
                Command::set_feedback_layout(context, LAYOUT_VALUE),
                Command::set_feedback(context, None, TOUCH_TAP_COUNT, IMG_KEY),
            ],
        }
    }

    fn on_key_down(&self, context: &str, settings: CounterSettings) -> Vec<Command> {
        let next = CounterSettings {
            count: settings.count + settings.increment,
            increment: settings.increment,
        };
        info!(count = next.count, "key pressed");
        let mut cmds = self.persist(context, next);
        cmds.push(Command::set_title(context, next.count.to_string()));
        cmds
    }

    fn on_dial_down(&self, context: &str, settings: CounterSettings) -> Vec<Command> {
        let next = CounterSettings {
            count: 0,
            increment: settings.increment,
        };
        let mut cmds = self.persist(context, next);
        cmds.push(Command::set_feedback(context, Some("Dial pressed"), 0, IMG_KEY));
        cmds
    }

    fn on_dial_rotate(&self, context: &str, settings: CounterSettings, ticks: i64) -> Vec<Command> {
        let next = CounterSettings {
            count: settings.count + ticks * settings.increment,
            increment: settings.increment,
        };
        debug!(ticks, count = next.count, "dial rotated");
        let mut cmds = self.persist(context, next);
        let label = format!("Dial rotating {ticks}");
        cmds.push(Command::set_feedback(
            context,
            Some(label.as_str()),
            next.count,
            IMG_MARKETPLACE,
        ));
        cmds
    }

    fn on_touch_tap(&self, context: &str, settings: CounterSettings) -> Vec<Command> {
        let next = CounterSettings {
            count: TOUCH_TAP_COUNT,
            increment: settings.increment,
        };
        let mut cmds = self.persist(context, next);
        cmds.push(Command::set_feedback(
            context,
            Some("Touchscreen tapped"),
            TOUCH_TAP_COUNT,
            IMG_CATEGORY,
        ));
        cmds
    }

    /// A form field arrived from the property inspector. Only `increment` is
    /// known; the count stays at its current persisted value.
    fn on_send_to_plugin(&self, context: &str, payload: &Value) -> Vec<Command> {
        let field = match InspectorField::from_value(payload) {
            Ok(field) => field,
            Err(err) => {
                warn!(%err, "ignoring inspector payload");
                return Vec::new();
            }
        };
        let InspectorField::Increment(increment) = field;
        info!(increment, "increment received from property inspector");
        let count = self
            .cache
            .get(context)
            .map(|s| s.count)
            .unwrap_or_default();
        self.persist(context, CounterSettings { count, increment })
    }
}
