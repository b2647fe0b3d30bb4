//! Launch arguments supplied by the host.
//!
//! The host starts both the plugin and the property-inspector bridge with
//! single-dash long flags (`-port 28196 -pluginUUID ... -registerEvent ...`),
//! a convention clap doesn't accept directly, so known flags are normalized to
//! double-dash form before parsing.

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(about = "Counter demo plugin for a control-surface host")]
pub struct LaunchArgs {
    /// Loopback WebSocket port owned by the host.
    #[arg(long)]
    pub port: u16,

    /// Instance UUID to register under.
    #[arg(long = "pluginUUID")]
    pub uuid: String,

    /// Event name for the registration frame.
    #[arg(long = "registerEvent")]
    pub register_event: String,

    /// JSON blob describing the host environment. Unused by the counter, but
    /// always passed by the host.
    #[arg(long, default_value = "{}")]
    pub info: String,

    /// JSON blob binding an inspector to its action instance. Only passed to
    /// the bridge process.
    #[arg(long = "actionInfo")]
    pub action_info: Option<String>,
}

/// Flags the host passes with a single dash.
const HOST_FLAGS: [&str; 5] = ["port", "pluginUUID", "registerEvent", "info", "actionInfo"];

impl LaunchArgs {
    /// Parse the host's argv, accepting both `-port` and `--port` spellings.
    pub fn from_host_argv<I>(argv: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::parse_from(normalize(argv))
    }
}

fn normalize<I>(argv: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    argv.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(name) if !name.starts_with('-') && HOST_FLAGS.contains(&name) => {
                format!("--{name}")
            }
            _ => arg,
        })
        .collect()
}
