//! Tracing subscriber setup for binaries and integration hosts.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CommunityConfig;

/// Install a global subscriber. `RUST_LOG` overrides `level` when set.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(level: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("community={level},reputation={level},warn").into());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .is_ok()
}

/// [`init_tracing`] from the `general` config section.
pub fn init_from_config(config: &CommunityConfig) -> bool {
    let general = &config.reputation.general;
    init_tracing(&general.log_level, general.json_logs)
}
