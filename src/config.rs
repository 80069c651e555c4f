//! Engine configuration.
//!
//! Defaults applied to auctions whose creation parameters leave a knob
//! unset. Loaded through a layered builder, later sources overriding
//! earlier ones:
//!
//! 1. Compile-time defaults ([`EngineConfig::default`])
//! 2. An optional `auction.{toml,yaml,json}` file (or an explicit path)
//! 3. Environment variables in the `AUCTION` namespace, e.g.
//!    `AUCTION__SOFT_CLOSE_WINDOW_SECS=180`
//!
//! The loaded value is plain data: pass it to
//! [`crate::engine::AuctionEngine::new`]. There is no process-wide
//! configuration singleton.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::auction::MinIncrementStrategy;
use crate::error::EngineError;

/// Auction defaults and engine tuning.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// Strategy for auctions created without an explicit one.
    pub min_increment: MinIncrementStrategy,
    /// Default soft-close window, seconds before the end time.
    pub soft_close_window_secs: u64,
    /// Default extension pushed out from the accepting instant, seconds.
    pub soft_close_extension_secs: u64,
    /// Capacity of the event broadcast channel.
    pub event_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_increment: MinIncrementStrategy::Percent(50), // 0.5%
            soft_close_window_secs: 120,
            soft_close_extension_secs: 120,
            event_buffer: 1024,
        }
    }
}

/// Load configuration from the layered sources described in the module docs.
///
/// `config_path` forces a specific file and fails if it is missing; `None`
/// falls back to `auction.{toml,yaml,json}` in the working directory, each
/// optional.
///
/// # Errors
/// Returns [`EngineError::Configuration`] when a source cannot be read or a
/// value does not deserialize into [`EngineConfig`].
pub fn load_configuration(config_path: Option<&Path>) -> Result<EngineConfig, EngineError> {
    let defaults = EngineConfig::default();
    let (default_kind, default_value) = match defaults.min_increment {
        MinIncrementStrategy::Percent(bps) => ("percent", i64::from(bps)),
        MinIncrementStrategy::Fixed(step) => ("fixed", step as i64),
    };

    let mut builder = Config::builder()
        .set_default("min_increment.kind", default_kind)
        .map_err(configuration)?
        .set_default("min_increment.value", default_value)
        .map_err(configuration)?
        .set_default("soft_close_window_secs", defaults.soft_close_window_secs as i64)
        .map_err(configuration)?
        .set_default(
            "soft_close_extension_secs",
            defaults.soft_close_extension_secs as i64,
        )
        .map_err(configuration)?
        .set_default("event_buffer", defaults.event_buffer as i64)
        .map_err(configuration)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        builder = builder.add_source(File::with_name("auction").required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("AUCTION")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(configuration)?
        .try_deserialize::<EngineConfig>()
        .map_err(configuration)
}

fn configuration(err: config::ConfigError) -> EngineError {
    EngineError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_sources() {
        let cfg = load_configuration(None).expect("defaults should load");
        assert_eq!(cfg.min_increment, MinIncrementStrategy::Percent(50));
        assert_eq!(cfg.soft_close_window_secs, 120);
        assert_eq!(cfg.soft_close_extension_secs, 120);
        assert_eq!(cfg.event_buffer, 1024);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = Path::new("definitely-not-here.toml");
        assert!(matches!(
            load_configuration(Some(missing)),
            Err(EngineError::Configuration(_))
        ));
    }
}
