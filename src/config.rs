//! Engine configuration loaded from environment variables.
//!
//! Every knob has a sensible default so the server starts with no
//! environment at all. Unparseable values fall back to the default with a
//! warning rather than aborting startup.

use crate::scoring::NormalizationPolicy;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server binds.
    pub port: u16,
    /// Sessions with no activity for this long are deleted by the sweeper.
    pub idle_ttl: Duration,
    /// How often the idle sweeper wakes up.
    pub sweep_interval: Duration,
    /// Players silent for this long are marked disconnected.
    pub presence_timeout: Duration,
    /// How free-text answers are canonicalized before comparison.
    pub normalization: NormalizationPolicy,
    /// Maximum length of a player name, in characters.
    pub max_name_chars: usize,
    /// Maximum length of a text submission, in characters.
    pub max_submission_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // 4263 spells GAME on a phone keypad
            port: 4263,
            idle_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            presence_timeout: Duration::from_secs(90),
            normalization: NormalizationPolicy::Strict,
            max_name_chars: 24,
            max_submission_chars: 500,
        }
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_parse("SHINDIG_PORT", defaults.port);
        let idle_ttl_secs = env_parse("SHINDIG_IDLE_TTL_SECS", defaults.idle_ttl.as_secs());
        let sweep_interval_secs = env_parse(
            "SHINDIG_SWEEP_INTERVAL_SECS",
            defaults.sweep_interval.as_secs(),
        );
        let presence_timeout_secs = env_parse(
            "SHINDIG_PRESENCE_TIMEOUT_SECS",
            defaults.presence_timeout.as_secs(),
        );
        let max_name_chars = env_parse("SHINDIG_MAX_NAME_CHARS", defaults.max_name_chars);
        let max_submission_chars = env_parse(
            "SHINDIG_MAX_SUBMISSION_CHARS",
            defaults.max_submission_chars,
        );

        let normalization = match std::env::var("SHINDIG_NORMALIZATION").ok().as_deref() {
            None | Some("strict") => NormalizationPolicy::Strict,
            Some("punctuation-insensitive") => NormalizationPolicy::PunctuationInsensitive,
            Some(other) => {
                tracing::warn!(
                    value = other,
                    "Unknown SHINDIG_NORMALIZATION, using strict matching"
                );
                NormalizationPolicy::Strict
            }
        };

        tracing::info!(
            port,
            idle_ttl_secs,
            sweep_interval_secs,
            presence_timeout_secs,
            ?normalization,
            "Engine config loaded"
        );

        Self {
            port,
            idle_ttl: Duration::from_secs(idle_ttl_secs),
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            presence_timeout: Duration::from_secs(presence_timeout_secs),
            normalization,
            max_name_chars,
            max_submission_chars,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(name, value = %raw, "Ignoring unparseable value");
                default
            }
        },
        Err(_) => default,
    }
}
