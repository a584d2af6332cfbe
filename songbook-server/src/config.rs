//! Credential resolution for the songbook server
//!
//! Gemini API key priority: `SONGBOOK_GEMINI_API_KEY` → `GEMINI_API_KEY` → TOML.

use songbook_common::config::SongbookConfig;
use std::fmt;
use tracing::{info, warn};

/// Service-specific key variable
pub const GEMINI_KEY_ENV_VAR: &str = "SONGBOOK_GEMINI_API_KEY";

/// Generic key variable shared with other Gemini tooling
pub const GEMINI_KEY_FALLBACK_ENV_VAR: &str = "GEMINI_API_KEY";

/// Where the Gemini key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    ServiceEnv,
    GenericEnv,
    Toml,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::ServiceEnv => write!(f, "{}", GEMINI_KEY_ENV_VAR),
            KeySource::GenericEnv => write!(f, "{}", GEMINI_KEY_FALLBACK_ENV_VAR),
            KeySource::Toml => f.write_str("TOML config"),
        }
    }
}

/// Resolve the Gemini API key
///
/// Returns `None` when no source carries a usable key; generation then
/// degrades to its "not configured" message.
pub fn resolve_gemini_api_key(config: &SongbookConfig) -> Option<String> {
    let candidates = [
        (KeySource::ServiceEnv, std::env::var(GEMINI_KEY_ENV_VAR).ok()),
        (KeySource::GenericEnv, std::env::var(GEMINI_KEY_FALLBACK_ENV_VAR).ok()),
        (KeySource::Toml, config.gemini.api_key.clone()),
    ];

    let valid: Vec<(KeySource, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    if valid.len() > 1 {
        let names: Vec<String> = valid.iter().map(|(s, _)| s.to_string()).collect();
        warn!(
            "Gemini API key found in multiple sources: {}. Using {} (highest priority).",
            names.join(", "),
            valid[0].0
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("Gemini API key loaded from {}", source);
            Some(key.trim().to_string())
        }
        None => {
            warn!(
                "Gemini API key not configured; set {} or [gemini] api_key in the config file",
                GEMINI_KEY_ENV_VAR
            );
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
