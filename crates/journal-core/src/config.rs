#![forbid(unsafe_code)]

//! Journal configuration.
//!
//! Configuration is loaded once at startup (JSON file, environment overlay,
//! or both) and is immutable for the life of the process. Every field has a
//! default so partial documents are valid.
//!
//! # Environment
//!
//! | variable                          | field                    |
//! |-----------------------------------|--------------------------|
//! | `JOURNAL_MAX_HISTORY`             | `max_history`            |
//! | `JOURNAL_MIN_RESEND_INTERVAL_MS`  | `min_resend_interval_ms` |
//! | `JOURNAL_PENDING_WINDOW_MS`       | `pending_window_ms`      |
//! | `JOURNAL_LONG_TOKEN_THRESHOLD`    | `long_token_threshold`   |
//! | `JOURNAL_LOCAL_IDENTITY`          | `local_identity`         |
//! | `JOURNAL_FILTER_SELF`             | `filter_self`            |
//! | `JOURNAL_CONTENT_DEDUP`           | `content_dedup`          |
//! | `JOURNAL_HIDE_CHANNELS`           | `channel_visibility` (comma list set to false) |

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const ENV_MAX_HISTORY: &str = "JOURNAL_MAX_HISTORY";
const ENV_MIN_RESEND_INTERVAL_MS: &str = "JOURNAL_MIN_RESEND_INTERVAL_MS";
const ENV_PENDING_WINDOW_MS: &str = "JOURNAL_PENDING_WINDOW_MS";
const ENV_LONG_TOKEN_THRESHOLD: &str = "JOURNAL_LONG_TOKEN_THRESHOLD";
const ENV_LOCAL_IDENTITY: &str = "JOURNAL_LOCAL_IDENTITY";
const ENV_FILTER_SELF: &str = "JOURNAL_FILTER_SELF";
const ENV_CONTENT_DEDUP: &str = "JOURNAL_CONTENT_DEDUP";
const ENV_HIDE_CHANNELS: &str = "JOURNAL_HIDE_CHANNELS";

/// On-screen ordering of windowed records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Newest record at the top.
    NewestFirst,
    /// Newest record at the bottom (chat-log style).
    #[default]
    OldestFirst,
}

/// Flat configuration for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Hard cap on retained history records.
    pub max_history: usize,
    /// Minimum interval before an unchanged window is sent again.
    pub min_resend_interval_ms: u64,
    /// How long a coalescing window waits for its counterpart line.
    pub pending_window_ms: u64,
    /// Alphanumeric tokens longer than this are treated as key-mash spam.
    pub long_token_threshold: usize,
    /// Base delay between ticks.
    pub tick_interval_ms: u64,
    /// Upper bound of the random delay added to each tick.
    pub tick_jitter_ms: u64,

    /// Name of the local player, used by the self-authored filter.
    pub local_identity: Option<String>,
    pub filter_self: bool,
    /// Always-enforced exact speaker deny list.
    pub deny_speakers: Vec<String>,
    pub deny_non_player_sources: bool,
    pub non_player_speakers: Vec<String>,
    pub deny_noisy_sources: bool,
    pub noisy_speakers: Vec<String>,

    pub drop_numeric_only: bool,
    pub drop_long_tokens: bool,
    pub drop_letterless: bool,

    /// Case-insensitive phrase deny lists.
    pub deny_exact: Vec<String>,
    pub deny_substrings: Vec<String>,
    pub deny_prefixes: Vec<String>,
    /// Drop `*decorated*` status lines and bare `{tag}` markers.
    pub deny_decorative: bool,
    /// Drop `keyword 5,000`-shaped command echoes.
    pub deny_numeric_commands: bool,
    pub numeric_command_keywords: Vec<String>,

    /// Enable normalized-text dedup (quests are always exempt).
    pub content_dedup: bool,

    /// Per-channel visibility, keyed lowercase.
    pub channel_visibility: BTreeMap<String, bool>,
    /// Visibility for channels missing from `channel_visibility`.
    pub default_channel_visible: bool,
    /// Per-category visibility, keyed by event or entry category key.
    pub category_visibility: BTreeMap<String, bool>,

    pub span_cache_capacity: usize,
    pub display_order: DisplayOrder,
    pub show_timestamps: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_history: 200,
            min_resend_interval_ms: 1000,
            pending_window_ms: 3000,
            long_token_threshold: 20,
            tick_interval_ms: 250,
            tick_jitter_ms: 50,
            local_identity: None,
            filter_self: false,
            deny_speakers: Vec::new(),
            deny_non_player_sources: false,
            non_player_speakers: vec![
                "Town Crier".to_string(),
                "Banker".to_string(),
                "Guard".to_string(),
                "Healer".to_string(),
            ],
            deny_noisy_sources: false,
            noisy_speakers: Vec::new(),
            drop_numeric_only: true,
            drop_long_tokens: true,
            drop_letterless: true,
            deny_exact: Vec::new(),
            deny_substrings: Vec::new(),
            deny_prefixes: Vec::new(),
            deny_decorative: true,
            deny_numeric_commands: true,
            numeric_command_keywords: vec![
                "withdraw".to_string(),
                "deposit".to_string(),
                "check".to_string(),
            ],
            content_dedup: true,
            channel_visibility: BTreeMap::new(),
            default_channel_visible: true,
            category_visibility: BTreeMap::new(),
            span_cache_capacity: 2048,
            display_order: DisplayOrder::default(),
            show_timestamps: false,
        }
    }
}

/// A single invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}={value} ({message})")]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

/// Failure to load a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration together with environment parse diagnostics.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: JournalConfig,
    pub errors: Vec<ConfigError>,
}

impl JournalConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(ConfigLoadError::Invalid)?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Defaults overlaid with the `JOURNAL_*` environment variables listed
    /// in the module docs. Other fields are file-only.
    #[must_use]
    pub fn from_env() -> ConfigParse {
        Self::default().overlay_env_with(|key| env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup (the environment in production).
    ///
    /// Invalid values are reported and leave the field unchanged.
    #[must_use]
    pub fn overlay_env_with<F>(mut self, mut get: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut errors = Vec::new();

        overlay_number(&mut get, ENV_MAX_HISTORY, "max_history", &mut self.max_history, &mut errors);
        overlay_number(
            &mut get,
            ENV_MIN_RESEND_INTERVAL_MS,
            "min_resend_interval_ms",
            &mut self.min_resend_interval_ms,
            &mut errors,
        );
        overlay_number(
            &mut get,
            ENV_PENDING_WINDOW_MS,
            "pending_window_ms",
            &mut self.pending_window_ms,
            &mut errors,
        );
        overlay_number(
            &mut get,
            ENV_LONG_TOKEN_THRESHOLD,
            "long_token_threshold",
            &mut self.long_token_threshold,
            &mut errors,
        );

        if let Some(value) = get(ENV_LOCAL_IDENTITY) {
            let value = value.trim();
            self.local_identity = (!value.is_empty()).then(|| value.to_string());
        }

        overlay_bool(&mut get, ENV_FILTER_SELF, "filter_self", &mut self.filter_self, &mut errors);
        overlay_bool(
            &mut get,
            ENV_CONTENT_DEDUP,
            "content_dedup",
            &mut self.content_dedup,
            &mut errors,
        );

        if let Some(value) = get(ENV_HIDE_CHANNELS) {
            for channel in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                self.channel_visibility
                    .insert(channel.to_ascii_lowercase(), false);
            }
        }

        ConfigParse {
            config: self,
            errors,
        }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_positive("max_history", self.max_history as u64, &mut errors);
        validate_positive("pending_window_ms", self.pending_window_ms, &mut errors);
        validate_positive(
            "long_token_threshold",
            self.long_token_threshold as u64,
            &mut errors,
        );
        validate_positive(
            "span_cache_capacity",
            self.span_cache_capacity as u64,
            &mut errors,
        );
        if self.filter_self && self.local_identity.is_none() {
            errors.push(ConfigError::new(
                "filter_self",
                "true",
                "filter_self requires local_identity",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    #[must_use]
    pub fn pending_window(&self) -> Duration {
        Duration::from_millis(self.pending_window_ms)
    }

    #[must_use]
    pub fn min_resend_interval(&self) -> Duration {
        Duration::from_millis(self.min_resend_interval_ms)
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Whether a chat channel is shown (case-insensitive).
    #[must_use]
    pub fn is_channel_visible(&self, channel: &str) -> bool {
        self.channel_visibility
            .get(&channel.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or(self.default_channel_visible)
    }

    /// Whether a category is shown. `other` is hidden unless enabled explicitly;
    /// every other category is shown unless disabled.
    #[must_use]
    pub fn is_category_visible(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.category_visibility
            .get(&key)
            .copied()
            .unwrap_or(key != "other")
    }

    /// Short human-readable summary for startup logs.
    #[must_use]
    pub fn summary_short(&self) -> String {
        format!(
            "history={} resend={}ms window={}ms dedup={} order={:?}",
            self.max_history,
            self.min_resend_interval_ms,
            self.pending_window_ms,
            if self.content_dedup { "on" } else { "off" },
            self.display_order
        )
    }
}

impl fmt::Display for JournalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary_short())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn overlay_bool<F>(
    get: &mut F,
    key: &str,
    field: &'static str,
    slot: &mut bool,
    errors: &mut Vec<ConfigError>,
) where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(value) = get(key) {
        match parse_bool(&value) {
            Some(parsed) => *slot = parsed,
            None => errors.push(ConfigError::new(
                field,
                value,
                "expected bool (1/0/true/false)",
            )),
        }
    }
}

fn overlay_number<F, T>(
    get: &mut F,
    key: &str,
    field: &'static str,
    slot: &mut T,
    errors: &mut Vec<ConfigError>,
) where
    F: FnMut(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(value) = get(key) {
        match value.trim().parse::<T>() {
            Ok(parsed) => *slot = parsed,
            Err(_) => errors.push(ConfigError::new(field, value, "expected unsigned integer")),
        }
    }
}

fn validate_positive(field: &'static str, value: u64, errors: &mut Vec<ConfigError>) {
    if value == 0 {
        errors.push(ConfigError::new(field, "0", "must be greater than zero"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = JournalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_history, 200);
        assert_eq!(config.long_token_threshold, 20);
        assert_eq!(config.pending_window(), Duration::from_secs(3));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config =
            JournalConfig::from_json_str(r#"{"max_history": 50, "channel_visibility": {"trade": false}}"#)
                .unwrap();
        assert_eq!(config.max_history, 50);
        assert_eq!(config.min_resend_interval_ms, 1000);
        assert!(!config.is_channel_visible("Trade"));
        assert!(config.is_channel_visible("General"));
    }

    #[test]
    fn invalid_json_values_are_all_reported() {
        let err = JournalConfig::from_json_str(r#"{"max_history": 0, "pending_window_ms": 0}"#)
            .unwrap_err();
        match err {
            ConfigLoadError::Invalid(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "max_history");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = JournalConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Json(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.json");
        std::fs::write(&path, r#"{"show_timestamps": true}"#).unwrap();
        let config = JournalConfig::from_json_path(&path).unwrap();
        assert!(config.show_timestamps);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JournalConfig::from_json_path("/nonexistent/journal.json").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
    }

    #[test]
    fn env_overlay_applies_values() {
        let parse = JournalConfig::default().overlay_env_with(lookup(&[
            ("JOURNAL_MAX_HISTORY", "75"),
            ("JOURNAL_FILTER_SELF", "yes"),
            ("JOURNAL_LOCAL_IDENTITY", " Alice "),
            ("JOURNAL_PENDING_WINDOW_MS", "1500"),
            ("JOURNAL_SHOW_TIMESTAMPS", "yes"),
            ("JOURNAL_HIDE_CHANNELS", "Trade, PvP"),
        ]));
        assert!(parse.errors.is_empty());
        let config = parse.config;
        assert_eq!(config.max_history, 75);
        assert!(config.filter_self);
        assert_eq!(config.local_identity.as_deref(), Some("Alice"));
        assert_eq!(config.pending_window(), Duration::from_millis(1500));
        assert!(!config.show_timestamps, "file-only fields ignore the environment");
        assert!(!config.is_channel_visible("trade"));
        assert!(!config.is_channel_visible("pvp"));
    }

    #[test]
    fn env_overlay_reports_bad_values() {
        let parse = JournalConfig::default().overlay_env_with(lookup(&[
            ("JOURNAL_MAX_HISTORY", "lots"),
            ("JOURNAL_CONTENT_DEDUP", "maybe"),
        ]));
        assert_eq!(parse.errors.len(), 2);
        assert_eq!(parse.config.max_history, 200);
        assert!(parse.config.content_dedup);
    }

    #[test]
    fn filter_self_requires_identity() {
        let config = JournalConfig {
            filter_self: true,
            ..JournalConfig::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors[0].field, "filter_self");
    }

    #[test]
    fn other_category_hidden_by_default() {
        let mut config = JournalConfig::default();
        assert!(!config.is_category_visible("other"));
        assert!(config.is_category_visible("quest"));
        config.category_visibility.insert("other".into(), true);
        assert!(config.is_category_visible("Other"));
    }
}
