//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the bus connection, recognition setup, dialogue tuning and logging.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::strings::{logs, messages};

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub dialogflow: DialogflowConfig,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_language_timeout")]
    pub language_timeout_secs: u64,
    #[serde(default)]
    pub dialogue: DialogueConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads and parses a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| logs::config_read_fail(&path.display().to_string()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context(logs::CONFIG_PARSE_ERROR)
    }

    pub fn language_timeout(&self) -> Duration {
        Duration::from_secs(self.language_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusBackend {
    #[default]
    Redis,
    Memory,
}

/// Connection settings for the publish-subscribe bus.
#[derive(Debug, Deserialize, Clone)]
pub struct BusConfig {
    #[serde(default)]
    pub backend: BusBackend,
    #[serde(default = "default_bus_url")]
    pub url: String,
    /// Sleep between empty polls of the dispatch loop.
    #[serde(default = "default_idle_wait")]
    pub idle_wait_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: BusBackend::default(),
            url: default_bus_url(),
            idle_wait_ms: default_idle_wait(),
        }
    }
}

impl BusConfig {
    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms.max(1))
    }
}

/// Recognition backend setup. Both values are optional; an unset value is not published.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct DialogflowConfig {
    #[serde(default)]
    pub key_file: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
}

/// Tuning of the question/answer turns.
#[derive(Debug, Deserialize, Clone)]
pub struct DialogueConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_turn_timeout")]
    pub timeout_secs: u64,
    /// How many times an application may restart a failed conversation.
    #[serde(default = "default_restarts")]
    pub restarts: u32,
    #[serde(default = "default_repeat_prompt")]
    pub repeat_prompt: String,
    #[serde(default = "default_apology")]
    pub apology: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            timeout_secs: default_turn_timeout(),
            restarts: default_restarts(),
            repeat_prompt: default_repeat_prompt(),
            apology: default_apology(),
        }
    }
}

impl DialogueConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_language() -> String {
    "en-US".to_string()
}
fn default_language_timeout() -> u64 {
    10
}
fn default_bus_url() -> String {
    "redis://127.0.0.1/".to_string()
}
fn default_idle_wait() -> u64 {
    1
}
fn default_attempts() -> u32 {
    3
}
fn default_turn_timeout() -> u64 {
    5
}
fn default_restarts() -> u32 {
    2
}
fn default_repeat_prompt() -> String {
    messages::REPEAT_PROMPT.to_string()
}
fn default_apology() -> String {
    messages::APOLOGY.to_string()
}
fn default_log_dir() -> String {
    "data".to_string()
}
fn default_log_file() -> String {
    "session.log".to_string()
}
fn default_log_filter() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("{}").unwrap();
        assert_eq!(config.bus.backend, BusBackend::Redis);
        assert_eq!(config.bus.url, "redis://127.0.0.1/");
        assert_eq!(config.bus.idle_wait(), Duration::from_millis(1));
        assert_eq!(config.language, "en-US");
        assert_eq!(config.dialogue.attempts, 3);
        assert_eq!(config.dialogue.timeout(), Duration::from_secs(5));
        assert_eq!(config.dialogue.repeat_prompt, messages::REPEAT_PROMPT);
        assert_eq!(config.logging.file, "session.log");
        assert!(config.dialogflow.agent.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let yaml = "\
bus:
  backend: memory
  idle_wait_ms: 0
language: nl-NL
dialogflow:
  agent: study-buddy
dialogue:
  attempts: 5
  timeout_secs: 2";
        writeln!(file, "{yaml}").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.bus.backend, BusBackend::Memory);
        // Zero would busy-spin; clamped to 1ms.
        assert_eq!(config.bus.idle_wait(), Duration::from_millis(1));
        assert_eq!(config.language, "nl-NL");
        assert_eq!(config.dialogflow.agent.as_deref(), Some("study-buddy"));
        assert_eq!(config.dialogue.attempts, 5);
        assert_eq!(config.dialogue.restarts, 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(dir.path().join("nope.yaml"));
        assert!(result.is_err());
    }
}
