mod env;
pub use env::apply_env_overrides;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::Deserialize;

/// Complete sightline configuration. Fixed at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SightlineConfig {
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub answer_service: AnswerServiceConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Timing and key bindings for the on-screen interaction
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionConfig {
    /// How long a detection message stays on screen (seconds)
    #[serde(default = "default_message_ttl")]
    pub message_ttl_seconds: f64,
    /// How long a resolved answer stays on screen (seconds)
    #[serde(default = "default_answer_display_ttl")]
    pub answer_display_ttl_seconds: f64,
    /// Class label that unlocks text entry
    #[serde(default = "default_person_label")]
    pub person_label: String,
    #[serde(default = "default_start_input_key")]
    pub start_input_key: char,
    #[serde(default = "default_quit_key")]
    pub quit_key: char,
}

fn default_message_ttl() -> f64 {
    3.0
}

fn default_answer_display_ttl() -> f64 {
    5.0
}

fn default_person_label() -> String {
    "person".to_string()
}

fn default_start_input_key() -> char {
    'i'
}

fn default_quit_key() -> char {
    'q'
}

impl InteractionConfig {
    pub fn message_ttl(&self) -> Duration {
        seconds(self.message_ttl_seconds)
    }

    pub fn answer_display_ttl(&self) -> Duration {
        seconds(self.answer_display_ttl_seconds)
    }

    /// Both TTLs must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("message_ttl_seconds", self.message_ttl_seconds),
            ("answer_display_ttl_seconds", self.answer_display_ttl_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("interaction.{} must be a finite number >= 0, got {}", name, value);
            }
        }
        Ok(())
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            message_ttl_seconds: default_message_ttl(),
            answer_display_ttl_seconds: default_answer_display_ttl(),
            person_label: default_person_label(),
            start_input_key: default_start_input_key(),
            quit_key: default_quit_key(),
        }
    }
}

/// Question-answering service endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerServiceConfig {
    #[serde(default = "default_answer_url")]
    pub url: String,
    /// HTTP client timeout. Unset means the request runs until the service
    /// or the transport gives up.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Text shown in place of an answer when the service fails
    #[serde(default = "default_error_text")]
    pub error_text: String,
}

fn default_answer_url() -> String {
    "http://localhost:8000/faq/".to_string()
}

fn default_error_text() -> String {
    "FAQ service error.".to_string()
}

impl Default for AnswerServiceConfig {
    fn default() -> Self {
        Self {
            url: default_answer_url(),
            timeout_seconds: None,
            error_text: default_error_text(),
        }
    }
}

/// Automatic per-label queries issued for newly detected objects
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// `{label}` is replaced with the detected class label
    #[serde(default = "default_query_template")]
    pub query_template: String,
    /// Token-bucket limit on automatic queries. Unset means unlimited.
    #[serde(default)]
    pub max_queries_per_minute: Option<u32>,
}

fn default_query_template() -> String {
    "What can you tell me about {label}?".to_string()
}

impl SynthesisConfig {
    pub fn query_for(&self, label: &str) -> String {
        self.query_template.replace("{label}", label)
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            query_template: default_query_template(),
            max_queries_per_minute: None,
        }
    }
}

/// Scripted capture used by the `sightline` binary
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// Simulated capture latency between frames
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Optional `coco.names`-style label file (one class name per line)
    #[serde(default)]
    pub labels_path: Option<String>,
}

fn default_frame_interval() -> u64 {
    33
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval(),
            labels_path: None,
        }
    }
}

impl Default for SightlineConfig {
    fn default() -> Self {
        Self {
            interaction: InteractionConfig::default(),
            answer_service: AnswerServiceConfig::default(),
            synthesis: SynthesisConfig::default(),
            replay: ReplayConfig::default(),
        }
    }
}

/// Negative and NaN collapse to zero; `as` saturates at the top end.
fn seconds(value: f64) -> Duration {
    Duration::milliseconds((value.max(0.0) * 1000.0).round() as i64)
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<SightlineConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path))?;
    let config: SightlineConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file '{}'", path))?;
    config
        .interaction
        .validate()
        .with_context(|| format!("Invalid config file '{}'", path))?;
    Ok(config)
}
