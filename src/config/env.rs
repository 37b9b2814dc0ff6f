use super::SightlineConfig;
use tracing::warn;

/// Override file/default values from env vars. Unparseable values are logged and ignored.
pub fn apply_env_overrides(config: &mut SightlineConfig) {
    if let Ok(v) = std::env::var("SIGHTLINE_ANSWER_URL") {
        if !v.is_empty() {
            config.answer_service.url = v;
        }
    }
    if let Some(secs) = seconds_var("SIGHTLINE_MESSAGE_TTL_SECONDS") {
        config.interaction.message_ttl_seconds = secs;
    }
    if let Some(secs) = seconds_var("SIGHTLINE_ANSWER_TTL_SECONDS") {
        config.interaction.answer_display_ttl_seconds = secs;
    }
}

fn seconds_var(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Some(secs),
        _ => {
            warn!(var = name, value = %raw, "Ignoring invalid duration override");
            None
        }
    }
}
