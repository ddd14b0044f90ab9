use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "vidgen.toml";
pub const DEFAULT_BACKEND_URL: &str = "https://ai-video-generator-wrfb.onrender.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend_url: String,
    pub progress_log_interval_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            progress_log_interval_secs: 15,
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the flat TOML file at `path`, then environment overrides.
/// Unreadable files and unparsable values are skipped.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("backend_url").and_then(toml::Value::as_str) {
                    settings.backend_url = v.to_string();
                }
                if let Some(v) = file_cfg
                    .get("progress_log_interval_secs")
                    .and_then(toml_as_u64)
                {
                    settings.progress_log_interval_secs = v;
                }
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring malformed settings file");
            }
        }
    }

    if let Some(v) = env("VIDGEN_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = env("APP__PROGRESS_LOG_INTERVAL_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.progress_log_interval_secs = parsed;
        }
    }

    settings
}

fn toml_as_u64(value: &toml::Value) -> Option<u64> {
    match value {
        toml::Value::Integer(n) => u64::try_from(*n).ok(),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalizes a configured backend base URL: empty falls back to the
/// default, a missing scheme becomes `https://`, trailing slashes go.
pub fn prepare_backend_url(raw_backend_url: &str) -> anyhow::Result<String> {
    let normalized = normalize_backend_url(raw_backend_url);
    let parsed = Url::parse(&normalized)
        .with_context(|| format!("invalid backend url '{raw_backend_url}'"))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "backend url '{raw_backend_url}' must use http or https, got '{}'",
            parsed.scheme()
        ));
    }
    if parsed.host_str().is_none() {
        return Err(anyhow!("backend url '{raw_backend_url}' has no host"));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

fn normalize_backend_url(raw_backend_url: &str) -> String {
    let raw_backend_url = raw_backend_url.trim();

    if raw_backend_url.is_empty() {
        return ClientSettings::default().backend_url;
    }

    let with_scheme = if raw_backend_url.contains("://") {
        raw_backend_url.to_string()
    } else {
        format!("https://{raw_backend_url}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
