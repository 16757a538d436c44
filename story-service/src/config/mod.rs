use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default timeout for a single provider call. SDXL renders routinely take
/// tens of seconds, so this is generous.
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_STABILITY_BASE_URL: &str = "https://api.stability.ai";
const DEFAULT_STABILITY_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub stability: StabilitySettings,
    pub providers: ProviderSettings,
    /// Where the single-page frontend is served from during development.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StabilitySettings {
    /// Image generation is disabled entirely when unset.
    pub api_key: Option<String>,
    pub engine: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub timeout_secs: u64,
}

impl StoryConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = common_config.is_production();

        Ok(StoryConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: required_in_prod("GEMINI_API_KEY", is_prod)?,
                model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                base_url: env_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            },
            stability: StabilitySettings {
                api_key: optional_env("STABILITY_API_KEY"),
                engine: env_or("STABILITY_ENGINE", DEFAULT_STABILITY_ENGINE),
                base_url: env_or("STABILITY_BASE_URL", DEFAULT_STABILITY_BASE_URL),
            },
            providers: ProviderSettings {
                timeout_secs: timeout_secs(optional_env("PROVIDER_TIMEOUT_SECS"))?,
            },
            frontend_url: env_or("FRONTEND_URL", DEFAULT_FRONTEND_URL),
        })
    }

    pub fn gemini_configured(&self) -> bool {
        self.gemini.api_key.is_some()
    }

    pub fn stability_configured(&self) -> bool {
        self.stability.api_key.is_some()
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Provider timeout in whole seconds; must be a positive integer.
fn timeout_secs(raw: Option<String>) -> Result<u64, AppError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PROVIDER_TIMEOUT_SECS);
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "PROVIDER_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
            raw
        ))),
    }
}

/// Optional during development, mandatory in production.
fn required_in_prod(key: &str, is_prod: bool) -> Result<Option<String>, AppError> {
    match optional_env(key) {
        Some(val) => Ok(Some(val)),
        None if is_prod => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        ))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_unset() {
        std::env::set_var("STORY_CONFIG_TEST_BLANK", "   ");
        assert_eq!(optional_env("STORY_CONFIG_TEST_BLANK"), None);
        assert_eq!(env_or("STORY_CONFIG_TEST_BLANK", "fallback"), "fallback");
    }

    #[test]
    fn missing_key_is_fatal_only_in_production() {
        let key = "STORY_CONFIG_TEST_MISSING_KEY";
        std::env::remove_var(key);

        assert!(matches!(required_in_prod(key, false), Ok(None)));
        assert!(matches!(
            required_in_prod(key, true),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn timeout_defaults_when_unset() {
        assert_eq!(timeout_secs(None).unwrap(), DEFAULT_PROVIDER_TIMEOUT_SECS);
        assert_eq!(timeout_secs(Some(" 45 ".to_string())).unwrap(), 45);
    }

    #[test]
    fn invalid_timeout_is_a_config_error() {
        for raw in ["0", "soon", "-5", "1.5"] {
            assert!(
                matches!(
                    timeout_secs(Some(raw.to_string())),
                    Err(AppError::ConfigError(_))
                ),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn present_key_is_returned() {
        let key = "STORY_CONFIG_TEST_PRESENT_KEY";
        std::env::set_var(key, "secret");
        assert_eq!(required_in_prod(key, true).unwrap().as_deref(), Some("secret"));
    }
}
