//! Configuration types.
//!
//! Everything is read from the environment once, at process entry, and
//! passed down explicitly. Collaborator sections are loaded only by the
//! subcommands that need them, so `seed` runs without any credentials.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::channels::{asana, calendar};
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Environment lookup, injectable for tests.
pub trait Env {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

fn optional(env: &dyn Env, key: &str, default: &str) -> String {
    env.get(key).unwrap_or_else(|| default.to_string())
}

fn required(env: &dyn Env, key: &str) -> Result<String, ConfigError> {
    env.get(key)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parsed<T: std::str::FromStr>(env: &dyn Env, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env.get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Settings that shape the pipeline itself.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Role whose new joiners are onboarded and whose seniors mentor them.
    pub target_role: String,
    pub window_days: u32,
    /// IANA timezone for meeting times.
    pub timezone: String,
    pub meeting_location: String,
    /// Contact used in the welcome email when an employee has no manager.
    pub fallback_manager: String,
    pub company: String,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            target_role: "Data Engineer".to_string(),
            window_days: 14,
            timezone: "Asia/Kolkata".to_string(),
            meeting_location: "Google Meet".to_string(),
            fallback_manager: "hr@company.com".to_string(),
            company: "VachhaniAI Labs".to_string(),
        }
    }
}

impl OnboardingConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let timezone = optional(env, "ONBOARDIA_TIMEZONE", &defaults.timezone);
        if let Err(e) = timezone.parse::<chrono_tz::Tz>() {
            return Err(ConfigError::InvalidValue {
                key: "ONBOARDIA_TIMEZONE".to_string(),
                message: e.to_string(),
            });
        }
        Ok(Self {
            target_role: optional(env, "ONBOARDIA_TARGET_ROLE", &defaults.target_role),
            window_days: parsed(env, "ONBOARDIA_WINDOW_DAYS", defaults.window_days)?,
            timezone,
            meeting_location: optional(env, "ONBOARDIA_MEETING_LOCATION", &defaults.meeting_location),
            fallback_manager: optional(env, "ONBOARDIA_FALLBACK_MANAGER", &defaults.fallback_manager),
            company: optional(env, "ONBOARDIA_COMPANY", &defaults.company),
        })
    }
}

/// Credential-free settings every subcommand needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub onboarding: OnboardingConfig,
}

impl AppConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            db_path: PathBuf::from(optional(env, "ONBOARDIA_DB_PATH", "./data/employees.db")),
            port: parsed(env, "ONBOARDIA_PORT", 8080)?,
            onboarding: OnboardingConfig::from_env(env)?,
        })
    }
}

/// SMTP relay credentials and the sender address.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub sender: String,
}

impl SmtpConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        let username = required(env, "SMTP_USERNAME")?;
        Ok(Self {
            host: optional(env, "SMTP_HOST", "smtp.gmail.com"),
            port: parsed(env, "SMTP_PORT", 587)?,
            sender: env.get("ONBOARDIA_SENDER").unwrap_or_else(|| username.clone()),
            password: SecretString::from(required(env, "SMTP_PASSWORD")?),
            username,
        })
    }
}

/// Task tracker access and where onboarding tasks are filed.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub base_url: String,
    pub token: SecretString,
    pub workspace_gid: String,
    pub project_gid: String,
}

impl TrackerConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: optional(env, "ASANA_BASE_URL", asana::DEFAULT_BASE_URL),
            token: SecretString::from(required(env, "ASANA_PAT")?),
            workspace_gid: required(env, "ASANA_WORKSPACE_GID")?,
            project_gid: required(env, "ASANA_PROJECT_GID")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub base_url: String,
    pub calendar_id: String,
    /// OAuth access token, already refreshed by whoever supplies it.
    pub token: SecretString,
}

impl CalendarConfig {
    pub fn from_env(env: &dyn Env) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: optional(env, "GOOGLE_CALENDAR_BASE_URL", calendar::DEFAULT_BASE_URL),
            calendar_id: optional(env, "GOOGLE_CALENDAR_ID", "primary"),
            token: SecretString::from(required(env, "GOOGLE_CALENDAR_TOKEN")?),
        })
    }
}

/// LLM backend, key and model from the environment.
pub fn llm_config_from_env(env: &dyn Env) -> Result<LlmConfig, ConfigError> {
    let backend: LlmBackend = match env.get("ONBOARDIA_LLM_BACKEND") {
        Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
            key: "ONBOARDIA_LLM_BACKEND".to_string(),
            message,
        })?,
        None => LlmBackend::Anthropic,
    };

    let (key_var, default_model) = match backend {
        LlmBackend::Anthropic => ("ANTHROPIC_API_KEY", "claude-sonnet-4-20250514"),
        LlmBackend::OpenAi => ("OPENAI_API_KEY", "gpt-4o"),
    };

    Ok(LlmConfig {
        backend,
        api_key: SecretString::from(required(env, key_var)?),
        model: optional(env, "ONBOARDIA_MODEL", default_model),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl MapEnv {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self(pairs.iter().copied().collect())
        }
    }

    impl Env for MapEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::from_env(&MapEnv::new(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("./data/employees.db"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.onboarding.target_role, "Data Engineer");
        assert_eq!(config.onboarding.window_days, 14);
        assert_eq!(config.onboarding.timezone, "Asia/Kolkata");
        assert_eq!(config.onboarding.fallback_manager, "hr@company.com");
    }

    #[test]
    fn overrides_are_applied() {
        let env = MapEnv::new(&[
            ("ONBOARDIA_WINDOW_DAYS", "30"),
            ("ONBOARDIA_TARGET_ROLE", "ML Engineer"),
            ("ONBOARDIA_PORT", "9000"),
        ]);
        let config = AppConfig::from_env(&env).unwrap();
        assert_eq!(config.onboarding.window_days, 30);
        assert_eq!(config.onboarding.target_role, "ML Engineer");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn invalid_number_names_the_key() {
        let env = MapEnv::new(&[("ONBOARDIA_WINDOW_DAYS", "two weeks")]);
        let err = AppConfig::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ONBOARDIA_WINDOW_DAYS"));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let env = MapEnv::new(&[("ONBOARDIA_TIMEZONE", "Mars/Olympus_Mons")]);
        let err = AppConfig::from_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ONBOARDIA_TIMEZONE"));

        let env = MapEnv::new(&[("ONBOARDIA_TIMEZONE", "Europe/Berlin")]);
        let config = AppConfig::from_env(&env).unwrap();
        assert_eq!(config.onboarding.timezone, "Europe/Berlin");
    }

    #[test]
    fn smtp_requires_credentials_and_defaults_sender() {
        let err = SmtpConfig::from_env(&MapEnv::new(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SMTP_USERNAME"));

        let env = MapEnv::new(&[("SMTP_USERNAME", "hr@example.com"), ("SMTP_PASSWORD", "pw")]);
        let smtp = SmtpConfig::from_env(&env).unwrap();
        assert_eq!(smtp.sender, "hr@example.com");
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.password.expose_secret(), "pw");
    }

    #[test]
    fn tracker_and_calendar_sections() {
        let env = MapEnv::new(&[
            ("ASANA_PAT", "pat"),
            ("ASANA_WORKSPACE_GID", "ws"),
            ("ASANA_PROJECT_GID", "proj"),
            ("GOOGLE_CALENDAR_TOKEN", "tok"),
        ]);
        let tracker = TrackerConfig::from_env(&env).unwrap();
        assert_eq!(tracker.base_url, asana::DEFAULT_BASE_URL);
        assert_eq!(tracker.workspace_gid, "ws");

        let cal = CalendarConfig::from_env(&env).unwrap();
        assert_eq!(cal.calendar_id, "primary");

        let err = TrackerConfig::from_env(&MapEnv::new(&[("ASANA_PAT", "pat")])).unwrap_err();
        assert!(err.to_string().contains("ASANA_WORKSPACE_GID"));
    }

    #[test]
    fn llm_backend_selects_key_variable() {
        let env = MapEnv::new(&[("ONBOARDIA_LLM_BACKEND", "openai"), ("OPENAI_API_KEY", "sk")]);
        let llm = llm_config_from_env(&env).unwrap();
        assert_eq!(llm.backend, LlmBackend::OpenAi);
        assert_eq!(llm.model, "gpt-4o");

        let err = llm_config_from_env(&MapEnv::new(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ANTHROPIC_API_KEY"));

        let err = llm_config_from_env(&MapEnv::new(&[("ONBOARDIA_LLM_BACKEND", "gemini")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
