use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use workhive_application::WorkflowPolicy;
use workhive_core::AppError;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub workflow_policy: WorkflowPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let database_url = required_env(&lookup, "DATABASE_URL")?;
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env(&lookup, "AUTH_BOOTSTRAP_TOKEN")?;
        let session_secret = required_env(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = flag(&lookup, "SESSION_COOKIE_SECURE", false)?;

        let defaults = WorkflowPolicy::default();
        let workflow_policy = WorkflowPolicy {
            enforce_single_active_sprint: flag(
                &lookup,
                "WORKFLOW_ENFORCE_SINGLE_ACTIVE_SPRINT",
                defaults.enforce_single_active_sprint,
            )?,
            reject_dependency_cycles: flag(
                &lookup,
                "WORKFLOW_REJECT_DEPENDENCY_CYCLES",
                defaults.reject_dependency_cycles,
            )?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            workflow_policy,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, AppError> {
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = required_env(lookup, name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: bool,
) -> Result<bool, AppError> {
    let Some(value) = lookup(name).filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{name} must be 'true' or 'false', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use workhive_core::AppError;

    use super::ApiConfig;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/workhive".to_owned()),
            ("AUTH_BOOTSTRAP_TOKEN", "dev-token".to_owned()),
            ("SESSION_SECRET", "x".repeat(32)),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<ApiConfig, AppError> {
        ApiConfig::from_lookup(false, |name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_optional_variables_are_missing() {
        let config = load(&base_env());
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.frontend_url, "http://localhost:3000");
        assert_eq!(config.api_port, 3001);
        assert!(!config.cookie_secure);
        assert!(config.workflow_policy.enforce_single_active_sprint);
        assert!(config.workflow_policy.reject_dependency_cycles);
        assert!(
            config
                .socket_address()
                .is_ok_and(|address| address.to_string() == "127.0.0.1:3001")
        );
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let mut env = base_env();
        env.insert("SESSION_SECRET", "short".to_owned());

        let config = load(&env);
        assert!(matches!(config, Err(AppError::Validation(_))));
    }

    #[test]
    fn workflow_flags_can_be_relaxed() {
        let mut env = base_env();
        env.insert("WORKFLOW_ENFORCE_SINGLE_ACTIVE_SPRINT", "false".to_owned());
        env.insert("WORKFLOW_REJECT_DEPENDENCY_CYCLES", "0".to_owned());

        let config = load(&env).unwrap_or_else(|_| unreachable!());
        assert!(!config.workflow_policy.enforce_single_active_sprint);
        assert!(!config.workflow_policy.reject_dependency_cycles);
    }

    #[test]
    fn malformed_flag_is_a_validation_error() {
        let mut env = base_env();
        env.insert("WORKFLOW_REJECT_DEPENDENCY_CYCLES", "sometimes".to_owned());

        assert!(matches!(load(&env), Err(AppError::Validation(_))));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let mut env = base_env();
        env.remove("DATABASE_URL");

        assert!(
            matches!(load(&env), Err(AppError::Validation(message)) if message == "DATABASE_URL is required")
        );
    }
}
