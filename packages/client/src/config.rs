//! Client configuration, built in code or from environment variables.

use std::time::Duration;

use ows_core::ApiPaths;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be true or false, got {value:?}")]
    InvalidBool { name: &'static str, value: String },

    #[error("{0} is required when its auto flag is set")]
    Missing(&'static str),
}

/// Account credentials. Held only as long as the configuration that owns
/// them; the client never writes them anywhere.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Runtime configuration for an OWS2 session client.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `OWS_API_PATH` | `http://localhost:44302/` | Public API base path |
/// | `OWS_INSTANCE_MANAGEMENT_API_PATH` | public path | Instance-management base path |
/// | `OWS_CHARACTER_PERSISTENCE_API_PATH` | public path | Character-persistence base path |
/// | `OWS_CUSTOMER_KEY` | empty | Sent as `X-CustomerGUID` on every request |
/// | `OWS_ENCRYPTION_KEY` | empty | Key for travel tokens |
/// | `OWS_TIMEOUT_SECS` | `30` | Request timeout |
/// | `OWS_USER_AGENT` | `X-UnrealEngine-Agent` | `User-Agent` header |
/// | `OWS_AUTO_ADVANCE` | `true` | Continue from login to a travel URL automatically |
/// | `OWS_DEFAULT_CHARACTER_SET` | `Default` | Template for a new account's first character |
/// | `OWS_AUTO_REGISTER` | `false` | Register on `start()` using `OWS_REGISTER_*` |
/// | `OWS_AUTO_LOGIN` | `false` | Log in on `start()` using `OWS_LOGIN_*` |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_paths: ApiPaths,
    pub customer_key: String,
    pub encryption_key: String,
    pub timeout: Duration,
    pub user_agent: String,

    /// When set, a successful login continues through character listing,
    /// selection and zone resolution to a travel URL.
    pub auto_advance: bool,

    /// Default set used for the character created right after registration.
    pub default_character_set: String,

    pub auto_register: Option<Credentials>,
    pub auto_login: Option<Credentials>,
}

pub const DEFAULT_API_PATH: &str = "http://localhost:44302/";
pub const DEFAULT_USER_AGENT: &str = "X-UnrealEngine-Agent";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CHARACTER_SET: &str = "Default";

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_paths: ApiPaths::new(DEFAULT_API_PATH),
            customer_key: String::new(),
            encryption_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
            auto_advance: true,
            default_character_set: DEFAULT_CHARACTER_SET.into(),
            auto_register: None,
            auto_login: None,
        }
    }
}

impl ClientConfig {
    /// Serve every API module from `api_path`.
    pub fn new(
        api_path: impl Into<String>,
        customer_key: impl Into<String>,
        encryption_key: impl Into<String>,
    ) -> Self {
        Self {
            api_paths: ApiPaths::new(api_path),
            customer_key: customer_key.into(),
            encryption_key: encryption_key.into(),
            ..Default::default()
        }
    }

    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Populate config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let public = var("OWS_API_PATH").unwrap_or_else(|| DEFAULT_API_PATH.into());
        let api_paths = ApiPaths {
            instance_management: var("OWS_INSTANCE_MANAGEMENT_API_PATH")
                .unwrap_or_else(|| public.clone()),
            character_persistence: var("OWS_CHARACTER_PERSISTENCE_API_PATH")
                .unwrap_or_else(|| public.clone()),
            public,
        };

        let timeout = match var("OWS_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.trim().parse().map_err(|_| {
                ConfigError::InvalidNumber {
                    name: "OWS_TIMEOUT_SECS",
                    value: v.clone(),
                }
            })?),
            None => DEFAULT_TIMEOUT,
        };

        let auto_register = if parse_bool("OWS_AUTO_REGISTER", var("OWS_AUTO_REGISTER"))? {
            Some(
                Credentials::new(
                    required(&var, "OWS_REGISTER_EMAIL")?,
                    required(&var, "OWS_REGISTER_PASSWORD")?,
                )
                .with_name(
                    var("OWS_REGISTER_FIRST_NAME").unwrap_or_default(),
                    var("OWS_REGISTER_LAST_NAME").unwrap_or_default(),
                ),
            )
        } else {
            None
        };

        let auto_login = if parse_bool("OWS_AUTO_LOGIN", var("OWS_AUTO_LOGIN"))? {
            Some(Credentials::new(
                required(&var, "OWS_LOGIN_EMAIL")?,
                required(&var, "OWS_LOGIN_PASSWORD")?,
            ))
        } else {
            None
        };

        Ok(Self {
            api_paths,
            customer_key: var("OWS_CUSTOMER_KEY").unwrap_or_default(),
            encryption_key: var("OWS_ENCRYPTION_KEY").unwrap_or_default(),
            timeout,
            user_agent: var("OWS_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            auto_advance: match var("OWS_AUTO_ADVANCE") {
                Some(v) => parse_bool("OWS_AUTO_ADVANCE", Some(v))?,
                None => true,
            },
            default_character_set: var("OWS_DEFAULT_CHARACTER_SET")
                .unwrap_or_else(|| DEFAULT_CHARACTER_SET.into()),
            auto_register,
            auto_login,
        })
    }
}

fn parse_bool(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { name, value }),
    }
}

fn required<F>(var: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    var(name).ok_or(ConfigError::Missing(name))
}
