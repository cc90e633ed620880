use std::{env, time::Duration};

use crate::error::ConfigError;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// treated as immutable afterwards; it is pulled into the HTTP handlers via `FromRef`
/// and handed to the client shell through `RoutingConfig`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls feature activation (e.g., Dev Bypass).
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Profiles database. Optional locally, where an in-memory store is used instead.
    pub db_url: Option<String>,
    // Secret key used to decode and validate incoming session JWTs.
    pub jwt_secret: String,
    // Everything the route guard, layout selector and viewport tracker need.
    pub routing: RoutingConfig,
}

/// RoutingConfig
///
/// The subset of configuration consumed by the access-control and layout core.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutingConfig {
    /// Paths at or below this prefix render inside the admin shell.
    pub admin_prefix: String,
    /// Destination for `Redirect(SignInRequired)`.
    pub login_path: String,
    /// Destination for `Redirect(NotAuthorized)`. Must differ from the login page.
    pub unauthorized_path: String,
    /// `scrolled` becomes true strictly above this vertical offset.
    pub scroll_threshold: f64,
    /// How long a session may stay `Unknown` before gating fails closed.
    /// `None` means pending lasts until the session source resolves.
    pub auth_pending_timeout: Option<Duration>,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (in-memory profiles, header bypass) and production infrastructure.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            admin_prefix: "/admin".to_string(),
            login_path: "/login".to_string(),
            unauthorized_path: "/".to_string(),
            scroll_threshold: 50.0,
            auth_pending_timeout: None,
        }
    }
}

impl Default for AppConfig {
    /// Provides a safe AppConfig instance primarily used for test setup, so state can
    /// be scaffolded without touching environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            routing: RoutingConfig::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables and fails fast: production
    /// refuses to start without its secrets, and malformed routing values are rejected
    /// instead of silently defaulted.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(required("DATABASE_URL")?),
                required("SESSION_JWT_SECRET")?,
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok(),
                env::var("SESSION_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        Ok(Self {
            env,
            bind_addr: env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_url,
            jwt_secret,
            routing: RoutingConfig::from_env()?,
        })
    }
}

impl RoutingConfig {
    /// Builds the routing configuration from `PORTAL_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let admin_prefix = path_var("PORTAL_ADMIN_PREFIX", defaults.admin_prefix)?;
        if admin_prefix == "/" {
            return Err(ConfigError::Invalid {
                var: "PORTAL_ADMIN_PREFIX",
                value: admin_prefix,
                reason: "the admin prefix cannot be the site root",
            });
        }

        let login_path = path_var("PORTAL_LOGIN_PATH", defaults.login_path)?;
        let unauthorized_path = path_var("PORTAL_UNAUTHORIZED_PATH", defaults.unauthorized_path)?;
        if login_path == unauthorized_path {
            return Err(ConfigError::Invalid {
                var: "PORTAL_UNAUTHORIZED_PATH",
                value: unauthorized_path,
                reason: "must differ from the login path",
            });
        }

        let scroll_threshold = match env::var("PORTAL_SCROLL_THRESHOLD") {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => value,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "PORTAL_SCROLL_THRESHOLD",
                        value: raw,
                        reason: "expected a non-negative number",
                    });
                }
            },
            Err(_) => defaults.scroll_threshold,
        };

        let auth_pending_timeout = match env::var("PORTAL_AUTH_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "PORTAL_AUTH_TIMEOUT_MS",
                        value: raw,
                        reason: "expected a positive number of milliseconds",
                    });
                }
            },
            Err(_) => None,
        };

        Ok(Self {
            admin_prefix,
            login_path,
            unauthorized_path,
            scroll_threshold,
            auth_pending_timeout,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn path_var(var: &'static str, default: String) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if value.starts_with('/') => {
            let trimmed = value.trim_end_matches('/');
            Ok(if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() })
        }
        Ok(value) => Err(ConfigError::Invalid {
            var,
            value,
            reason: "paths must start with `/`",
        }),
        Err(_) => Ok(default),
    }
}
