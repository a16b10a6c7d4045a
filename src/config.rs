use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded,
/// ensuring consistency across all services (backend client, auth).
/// It is pulled into the application state via FromRef.
#[derive(Clone)]
pub struct AppConfig {
    /// Base URL of the external REST backend every data call is proxied to.
    pub backend_url: String,
    /// Secret key used to decode and validate incoming session JWTs.
    pub jwt_secret: String,
    /// Runtime environment marker. Controls feature activation (e.g. the
    /// local auth bypass) and log formatting.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (auth bypass, pretty logs) and hardened production behavior.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring environment variables to be set.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing configuration at startup.
    /// Reads everything from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current
    /// runtime environment (especially Production) is not set. This prevents
    /// the gateway from starting with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The production secret is mandatory and must be explicitly set.
        let jwt_secret = match env {
            Env::Production => env::var("AUTH_JWT_SECRET")
                .expect("FATAL: AUTH_JWT_SECRET must be set in production."),
            _ => env::var("AUTH_JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        let backend_url = match env {
            Env::Production => {
                env::var("BACKEND_URL").expect("FATAL: BACKEND_URL required in production")
            }
            _ => env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()),
        };

        Self {
            backend_url,
            jwt_secret,
            env,
        }
    }
}
