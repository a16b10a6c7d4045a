use classconnect_gateway::config::{AppConfig, Env};
use serial_test::serial;

// These tests mutate process-wide environment variables, so they must not
// interleave with each other.

fn clear_env() {
    unsafe {
        std::env::remove_var("APP_ENV");
        std::env::remove_var("AUTH_JWT_SECRET");
        std::env::remove_var("BACKEND_URL");
    }
}

#[test]
#[serial]
fn test_default_config_is_safe_for_tests() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert!(!config.jwt_secret.is_empty());
    assert!(!config.backend_url.is_empty());
}

#[test]
#[serial]
fn test_load_falls_back_to_local_defaults() {
    clear_env();

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.backend_url, "http://localhost:8000");
}

#[test]
#[serial]
fn test_load_reads_explicit_settings() {
    clear_env();
    unsafe {
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("AUTH_JWT_SECRET", "prod-secret");
        std::env::set_var("BACKEND_URL", "https://api.classconnect.example");
    }

    let config = AppConfig::load();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.backend_url, "https://api.classconnect.example");

    clear_env();
}
