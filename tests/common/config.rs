//! Test configuration helpers for pointing a composer at a mock provider

use std::time::Duration;
use sur_sangam::Config;

/// API key every mock expects in the `Authorization` header
pub const TEST_API_KEY: &str = "test-key-123";

/// Config aimed at `base_url` with a fast polling loop
///
/// The credential is read from `api_key_env`, so each test can use its own
/// variable and never collide with a real `SUNO_API_KEY`.
pub fn mock_config(base_url: &str, api_key_env: &str) -> Config {
    let mut config = Config::default();
    config.provider.base_url = base_url.to_string();
    config.provider.api_key_env = api_key_env.to_string();
    config.provider.request_timeout = Duration::from_secs(5);
    config.polling.interval = Duration::from_millis(10);
    config.polling.max_attempts = 5;
    config
}

/// Set an environment variable for the duration of a `#[serial]` test
pub fn set_env(variable: &str, value: &str) {
    // SAFETY: callers are #[serial], no other thread reads the environment concurrently
    unsafe { std::env::set_var(variable, value) };
}

/// Remove an environment variable set by [`set_env`]
pub fn remove_env(variable: &str) {
    // SAFETY: callers are #[serial], no other thread reads the environment concurrently
    unsafe { std::env::remove_var(variable) };
}
