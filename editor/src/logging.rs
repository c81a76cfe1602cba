//! `env_logger` setup.

use crate::config::LogSettings;

/// Installs `env_logger`. `RUST_LOG` wins over the configured filter.
pub fn init(settings: &LogSettings) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.filter.as_str()),
    )
    .try_init()
}

/// Test-friendly logger: output is captured by the test harness, and a
/// second call is harmless.
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
