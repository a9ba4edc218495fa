use raptor::tracing::dispatcher::DefaultGuard;
use raptor::tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter read from `RUST_LOG`, or `default_level` when it is not set or invalid
fn env_filter(default_level: LevelFilter) -> EnvFilter {
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            err,
        );
        EnvFilter::new(default_level.to_string())
    })
}

/// Install the global subscriber, logging at INFO level by default.
pub fn init_logger() {
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter(LevelFilter::INFO));
    if let Err(err) = raptor::tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global tracing subscriber : {}", err);
    }
}

/// Subscriber for the current test only, logging at DEBUG level by default.
/// Logs are captured by the test harness.
#[must_use]
pub fn init_test_logger() -> DefaultGuard {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(env_filter(LevelFilter::DEBUG))
        .set_default()
}
