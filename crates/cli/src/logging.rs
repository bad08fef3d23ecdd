use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Default filter when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LEVEL: &str = "warn";

/// Install the stderr tracing subscriber.
///
/// An explicit `level` wins over `RUST_LOG`. Stdout stays reserved for
/// command output.
pub fn init_tracing(level: Option<&str>) -> Result<(), String> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| format!("invalid log level '{}': {}", level, e))?,
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
        }
    };

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init()
        .map_err(|err| err.to_string())
}
