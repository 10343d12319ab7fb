use std::io;
use configs::{LogConfig, LogFormat};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber from an explicit logging config.
/// - `RUST_LOG` wins when set, otherwise `cfg.filter` is used
/// - `LogFormat::Json` emits structured JSON, `Compact` is human-readable
/// - Writes to stdout for consistent container logging behavior
/// - Safe to call twice; the second call is a no-op
pub fn init_logging(cfg: &LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.filter));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);
    let _ = match cfg.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

/// Compact logging with the default filter, for tools and tests.
pub fn init_logging_default() {
    init_logging(&LogConfig::default());
}
