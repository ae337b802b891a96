//! Logger setup for the `curv` binary. The library only talks to the `log`
//! facade; this is the one place a backend is chosen.

use std::sync::Once;

/// `env_filter` follows the `env_logger` filter syntax, e.g. "warn" or
/// "curv_lang=debug".
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// `-v` turns on debug output for the compiler, overriding `RUST_LOG`.
    pub fn verbose(verbose: bool) -> Self {
        Self {
            env_filter: verbose.then(|| "curv_lang=debug,curv=debug".to_string()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            // diagnostics go to stderr already; keep the log quiet
            builder.filter_level(log::LevelFilter::Warn);
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized");
    });
}
