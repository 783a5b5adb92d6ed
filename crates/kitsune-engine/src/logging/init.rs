use std::sync::Once;

/// Filter used when neither the caller nor `RUST_LOG` provides one. GPU crates
/// log every pipeline and buffer at info, so they are held at warn.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger settings for `init_logging`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter directives, e.g. "kitsune_engine=debug,wgpu=warn".
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Millisecond timestamps make frame pacing visible in the log.
    pub millis: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            millis: true,
        }
    }
}

impl LoggingConfig {
    /// Settings with an explicit filter, which takes precedence over `RUST_LOG`.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    fn filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&config.filter());
        builder.write_style(config.write_style);
        if config.millis {
            builder.format_timestamp_millis();
        }

        // Another logger may already be installed (test harnesses, embedding hosts).
        if builder.try_init().is_err() {
            return;
        }
        log::debug!("logging initialized");
    });
}
