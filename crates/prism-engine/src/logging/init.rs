use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "prism_engine=debug,wgpu_core=warn").
///
/// `write_style` controls ANSI coloring behavior.
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

/// Filter used when neither the config nor `RUST_LOG` provides one.
///
/// wgpu internals are chatty at `info`; keep them at `warn`.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        // Another logger may already be installed (tests, embedding hosts).
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized (filter: {filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_explicit_filter() {
        let config = LoggingConfig::default();
        assert!(config.env_filter.is_none());
        assert!(matches!(config.write_style, env_logger::WriteStyle::Auto));
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig {
            env_filter: Some("off".to_string()),
            ..Default::default()
        };
        init_logging(config.clone());
        init_logging(config);
    }
}
