use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one: this crate's
/// lifecycle messages at info, windowing and GL loader noise at warn.
pub const DEFAULT_FILTER: &str = "warn,dome_samples=info";

/// Logger setup for the host binary.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g. "debug" or
/// "dome_samples::samples=trace".
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix each line with the emitting module, e.g. `dome_samples::samples::vr_dome`.
    pub module_path: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            module_path: true,
        }
    }
}

/// Picks the filter in precedence order: explicit config, `RUST_LOG`, then [`DEFAULT_FILTER`].
/// Blank values are skipped.
pub fn resolve_filter(config: &LoggingConfig, rust_log: Option<&str>) -> String {
    [config.env_filter.as_deref(), rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|filter| !filter.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(&config, rust_log.as_deref());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        builder.format_module_path(config.module_path);
        builder.format_target(false);
        builder.init();

        log::debug!("[LOG] logging initialized with filter {:?}", filter);
    });
}
