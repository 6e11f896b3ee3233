//! Structured logging for the Corona viewer.
//!
//! Installs a `tracing` subscriber with an uptime-stamped console layer and,
//! in debug builds, a JSON file layer. Library crates log through the `log`
//! facade; `tracing-subscriber` picks those records up as well.

use corona_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "corona.log";

/// The filter directive for the given config: its `debug.log_level` when
/// non-empty, [`DEFAULT_FILTER`] otherwise.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            config.debug.log_level.clone()
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the config. When `debug_build` is set and
/// `log_dir` can be created, records are also written as JSON lines to
/// [`LOG_FILE_NAME`] inside it.
///
/// ```no_run
/// use corona_config::Config;
///
/// let config = Config::default();
/// corona_log::init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_directive(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        assert_eq!(filter_directive(None), DEFAULT_FILTER);
    }

    #[test]
    fn test_config_log_level_wins() {
        let mut config = Config::default();
        config.debug.log_level = "debug,corona_render=trace".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,corona_render=trace");
    }

    #[test]
    fn test_default_config_uses_default_filter() {
        assert_eq!(filter_directive(Some(&Config::default())), DEFAULT_FILTER);
    }

    #[test]
    fn test_blank_log_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "  ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_new(DEFAULT_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("wgpu=warn"));
        assert!(rendered.contains("naga=warn"));
    }

    #[test]
    fn test_subsystem_filters_parse() {
        for directive in [
            "info",
            "debug,corona_effects=trace",
            "warn,corona_render=debug,corona_scene=trace",
        ] {
            assert!(
                EnvFilter::try_new(directive).is_ok(),
                "failed to parse filter: {directive}"
            );
        }
    }

    #[test]
    fn test_log_file_lands_in_log_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(LOG_FILE_NAME);
        assert_eq!(path.file_name().unwrap(), LOG_FILE_NAME);
        assert!(path.starts_with(temp_dir.path()));
    }
}
