//! Logging initialization for glucolink binaries.
//!
//! Thin wrappers over the observability crate. Every process writes structured
//! JSONL to `~/.glucolink/logs/dev.jsonl`. Setting `GLUCOLINK_LOG_STDERR=1`
//! also mirrors it to stderr.

/// Initialize the logging system for the CLI.
///
/// # Arguments
///
/// * `level` - Default log level (trace, debug, info, warn, error)
///
/// # Example
///
/// ```ignore
/// init_logging("info");
/// tracing::info!("cli started");
/// ```
pub fn init_logging(level: &str) {
    init_logging_for_service("cli", level);
}

/// Initialize logging with a custom service name.
///
/// Use this when several glucolink components share the central log stream.
pub fn init_logging_for_service(service_name: &str, level: &str) {
    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: parse_level(level).to_string().to_lowercase(),
        also_stderr: stderr_requested(std::env::var("GLUCOLINK_LOG_STDERR").ok().as_deref()),
        ..Default::default()
    });
}

/// Stderr mirroring is off unless `GLUCOLINK_LOG_STDERR` is truthy.
fn stderr_requested(value: Option<&str>) -> bool {
    value.is_some_and(|value| matches!(value.trim(), "1" | "true" | "yes"))
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_all_variants() {
        assert_eq!(parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(parse_level("debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("info"), tracing::Level::INFO);
        assert_eq!(parse_level("warn"), tracing::Level::WARN);
        assert_eq!(parse_level("warning"), tracing::Level::WARN);
        assert_eq!(parse_level("error"), tracing::Level::ERROR);
    }

    #[test]
    fn stderr_is_opt_in() {
        assert!(!stderr_requested(None));
        assert!(!stderr_requested(Some("")));
        assert!(!stderr_requested(Some("0")));
        assert!(stderr_requested(Some("1")));
        assert!(stderr_requested(Some(" true ")));
    }

    #[test]
    fn parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), tracing::Level::TRACE);
        assert_eq!(parse_level("Debug"), tracing::Level::DEBUG);
        assert_eq!(parse_level("WARNING"), tracing::Level::WARN);
    }

    #[test]
    fn parse_level_unknown_defaults_to_info() {
        assert_eq!(parse_level(""), tracing::Level::INFO);
        assert_eq!(parse_level("verbose"), tracing::Level::INFO);
    }

    #[test]
    fn level_display_is_a_valid_filter_directive() {
        assert_eq!(parse_level("debug").to_string().to_lowercase(), "debug");
        assert_eq!(parse_level("bogus").to_string().to_lowercase(), "info");
    }
}
