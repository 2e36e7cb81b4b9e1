use super::*;

#[test]
fn test_log_context_creation() {
    let context = LogContext::new("clean");
    assert_eq!(context.operation, "clean");
}

#[test]
fn test_filter_directives_scope_level_to_local_crates() {
    assert_eq!(
        filter_directives(LogLevel::Debug),
        "testbed_lib=debug,testbed=debug,warn"
    );
    assert_eq!(
        filter_directives(LogLevel::Error),
        "testbed_lib=error,testbed=error,warn"
    );
}

#[test]
fn test_filter_directives_parse() {
    for level in [LogLevel::Error, LogLevel::Info, LogLevel::Trace] {
        assert!(EnvFilter::try_new(filter_directives(level)).is_ok());
    }
}

#[test]
fn test_log_macros_without_global_logger() {
    // Fall back to plain tracing when nothing was initialized
    crate::log_info!("info without logger");
    crate::log_warn!("warn without logger");
    crate::log_info!("info with context", LogContext::new("setup"));
}
