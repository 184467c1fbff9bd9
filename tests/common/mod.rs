//! Shared test helpers.

/// Initialize test logging (call once per test).
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("debug").try_init();
}
