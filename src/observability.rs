//! This module provides observability and diagnostics capabilities for the
//! streaming adapters.
//!
//! The adapters run long, chatty step loops; when something goes wrong the
//! interesting facts are counters (bytes pulled, bytes produced, members
//! completed), not stack traces. The `stream_metric!` macro is the primary
//! tool for those facts.
//!
//! It is a zero-cost abstraction: the `#[cfg(debug_assertions)]` attribute
//! ensures that the macro and all calls to it are completely compiled out of
//! release builds, imposing no performance penalty in production.

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use muara_stream::stream_metric;
/// let members = 2;
/// stream_metric!("event" = "member_reset", "members" = &members);
/// ```
#[macro_export]
macro_rules! stream_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("MUARA_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}

/// Turns on `env_logger` so `trace!`/`debug!` lines from the adapters reach
/// stderr. Safe to call more than once; later calls are ignored.
pub fn enable_verbose_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(false)
        .try_init();
}
