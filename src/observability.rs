//! Structured diagnostics for the decoder.
//!
//! Block and envelope decodes are hot paths, so the `log_metric!` hook only
//! formats its key-value pairs when the `log` debug level is enabled for this crate.

/// Logs a structured key-value metric line through the `log` facade at debug level.
///
/// # Example
/// ```
/// use rawblock::log_metric;
/// let rows = 4;
/// log_metric!("event"="decode_block", "rows"=rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if ::log::log_enabled!(::log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            ::log::debug!("RAWBLOCK_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}
