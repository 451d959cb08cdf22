//! Logging setup.
//!
//! Strata emits `tracing` events at its seams: statement construction,
//! rendering, terminal operations and dialect execution. Applications that
//! already install a subscriber see them with no further setup. Otherwise
//! [`init`] installs one (cargo feature `tracing-subscriber`), driven by:
//!
//! - `STRATA_DEBUG=true|1|yes` - debug level, and enables [`strata_debug!`]
//!   and [`strata_trace!`]
//! - `STRATA_LOG_LEVEL=trace|debug|info|warn|error` - explicit level
//! - `STRATA_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! ```rust,no_run
//! use strata_query::logging;
//!
//! // Once, at startup.
//! logging::init();
//! ```
//!
//! [`strata_debug!`]: crate::strata_debug
//! [`strata_trace!`]: crate::strata_trace

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Once;

/// Enables debug output and the `strata_*` macros.
pub const ENV_DEBUG: &str = "STRATA_DEBUG";
/// Explicit log level.
pub const ENV_LOG_LEVEL: &str = "STRATA_LOG_LEVEL";
/// Output format.
pub const ENV_LOG_FORMAT: &str = "STRATA_LOG_FORMAT";

static INIT: Once = Once::new();

/// How [`init`] formats events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human oriented.
    Pretty,
    /// Single line, human oriented.
    Compact,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        })
    }
}

/// Whether `STRATA_DEBUG` is set to `true`, `1` or `yes` (any case).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(ENV_DEBUG).is_ok_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// The level from `STRATA_LOG_LEVEL`.
///
/// Unset or unknown values fall back to `debug` when `STRATA_DEBUG` is on and
/// `warn` otherwise.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    let Ok(level) = env::var(ENV_LOG_LEVEL) else {
        return fallback;
    };
    ["trace", "debug", "info", "warn", "error"]
        .into_iter()
        .find(|known| level.eq_ignore_ascii_case(known))
        .unwrap_or(fallback)
}

/// The format from `STRATA_LOG_FORMAT`; JSON when unset or unknown.
pub fn get_log_format() -> LogFormat {
    env::var(ENV_LOG_FORMAT)
        .ok()
        .and_then(|f| f.parse().ok())
        .unwrap_or_default()
}

/// Install a subscriber for Strata's events.
///
/// Does nothing unless `STRATA_DEBUG` or `STRATA_LOG_LEVEL` is set, or when
/// built without the `tracing-subscriber` feature. Only the first call has an
/// effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(ENV_LOG_LEVEL).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let format = get_log_format();
            let filter = EnvFilter::try_new(format!("strata={level},strata_query={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let registry = tracing_subscriber::registry().with(filter);

            // `try_init` leaves an application's own subscriber in place.
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level = level, format = %format, "Strata logging initialized");
            }
        }
    });
}

/// Set `STRATA_LOG_LEVEL` to `level`, then [`init`].
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call this early in your program before
/// spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: only called at program startup, before threads are spawned.
    unsafe {
        env::set_var(ENV_LOG_LEVEL, level);
    }
    init();
}

/// `tracing::debug!`, emitted only while `STRATA_DEBUG` is on.
#[macro_export]
macro_rules! strata_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// `tracing::trace!`, emitted only while `STRATA_DEBUG` is on.
#[macro_export]
macro_rules! strata_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_log_defaults() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var(ENV_DEBUG);
            env::remove_var(ENV_LOG_LEVEL);
            env::remove_var(ENV_LOG_FORMAT);
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
        assert_eq!(get_log_format(), LogFormat::Json);
    }
}
