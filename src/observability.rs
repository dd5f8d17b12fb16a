//! This module provides observability and diagnostics for flush decisions.
//!
//! A writer's stripe layout is decided entirely by these policies, so their
//! reasoning needs to be visible when a file comes out with unexpected stripe
//! sizes. Everything goes through the `log` facade; `log_metric!` is the
//! structured hook, and `init_logging` wires up `env_logger` for binaries and
//! tests that do not install their own logger.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::StripeflowError;

/// Logs a structured key-value metric at `debug` level.
///
/// # Example
/// ```
/// use stripeflow::log_metric;
/// let rows = 4096;
/// log_metric!("event"="should_flush", "policy"="row_count", "rows"=&rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::debug!("STRIPEFLOW_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend at the given level, once per process.
///
/// When `log_file` is given, records are appended to that file instead of
/// stderr. Later calls are no-ops, as is the call when another logger has
/// already been installed.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), StripeflowError> {
    // Open the file outside `call_once` so a bad path is reported to the caller.
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
