//! Tracing initialisation.
//!
//! Diagnostics go to stderr so they never interleave with the agent output
//! streamed on stdout. `DISCOVERY_LOG` takes an `EnvFilter` directive and
//! overrides the level chosen by `--verbose`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a filter directive, e.g. `discovery=trace`.
pub const LOG_ENV: &str = "DISCOVERY_LOG";

/// Filter used when `DISCOVERY_LOG` is unset or invalid.
pub fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_filter(verbose));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}
