//! Structured logging setup for binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the program using it.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "kinesis_probe=info";

/// Filter used when `RUST_LOG` is not set and verbose output was requested.
pub const VERBOSE_FILTER: &str = "kinesis_probe=debug,stream_harness=debug";

/// The filter for the given verbosity, preferring `RUST_LOG` when set.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

/// Install a formatting subscriber on stderr.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
