//! Tracing setup for hosts that embed the builder.
//!
//! The builder itself only emits `tracing` events; installing a subscriber
//! is left to the host. This helper installs the usual fmt + env-filter
//! stack.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a global subscriber. Does nothing if one is already installed.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init();
}
