//! Tracing subscriber setup for binaries built on this crate.
//!
//! The library only emits `tracing` events; installing a subscriber is up
//! to the application. [`init_tracing`] is the one the testbed uses.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a formatting subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call more than once; only the first call does anything. If some
/// other subscriber is already installed, that one is kept.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_err()
        {
            tracing::debug!("global tracing subscriber already set");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("still logging after repeated init");
    }
}
