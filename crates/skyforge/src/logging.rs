//! Log output setup.
//!
//! Library code only emits `tracing` events; binaries embedding Skyforge
//! call [`init`] once at startup to print them. `RUST_LOG` overrides the
//! default filter, e.g. `RUST_LOG=skyforge_arena=debug`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a compact stdout subscriber with the default filter.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with(DEFAULT_FILTER)
}

/// Like [`init`], with a different fallback filter.
pub fn init_with(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        // The first call may lose to another test in this binary.
        let _ = init_with("warn");
        assert!(!init());
    }
}
