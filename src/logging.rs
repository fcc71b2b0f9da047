//! Subscriber setup for binaries and examples embedding the back office.

/// Installs a formatting subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok()
}
