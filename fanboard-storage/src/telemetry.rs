//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries and integration tests
//! call [`init_tracing`] once to see them.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "fanboard_storage=info,fanboard_schedule=info,warn";

/// Install a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// Returns `false` if a global subscriber was already installed, which
/// makes repeated calls from tests harmless.
pub fn init_tracing(default_directive: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(default_directive, "tracing initialized");
    }
    installed
}
