#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! Every crate in the workspace logs through the `tracing` facade. Library
//! code never installs a subscriber; binaries (the demo) and ad-hoc debugging
//! sessions call [`init_tracing`], which is available with the
//! `tracing-subscriber` feature.
//!
//! The filter comes from `RUST_LOG` and falls back to [`DEFAULT_FILTER`].
//! With the `tracing-json` feature the output is one JSON object per line.

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global fmt subscriber.
///
/// Fails if a global subscriber is already installed.
#[cfg(feature = "tracing-subscriber")]
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true);

    #[cfg(feature = "tracing-json")]
    let result = builder.json().try_init();
    #[cfg(not(feature = "tracing-json"))]
    let result = builder.try_init();

    result
}
