#![forbid(unsafe_code)]

//! Marshaller configuration.
//!
//! Defaults match the fire-and-forget behavior of a plain UI toolkit: view
//! updates and UI-thread callbacks are queued and the caller moves on.
//! Environment overrides (read by [`MarshallerConfig::from_env`]):
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `BINDWIRE_HEADLESS` | run everything inline, no UI thread |
//! | `BINDWIRE_BLOCKING_VIEW_UPDATES` | view updaters wait for the UI write |
//! | `BINDWIRE_BLOCKING_UI_CALLBACKS` | `UI_THREAD` callbacks wait for completion |
//!
//! Flags are truthy when set to `1`, `true`, `yes` or `on` (case-insensitive).

/// Environment variable forcing headless marshalling.
pub const ENV_HEADLESS: &str = "BINDWIRE_HEADLESS";
/// Environment variable making view updaters block.
pub const ENV_BLOCKING_VIEW_UPDATES: &str = "BINDWIRE_BLOCKING_VIEW_UPDATES";
/// Environment variable making `UI_THREAD` callbacks block.
pub const ENV_BLOCKING_UI_CALLBACKS: &str = "BINDWIRE_BLOCKING_UI_CALLBACKS";

/// Configuration for a [`Marshaller`](crate::Marshaller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarshallerConfig {
    /// Ignore any UI runtime and run every task inline.
    pub headless: bool,
    /// View updaters built by `wrap_for_repeated_ui_update` wait until the
    /// control write has happened on the UI thread.
    pub blocking_view_updates: bool,
    /// Callbacks registered with `UI_THREAD` wait for completion.
    pub blocking_ui_callbacks: bool,
}

impl MarshallerConfig {
    /// Config forcing headless mode.
    #[must_use]
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn with_blocking_view_updates(mut self, blocking: bool) -> Self {
        self.blocking_view_updates = blocking;
        self
    }

    #[must_use]
    pub fn with_blocking_ui_callbacks(mut self, blocking: bool) -> Self {
        self.blocking_ui_callbacks = blocking;
        self
    }

    /// Apply environment overrides on top of the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides using a custom lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| get_env(key).is_some_and(|v| env_flag(&v));
        Self {
            headless: flag(ENV_HEADLESS),
            blocking_view_updates: flag(ENV_BLOCKING_VIEW_UPDATES),
            blocking_ui_callbacks: flag(ENV_BLOCKING_UI_CALLBACKS),
        }
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
