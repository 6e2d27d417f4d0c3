#![forbid(unsafe_code)]

//! Per-model observable state: property callbacks and view-binding suppression.
//!
//! # Design
//!
//! An [`ObservableState`] is embedded in a model and exposed through the
//! [`Observable`] trait. It keeps, per property name, an ordered list of
//! [`Callback`]s and a suppression depth for view-binding callbacks.
//! [`Property::set`](crate::Property::set) calls [`ObservableState::notify`]
//! right after assigning, on the mutating thread.
//!
//! # Invariants
//!
//! 1. Callbacks for a property run in registration order.
//! 2. While a [`ViewBindingSuppression`] guard for a property is alive,
//!    callbacks flagged [`CallbackFlags::VIEW_BINDING`] are skipped for that
//!    property. Every other callback still runs.
//! 3. Callbacks flagged [`CallbackFlags::UI_THREAD`] are handed to the
//!    marshaller; the rest run inline.
//! 4. The callback table lock is never held while a callback runs.
//!
//! # Failure Modes
//!
//! - **Panicking callback**: the panic propagates to the mutator; later
//!   callbacks for that notification do not run. Suppression guards on the
//!   unwinding path still restore their property.
//! - **Undeliverable UI callback**: logged at `warn` and skipped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bitflags::bitflags;
use tracing::warn;

use crate::ui_thread::Marshaller;

bitflags! {
    /// How a callback is dispatched and whether it may be suppressed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CallbackFlags: u8 {
        /// Run on the UI thread through the marshaller.
        const UI_THREAD = 1 << 0;
        /// Pushes the property into a control; skipped while suppressed.
        const VIEW_BINDING = 1 << 1;
    }
}

type Action = Arc<dyn Fn() + Send + Sync>;

/// A registered property callback.
#[derive(Clone)]
pub struct Callback {
    action: Action,
    flags: CallbackFlags,
}

impl Callback {
    pub fn new(action: impl Fn() + Send + Sync + 'static, flags: CallbackFlags) -> Self {
        Self {
            action: Arc::new(action),
            flags,
        }
    }

    #[must_use]
    pub fn flags(&self) -> CallbackFlags {
        self.flags
    }

    #[must_use]
    pub fn run_on_ui_thread(&self) -> bool {
        self.flags.contains(CallbackFlags::UI_THREAD)
    }

    #[must_use]
    pub fn is_view_binding(&self) -> bool {
        self.flags.contains(CallbackFlags::VIEW_BINDING)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct PropertySlot {
    callbacks: Vec<Callback>,
    /// Live suppression guards. Nested guards keep the property suppressed
    /// until the outermost one drops.
    suppressed: u32,
}

/// Callback table of one model.
pub struct ObservableState {
    properties: Mutex<HashMap<&'static str, PropertySlot>>,
    marshaller: Marshaller,
}

impl ObservableState {
    /// State dispatching `UI_THREAD` callbacks through `marshaller`.
    #[must_use]
    pub fn new(marshaller: Marshaller) -> Self {
        Self {
            properties: Mutex::new(HashMap::new()),
            marshaller,
        }
    }

    #[must_use]
    pub fn marshaller(&self) -> &Marshaller {
        &self.marshaller
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, PropertySlot>> {
        self.properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a callback to `property`.
    pub fn add_callback(
        &self,
        property: &'static str,
        action: impl Fn() + Send + Sync + 'static,
        flags: CallbackFlags,
    ) {
        self.add(property, Callback::new(action, flags));
    }

    /// Append an already-built callback to `property`.
    pub fn add(&self, property: &'static str, callback: Callback) {
        self.lock()
            .entry(property)
            .or_default()
            .callbacks
            .push(callback);
    }

    /// Run the callbacks of `property`. Returns how many were dispatched.
    pub fn notify(&self, property: &'static str) -> usize {
        let callbacks: Vec<Callback> = {
            let mut properties = self.lock();
            let slot = properties.entry(property).or_default();
            let suppressed = slot.suppressed > 0;
            slot.callbacks
                .iter()
                .filter(|cb| !(suppressed && cb.is_view_binding()))
                .cloned()
                .collect()
        };

        let blocking = self.marshaller.config().blocking_ui_callbacks;
        for callback in &callbacks {
            if callback.run_on_ui_thread() {
                let action = Arc::clone(&callback.action);
                if let Err(err) = self.marshaller.execute(move || action(), blocking) {
                    warn!(property, error = %err, "UI callback was not delivered");
                }
            } else {
                (callback.action)();
            }
        }
        callbacks.len()
    }

    /// Skip view-binding callbacks of `property` until the guard drops.
    pub fn suppress_view_bindings(&self, property: &'static str) -> ViewBindingSuppression<'_> {
        self.lock().entry(property).or_default().suppressed += 1;
        ViewBindingSuppression {
            state: self,
            property,
        }
    }

    #[must_use]
    pub fn is_view_binding_suppressed(&self, property: &'static str) -> bool {
        self.lock()
            .get(property)
            .is_some_and(|slot| slot.suppressed > 0)
    }

    #[must_use]
    pub fn callback_count(&self, property: &'static str) -> usize {
        self.lock()
            .get(property)
            .map_or(0, |slot| slot.callbacks.len())
    }

    /// Drop every callback of every property.
    ///
    /// Suppression depth is kept: live [`ViewBindingSuppression`] guards
    /// still decrement it when they drop.
    pub fn clear_all_callbacks(&self) {
        for slot in self.lock().values_mut() {
            slot.callbacks.clear();
        }
    }
}

impl Default for ObservableState {
    /// Headless state: `UI_THREAD` callbacks run inline.
    fn default() -> Self {
        Self::new(Marshaller::headless())
    }
}

impl fmt::Debug for ObservableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let properties = self.lock();
        let mut names: Vec<&str> = properties.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("ObservableState")
            .field("properties", &names)
            .field("marshaller", &self.marshaller)
            .finish()
    }
}

/// RAII guard returned by [`ObservableState::suppress_view_bindings`].
#[must_use]
pub struct ViewBindingSuppression<'a> {
    state: &'a ObservableState,
    property: &'static str,
}

impl Drop for ViewBindingSuppression<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.state.lock().get_mut(self.property) {
            slot.suppressed = slot.suppressed.saturating_sub(1);
        }
    }
}

impl fmt::Debug for ViewBindingSuppression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBindingSuppression")
            .field("property", &self.property)
            .finish()
    }
}

/// A model that may carry observable state.
///
/// Models without state still compile against [`Property`](crate::Property);
/// their mutations are simply not broadcast.
pub trait Observable: Send + Sync + 'static {
    fn observable_state(&self) -> Option<&ObservableState> {
        None
    }
}

/// Last path segment of a type name, for diagnostics.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(
        state: &ObservableState,
        property: &'static str,
        flags: CallbackFlags,
    ) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        state.add_callback(
            property,
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            },
            flags,
        );
        count
    }

    #[test]
    fn notify_runs_callbacks_of_property_only() {
        let state = ObservableState::default();
        let text = counter(&state, "text", CallbackFlags::empty());
        let other = counter(&state, "other", CallbackFlags::empty());

        assert_eq!(state.notify("text"), 1);
        assert_eq!(text.load(Ordering::SeqCst), 1);
        assert_eq!(other.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn notify_unknown_property_is_noop() {
        let state = ObservableState::default();
        assert_eq!(state.notify("nothing"), 0);
        assert_eq!(state.callback_count("nothing"), 0);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let state = ObservableState::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ['A', 'B', 'C'] {
            let l = Arc::clone(&log);
            state.add_callback("p", move || l.lock().unwrap().push(tag), CallbackFlags::empty());
        }
        state.notify("p");
        assert_eq!(*log.lock().unwrap(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn suppression_skips_only_view_bindings() {
        let state = ObservableState::default();
        let view = counter(&state, "p", CallbackFlags::VIEW_BINDING);
        let plain = counter(&state, "p", CallbackFlags::empty());
        {
            let _guard = state.suppress_view_bindings("p");
            assert!(state.is_view_binding_suppressed("p"));
            assert_eq!(state.notify("p"), 1);
        }
        assert!(!state.is_view_binding_suppressed("p"));
        assert_eq!(view.load(Ordering::SeqCst), 0);
        assert_eq!(plain.load(Ordering::SeqCst), 1);

        state.notify("p");
        assert_eq!(view.load(Ordering::SeqCst), 1);
        assert_eq!(plain.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn suppression_is_per_property() {
        let state = ObservableState::default();
        let a = counter(&state, "a", CallbackFlags::VIEW_BINDING);
        let b = counter(&state, "b", CallbackFlags::VIEW_BINDING);
        let _guard = state.suppress_view_bindings("a");
        state.notify("a");
        state.notify("b");
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn nested_suppression_restores_at_outermost() {
        let state = ObservableState::default();
        let outer = state.suppress_view_bindings("p");
        {
            let _inner = state.suppress_view_bindings("p");
        }
        assert!(state.is_view_binding_suppressed("p"));
        drop(outer);
        assert!(!state.is_view_binding_suppressed("p"));
    }

    #[test]
    fn suppression_restored_on_panic() {
        let state = ObservableState::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = state.suppress_view_bindings("p");
            panic!("setter failed");
        }));
        assert!(result.is_err());
        assert!(!state.is_view_binding_suppressed("p"));
    }

    #[test]
    fn callback_may_register_and_notify_during_notify() {
        let state = Arc::new(ObservableState::default());
        let downstream = counter(&state, "downstream", CallbackFlags::empty());
        let s = Arc::clone(&state);
        state.add_callback(
            "upstream",
            move || {
                s.add_callback("late", || {}, CallbackFlags::empty());
                s.notify("downstream");
            },
            CallbackFlags::empty(),
        );
        state.notify("upstream");
        assert_eq!(downstream.load(Ordering::SeqCst), 1);
        assert_eq!(state.callback_count("late"), 1);
    }

    #[test]
    fn callback_added_during_notify_runs_next_time() {
        let state = Arc::new(ObservableState::default());
        let added = Arc::new(AtomicUsize::new(0));
        let (s, a) = (Arc::clone(&state), Arc::clone(&added));
        state.add_callback(
            "p",
            move || {
                let a = Arc::clone(&a);
                s.add_callback(
                    "p",
                    move || {
                        a.fetch_add(1, Ordering::SeqCst);
                    },
                    CallbackFlags::empty(),
                );
            },
            CallbackFlags::empty(),
        );
        assert_eq!(state.notify("p"), 1);
        assert_eq!(added.load(Ordering::SeqCst), 0);
        assert_eq!(state.notify("p"), 2);
        assert_eq!(added.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_all_callbacks_empties_every_property() {
        let state = ObservableState::default();
        let a = counter(&state, "a", CallbackFlags::empty());
        let _b = counter(&state, "b", CallbackFlags::UI_THREAD);
        state.clear_all_callbacks();
        assert_eq!(state.callback_count("a"), 0);
        assert_eq!(state.callback_count("b"), 0);
        state.notify("a");
        assert_eq!(a.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clear_all_callbacks_keeps_live_suppression() {
        let state = ObservableState::default();
        let _old = counter(&state, "p", CallbackFlags::VIEW_BINDING);
        let guard = state.suppress_view_bindings("p");
        state.clear_all_callbacks();
        assert!(state.is_view_binding_suppressed("p"));

        let view = counter(&state, "p", CallbackFlags::VIEW_BINDING);
        assert_eq!(state.notify("p"), 0);
        drop(guard);
        assert!(!state.is_view_binding_suppressed("p"));
        assert_eq!(state.notify("p"), 1);
        assert_eq!(view.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn headless_ui_callbacks_run_inline() {
        let state = ObservableState::default();
        let ui = counter(&state, "p", CallbackFlags::UI_THREAD);
        state.notify("p");
        assert_eq!(ui.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_flag_queries() {
        let cb = Callback::new(|| {}, CallbackFlags::UI_THREAD | CallbackFlags::VIEW_BINDING);
        assert!(cb.run_on_ui_thread());
        assert!(cb.is_view_binding());
        let plain = Callback::new(|| {}, CallbackFlags::default());
        assert!(!plain.run_on_ui_thread());
        assert!(!plain.is_view_binding());
    }

    #[test]
    fn short_type_name_strips_path() {
        struct MainModel;
        assert_eq!(short_type_name::<MainModel>(), "MainModel");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
