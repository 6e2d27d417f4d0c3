#![forbid(unsafe_code)]

//! Typed property descriptors.
//!
//! A [`Property`] names one value on a model and carries plain function
//! pointers to read it and to assign it without side effects. It is `Copy`
//! and `const`-constructible, so models declare their properties as
//! associated constants:
//!
//! ```
//! use std::sync::Mutex;
//! use bindwire_runtime::{Observable, ObservableState, Property};
//!
//! #[derive(Default)]
//! struct Counter {
//!     state: ObservableState,
//!     value: Mutex<i32>,
//! }
//!
//! impl Counter {
//!     const VALUE: Property<Self, i32> = Property::new(
//!         "value",
//!         |m| *m.value.lock().unwrap(),
//!         |m, v| *m.value.lock().unwrap() = v,
//!     );
//! }
//!
//! impl Observable for Counter {
//!     fn observable_state(&self) -> Option<&ObservableState> {
//!         Some(&self.state)
//!     }
//! }
//!
//! let counter = Counter::default();
//! Counter::VALUE.set(&counter, 3);
//! assert_eq!(Counter::VALUE.get(&counter), 3);
//! ```

use std::fmt;

use bindwire_core::BindError;
use tracing::warn;

use super::observable::{Observable, short_type_name};

/// A named, typed value on model `M`.
pub struct Property<M, V> {
    name: &'static str,
    get: fn(&M) -> V,
    assign: fn(&M, V),
}

impl<M, V> Clone for Property<M, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, V> Copy for Property<M, V> {}

impl<M, V> PartialEq for Property<M, V> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<M, V> Eq for Property<M, V> {}

impl<M, V> Property<M, V> {
    /// Describe a property by name, reader and raw assignment.
    #[must_use]
    pub const fn new(name: &'static str, get: fn(&M) -> V, assign: fn(&M, V)) -> Self {
        Self { name, get, assign }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    pub fn get(&self, model: &M) -> V {
        (self.get)(model)
    }

    /// Assign without notifying anyone.
    pub fn set_silently(&self, model: &M, value: V) {
        (self.assign)(model, value);
    }
}

impl<M: Observable, V> Property<M, V> {
    /// Assign, then notify the property's callbacks on this thread.
    ///
    /// A model without observable state still gets the value; the missing
    /// broadcast is logged at `warn`.
    pub fn set(&self, model: &M, value: V) {
        (self.assign)(model, value);
        match model.observable_state() {
            Some(state) => {
                state.notify(self.name);
            }
            None => {
                let orphan = BindError::OrphanedObservableMutation {
                    model: short_type_name::<M>(),
                    property: self.name,
                };
                warn!(model = short_type_name::<M>(), property = self.name, "{orphan}");
            }
        }
    }
}

impl<M, V> fmt::Debug for Property<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("model", &short_type_name::<M>())
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::observable::{CallbackFlags, ObservableState};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Model {
        state: ObservableState,
        text: Mutex<String>,
    }

    impl Model {
        const TEXT: Property<Self, String> = Property::new(
            "text",
            |m| m.text.lock().unwrap().clone(),
            |m, v| *m.text.lock().unwrap() = v,
        );
    }

    impl Observable for Model {
        fn observable_state(&self) -> Option<&ObservableState> {
            Some(&self.state)
        }
    }

    #[derive(Default)]
    struct Stateless {
        value: Mutex<i64>,
    }

    impl Stateless {
        const VALUE: Property<Self, i64> = Property::new(
            "value",
            |m| *m.value.lock().unwrap(),
            |m, v| *m.value.lock().unwrap() = v,
        );
    }

    impl Observable for Stateless {}

    fn watch(model: &Model) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        model.state.add_callback(
            Model::TEXT.name(),
            move || {
                c.fetch_add(1, Ordering::SeqCst);
            },
            CallbackFlags::empty(),
        );
        count
    }

    #[test]
    fn set_assigns_then_notifies() {
        let model = Arc::new(Model::default());
        let seen = Arc::new(Mutex::new(String::new()));
        let (m, s) = (Arc::downgrade(&model), Arc::clone(&seen));
        model.state.add_callback(
            "text",
            move || {
                if let Some(m) = m.upgrade() {
                    *s.lock().unwrap() = Model::TEXT.get(&m);
                }
            },
            CallbackFlags::empty(),
        );
        Model::TEXT.set(&model, "hello".into());
        assert_eq!(*seen.lock().unwrap(), "hello");
    }

    #[test]
    fn set_notifies_even_when_value_unchanged() {
        let model = Model::default();
        let count = watch(&model);
        Model::TEXT.set(&model, "same".into());
        Model::TEXT.set(&model, "same".into());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn set_silently_does_not_notify() {
        let model = Model::default();
        let count = watch(&model);
        Model::TEXT.set_silently(&model, "quiet".into());
        assert_eq!(Model::TEXT.get(&model), "quiet");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stateless_model_still_assigns() {
        let model = Stateless::default();
        Stateless::VALUE.set(&model, 7);
        assert_eq!(Stateless::VALUE.get(&model), 7);
    }

    #[test]
    fn properties_compare_by_name() {
        assert_eq!(Model::TEXT, Model::TEXT);
        assert!(format!("{:?}", Model::TEXT).contains("\"text\""));
    }
}
