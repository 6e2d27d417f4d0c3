#![forbid(unsafe_code)]

//! The demo's observable model.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bindwire_runtime::{Marshaller, Observable, ObservableState, Property};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Form state shared by the view and the controller.
#[derive(Debug, Default)]
pub struct MainModel {
    state: ObservableState,
    edit_text: Mutex<String>,
    label_text: Mutex<String>,
    button_enabled: Mutex<bool>,
    is_checked: Mutex<bool>,
    checked_1: Mutex<bool>,
    checked_2: Mutex<bool>,
    checked_3: Mutex<bool>,
}

impl MainModel {
    pub const EDIT_TEXT: Property<Self, String> = Property::new(
        "edit_text",
        |m| lock(&m.edit_text).clone(),
        |m, v| *lock(&m.edit_text) = v,
    );
    pub const LABEL_TEXT: Property<Self, String> = Property::new(
        "label_text",
        |m| lock(&m.label_text).clone(),
        |m, v| *lock(&m.label_text) = v,
    );
    pub const BUTTON_ENABLED: Property<Self, bool> = Property::new(
        "button_enabled",
        |m| *lock(&m.button_enabled),
        |m, v| *lock(&m.button_enabled) = v,
    );
    pub const IS_CHECKED: Property<Self, bool> = Property::new(
        "is_checked",
        |m| *lock(&m.is_checked),
        |m, v| *lock(&m.is_checked) = v,
    );
    pub const CHECKED_1: Property<Self, bool> = Property::new(
        "checked_1",
        |m| *lock(&m.checked_1),
        |m, v| *lock(&m.checked_1) = v,
    );
    pub const CHECKED_2: Property<Self, bool> = Property::new(
        "checked_2",
        |m| *lock(&m.checked_2),
        |m, v| *lock(&m.checked_2) = v,
    );
    pub const CHECKED_3: Property<Self, bool> = Property::new(
        "checked_3",
        |m| *lock(&m.checked_3),
        |m, v| *lock(&m.checked_3) = v,
    );

    /// The three radio properties, in button order.
    pub const RADIOS: [Property<Self, bool>; 3] =
        [Self::CHECKED_1, Self::CHECKED_2, Self::CHECKED_3];

    #[must_use]
    pub fn new(marshaller: Marshaller) -> Self {
        Self {
            state: ObservableState::new(marshaller),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> &ObservableState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            edit_text: Self::EDIT_TEXT.get(self),
            label_text: Self::LABEL_TEXT.get(self),
            button_enabled: Self::BUTTON_ENABLED.get(self),
            is_checked: Self::IS_CHECKED.get(self),
            checked: Self::RADIOS.map(|p| p.get(self)),
        }
    }
}

impl Observable for MainModel {
    fn observable_state(&self) -> Option<&ObservableState> {
        Some(&self.state)
    }
}

/// Point-in-time copy of every [`MainModel`] property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSnapshot {
    pub edit_text: String,
    pub label_text: String,
    pub button_enabled: bool,
    pub is_checked: bool,
    pub checked: [bool; 3],
}
