#![forbid(unsafe_code)]

//! Button family: the shared checkable-button component and its concrete
//! controls.
//!
//! `is_checked` / `set_checked` are declared once, on [`AbstractButton`].
//! Check boxes, radio buttons and push buttons only embed it, so a single
//! registry entry serves all three.

use std::sync::{Arc, Mutex};

use crate::types::{ABSTRACT_BUTTON, CHECK_BOX, CLICKED, PUSH_BUTTON, RADIO_BUTTON, TOGGLED};
use crate::widgets::{Widget, impl_control, lock, replace};

/// State shared by every button: checkability and checked state.
#[derive(Debug, Default)]
pub struct AbstractButton {
    pub widget: Widget,
    checkable: bool,
    checked: Mutex<bool>,
}

impl AbstractButton {
    fn with_checkable(checkable: bool) -> Self {
        Self {
            checkable,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_checkable(&self) -> bool {
        self.checkable
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        *lock(&self.checked)
    }

    /// Set the checked state. Emits `toggled` when it changes. Ignored on
    /// non-checkable buttons.
    pub fn set_checked(&self, checked: bool) {
        self.widget.record_write();
        if self.checkable && replace(&self.checked, checked) {
            self.widget.signals().emit(TOGGLED);
        }
    }

    /// Simulate a click: toggles checkable buttons, then emits `clicked`.
    /// Disabled buttons ignore clicks.
    pub fn click(&self) {
        if !self.widget.is_enabled() {
            return;
        }
        if self.checkable {
            let next = !self.is_checked();
            if replace(&self.checked, next) {
                self.widget.signals().emit(TOGGLED);
            }
        }
        self.widget.signals().emit(CLICKED);
    }

    /// Radio-style click: checks, never unchecks.
    fn click_to_checked(&self) {
        if replace(&self.checked, true) {
            self.widget.signals().emit(TOGGLED);
        }
        self.widget.signals().emit(CLICKED);
    }
}

impl_control!(AbstractButton, ABSTRACT_BUTTON, widget = widget);

/// Two-state check box.
#[derive(Debug)]
pub struct CheckBox {
    pub button: AbstractButton,
    label: String,
}

impl CheckBox {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            button: AbstractButton::with_checkable(true),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl_control!(CheckBox, CHECK_BOX, widget = button.widget, ABSTRACT_BUTTON => button);

/// Radio button. Clicking never unchecks it; exclusivity comes from a
/// [`RadioGroup`].
#[derive(Debug)]
pub struct RadioButton {
    pub button: AbstractButton,
    label: String,
}

impl RadioButton {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            button: AbstractButton::with_checkable(true),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl_control!(RadioButton, RADIO_BUTTON, widget = button.widget, ABSTRACT_BUTTON => button);

/// Plain push button. Not checkable; emits `clicked`.
#[derive(Debug)]
pub struct PushButton {
    pub button: AbstractButton,
    label: String,
}

impl PushButton {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            button: AbstractButton::with_checkable(false),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn click(&self) {
        self.button.click();
    }
}

impl_control!(PushButton, PUSH_BUTTON, widget = button.widget, ABSTRACT_BUTTON => button);

/// Exclusive set of radio buttons.
///
/// Selecting a button first unchecks the previously checked one, then checks
/// the new one, so listeners briefly observe a state with nothing selected.
#[derive(Debug, Default)]
pub struct RadioGroup {
    buttons: Vec<Arc<RadioButton>>,
}

impl RadioGroup {
    #[must_use]
    pub fn new(buttons: Vec<Arc<RadioButton>>) -> Self {
        Self { buttons }
    }

    #[must_use]
    pub fn buttons(&self) -> &[Arc<RadioButton>] {
        &self.buttons
    }

    /// Index of the checked button, if any.
    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.buttons.iter().position(|b| b.button.is_checked())
    }

    /// Simulate the user clicking button `index`. Returns false when out of
    /// range or disabled.
    pub fn select(&self, index: usize) -> bool {
        let Some(target) = self.buttons.get(index) else {
            return false;
        };
        if !target.button.widget.is_enabled() {
            return false;
        }
        for (i, other) in self.buttons.iter().enumerate() {
            if i != index && replace(&other.button.checked, false) {
                other.button.widget.signals().emit(TOGGLED);
            }
        }
        target.button.click_to_checked();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindwire_core::{ChannelId, Control};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn count_emits(control: &dyn Control, channel: ChannelId) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        control.signals().connect(channel, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn check_box_click_toggles() {
        let check = CheckBox::new("Remember me");
        let toggled = count_emits(&check, TOGGLED);
        let clicked = count_emits(&check, CLICKED);
        check.button.click();
        assert!(check.button.is_checked());
        check.button.click();
        assert!(!check.button.is_checked());
        assert_eq!(toggled.load(Ordering::SeqCst), 2);
        assert_eq!(clicked.load(Ordering::SeqCst), 2);
        assert_eq!(check.label(), "Remember me");
    }

    #[test]
    fn push_button_is_not_checkable() {
        let push = PushButton::new("Go");
        let toggled = count_emits(&push, TOGGLED);
        let clicked = count_emits(&push, CLICKED);
        push.button.set_checked(true);
        push.click();
        assert!(!push.button.is_checked());
        assert_eq!(toggled.load(Ordering::SeqCst), 0);
        assert_eq!(clicked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disabled_button_ignores_click() {
        let push = PushButton::new("Go");
        let clicked = count_emits(&push, CLICKED);
        push.button.widget.set_enabled(false);
        push.click();
        assert_eq!(clicked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn button_components_resolve_to_embedded_parts() {
        let radio = RadioButton::new("A");
        assert!(
            radio
                .component(&ABSTRACT_BUTTON)
                .and_then(|c| c.downcast_ref::<AbstractButton>())
                .is_some()
        );
        assert!(
            radio
                .component(&crate::types::WIDGET)
                .and_then(|c| c.downcast_ref::<Widget>())
                .is_some()
        );
        assert!(radio.component(&CHECK_BOX).is_none());
    }

    #[test]
    fn radio_group_unchecks_before_checking() {
        let buttons: Vec<_> = (0..3)
            .map(|i| Arc::new(RadioButton::new(format!("Radio {i}"))))
            .collect();
        let group = RadioGroup::new(buttons.clone());
        let log = Arc::new(Mutex::new(Vec::new()));
        for (i, b) in buttons.iter().enumerate() {
            let (l, weak) = (Arc::clone(&log), Arc::downgrade(b));
            b.signals().connect(TOGGLED, move || {
                if let Some(b) = weak.upgrade() {
                    l.lock().unwrap().push((i, b.button.is_checked()));
                }
            });
        }

        assert!(group.select(2));
        assert!(group.select(0));
        assert_eq!(group.selected(), Some(0));
        assert_eq!(
            *log.lock().unwrap(),
            vec![(2, true), (2, false), (0, true)]
        );
        assert!(!group.select(7));
    }

    #[test]
    fn reselecting_checked_radio_only_clicks() {
        let buttons = vec![Arc::new(RadioButton::new("only"))];
        let group = RadioGroup::new(buttons.clone());
        let toggled = count_emits(buttons[0].as_ref(), TOGGLED);
        group.select(0);
        group.select(0);
        assert_eq!(toggled.load(Ordering::SeqCst), 1);
    }
}
