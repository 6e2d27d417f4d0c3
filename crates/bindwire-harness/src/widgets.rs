#![forbid(unsafe_code)]

//! Reference controls: widget base, label, line edit, progress bar, dialog
//! and table.
//!
//! Each control embeds the component of its parent type, mirroring a
//! toolkit's class hierarchy. Setters emit the control's change channel when
//! the value actually changes, programmatic or not, so the binding layer has
//! to block signals around its own writes exactly as it would with a real
//! toolkit.
//!
//! Every setter call is counted by the embedded [`Widget`]; tests use
//! [`Widget::write_count`] to prove that a binding did or did not touch a
//! control.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bindwire_core::{ChangeSignals, Control, ControlType};

use crate::types::{
    DIALOG, FINISHED, ITEM_CHANGED, LABEL, LINE_EDIT, PROGRESS_BAR, TABLE_WIDGET, TEXT_CHANGED,
    VALUE_CHANGED, WIDGET,
};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store `value` and report whether it differed from the previous one.
pub(crate) fn replace<T: PartialEq>(slot: &Mutex<T>, value: T) -> bool {
    let mut current = lock(slot);
    if *current == value {
        return false;
    }
    *current = value;
    true
}

/// Implements [`Control`] for a control embedding a [`Widget`].
///
/// `widget = a.b` is the path to the embedded widget; each `TYPE => a.b`
/// pair maps an ancestor type to the embedded component implementing it.
macro_rules! impl_control {
    ($name:ident, $kind:ident, widget = $($w:ident).+ $(, $anc:ident => $($f:ident).+)* $(,)?) => {
        impl bindwire_core::Control for $name {
            fn control_type(&self) -> &'static bindwire_core::ControlType {
                &$kind
            }

            fn component(
                &self,
                ty: &'static bindwire_core::ControlType,
            ) -> Option<&dyn std::any::Any> {
                if *ty == $kind {
                    return Some(self as &dyn std::any::Any);
                }
                $(
                    if *ty == $anc {
                        return Some(&self.$($f).+ as &dyn std::any::Any);
                    }
                )*
                if *ty == $crate::types::WIDGET {
                    return Some(&self.$($w).+ as &dyn std::any::Any);
                }
                None
            }

            fn signals(&self) -> &bindwire_core::ChangeSignals {
                self.$($w).+.signals()
            }
        }
    };
}

pub(crate) use impl_control;

// ============================================================================
// Widget
// ============================================================================

/// Base component of every control: visibility, enablement and signals.
#[derive(Debug)]
pub struct Widget {
    visible: Mutex<bool>,
    enabled: Mutex<bool>,
    signals: ChangeSignals,
    writes: AtomicUsize,
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            visible: Mutex::new(true),
            enabled: Mutex::new(true),
            signals: ChangeSignals::new(),
            writes: AtomicUsize::new(0),
        }
    }
}

impl Widget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        *lock(&self.visible)
    }

    pub fn set_visible(&self, visible: bool) {
        self.record_write();
        *lock(&self.visible) = visible;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *lock(&self.enabled)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.record_write();
        *lock(&self.enabled) = enabled;
    }

    #[must_use]
    pub fn signals(&self) -> &ChangeSignals {
        &self.signals
    }

    /// Number of setter calls on this control so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Control for Widget {
    fn control_type(&self) -> &'static ControlType {
        &WIDGET
    }

    fn component(&self, ty: &'static ControlType) -> Option<&dyn Any> {
        (*ty == WIDGET).then_some(self as &dyn Any)
    }

    fn signals(&self) -> &ChangeSignals {
        &self.signals
    }
}

// ============================================================================
// Label
// ============================================================================

/// Read-only text display. Has no change channel.
#[derive(Debug, Default)]
pub struct Label {
    pub widget: Widget,
    text: Mutex<String>,
}

impl Label {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }

    pub fn set_text(&self, text: String) {
        self.widget.record_write();
        *lock(&self.text) = text;
    }
}

impl_control!(Label, LABEL, widget = widget);

// ============================================================================
// LineEdit
// ============================================================================

/// Single-line text input. Emits `text_changed`.
#[derive(Debug, Default)]
pub struct LineEdit {
    pub widget: Widget,
    text: Mutex<String>,
}

impl LineEdit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }

    pub fn set_text(&self, text: String) {
        self.widget.record_write();
        if replace(&self.text, text) {
            self.widget.signals().emit(TEXT_CHANGED);
        }
    }

    /// Simulate the user typing `text` over the current contents.
    pub fn type_text(&self, text: impl Into<String>) {
        if replace(&self.text, text.into()) {
            self.widget.signals().emit(TEXT_CHANGED);
        }
    }
}

impl_control!(LineEdit, LINE_EDIT, widget = widget);

// ============================================================================
// ProgressBar
// ============================================================================

/// Progress indicator over `0..=maximum`. Emits `value_changed`.
#[derive(Debug)]
pub struct ProgressBar {
    pub widget: Widget,
    value: Mutex<i32>,
    maximum: Mutex<i32>,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            widget: Widget::default(),
            value: Mutex::new(0),
            maximum: Mutex::new(100),
        }
    }
}

impl ProgressBar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self) -> i32 {
        *lock(&self.value)
    }

    /// Set the value, clamped to `0..=maximum`.
    pub fn set_value(&self, value: i32) {
        self.widget.record_write();
        let clamped = value.clamp(0, self.maximum().max(0));
        if replace(&self.value, clamped) {
            self.widget.signals().emit(VALUE_CHANGED);
        }
    }

    #[must_use]
    pub fn maximum(&self) -> i32 {
        *lock(&self.maximum)
    }

    /// Set the maximum; the value is clamped into the new range.
    pub fn set_maximum(&self, maximum: i32) {
        self.widget.record_write();
        let maximum = maximum.max(0);
        *lock(&self.maximum) = maximum;
        let over = self.value() > maximum;
        if over && replace(&self.value, maximum) {
            self.widget.signals().emit(VALUE_CHANGED);
        }
    }
}

impl_control!(ProgressBar, PROGRESS_BAR, widget = widget);

// ============================================================================
// Dialog
// ============================================================================

/// Modal dialog result holder. Emits `finished` when closed with [`Dialog::done`].
#[derive(Debug, Default)]
pub struct Dialog {
    pub widget: Widget,
    result: Mutex<i32>,
}

impl Dialog {
    pub const REJECTED: i32 = 0;
    pub const ACCEPTED: i32 = 1;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn result(&self) -> i32 {
        *lock(&self.result)
    }

    /// Set the result code without closing the dialog.
    pub fn set_result(&self, result: i32) {
        self.widget.record_write();
        *lock(&self.result) = result;
    }

    /// Close the dialog with `result`, hiding it and emitting `finished`.
    pub fn done(&self, result: i32) {
        *lock(&self.result) = result;
        *lock(&self.widget.visible) = false;
        self.widget.signals().emit(FINISHED);
    }

    pub fn accept(&self) {
        self.done(Self::ACCEPTED);
    }

    pub fn reject(&self) {
        self.done(Self::REJECTED);
    }
}

impl_control!(Dialog, DIALOG, widget = widget);

// ============================================================================
// TableWidget
// ============================================================================

/// Grid of text cells. Emits `item_changed` when a cell is edited.
#[derive(Debug, Default)]
pub struct TableWidget {
    pub widget: Widget,
    rows: Mutex<Vec<Vec<String>>>,
}

impl TableWidget {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All cell texts, row-major.
    #[must_use]
    pub fn text_items(&self) -> Vec<Vec<String>> {
        lock(&self.rows).clone()
    }

    /// Replace the whole table. Does not emit `item_changed`.
    pub fn set_data(&self, rows: Vec<Vec<String>>) {
        self.widget.record_write();
        *lock(&self.rows) = rows;
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        lock(&self.rows).len()
    }

    /// Simulate the user editing one cell. Returns false if the cell does
    /// not exist.
    pub fn edit_item(&self, row: usize, column: usize, text: impl Into<String>) -> bool {
        let changed = {
            let mut rows = lock(&self.rows);
            match rows.get_mut(row).and_then(|r| r.get_mut(column)) {
                Some(cell) => {
                    let text = text.into();
                    let changed = *cell != text;
                    *cell = text;
                    changed
                }
                None => return false,
            }
        };
        if changed {
            self.widget.signals().emit(ITEM_CHANGED);
        }
        true
    }
}

impl_control!(TableWidget, TABLE_WIDGET, widget = widget);

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn count_emits(signals: &ChangeSignals, channel: bindwire_core::ChannelId) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        signals.connect(channel, move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn widget_defaults_visible_and_enabled() {
        let widget = Widget::new();
        assert!(widget.is_visible());
        assert!(widget.is_enabled());
        assert_eq!(widget.write_count(), 0);
    }

    #[test]
    fn line_edit_emits_only_on_change() {
        let edit = LineEdit::new();
        let emitted = count_emits(edit.signals(), TEXT_CHANGED);
        edit.set_text("a".into());
        edit.set_text("a".into());
        edit.type_text("b");
        assert_eq!(emitted.load(Ordering::SeqCst), 2);
        assert_eq!(edit.widget.write_count(), 2, "typing is not a programmatic write");
    }

    #[test]
    fn blocked_line_edit_write_is_silent() {
        let edit = LineEdit::new();
        let emitted = count_emits(edit.signals(), TEXT_CHANGED);
        {
            let _blocked = edit.signals().block();
            edit.set_text("quiet".into());
        }
        assert_eq!(edit.text(), "quiet");
        assert_eq!(emitted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn slot_can_read_control_during_emit() {
        let edit = Arc::new(LineEdit::new());
        let seen = Arc::new(Mutex::new(String::new()));
        let (e, s) = (Arc::downgrade(&edit), Arc::clone(&seen));
        edit.signals().connect(TEXT_CHANGED, move || {
            if let Some(edit) = e.upgrade() {
                *s.lock().unwrap() = edit.text();
            }
        });
        edit.type_text("live");
        assert_eq!(*seen.lock().unwrap(), "live");
    }

    #[test]
    fn label_component_chain() {
        let label = Label::new();
        assert!(label.component(&LABEL).is_some());
        assert!(label.component(&WIDGET).is_some());
        assert!(label.component(&LINE_EDIT).is_none());
        assert!(
            label
                .component(&WIDGET)
                .and_then(|c| c.downcast_ref::<Widget>())
                .is_some()
        );
    }

    #[test]
    fn progress_bar_clamps_and_emits() {
        let bar = ProgressBar::new();
        let emitted = count_emits(bar.signals(), VALUE_CHANGED);
        bar.set_value(150);
        assert_eq!(bar.value(), 100);
        bar.set_maximum(50);
        assert_eq!(bar.value(), 50);
        bar.set_value(-3);
        assert_eq!(bar.value(), 0);
        assert_eq!(emitted.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dialog_done_hides_and_emits() {
        let dialog = Dialog::new();
        let finished = count_emits(dialog.signals(), FINISHED);
        dialog.set_result(Dialog::ACCEPTED);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        dialog.reject();
        assert_eq!(dialog.result(), Dialog::REJECTED);
        assert!(!dialog.widget.is_visible());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn table_edit_item_bounds() {
        let table = TableWidget::new();
        let changed = count_emits(table.signals(), ITEM_CHANGED);
        table.set_data(vec![vec!["a".into(), "b".into()]]);
        assert_eq!(table.row_count(), 1);
        assert!(table.edit_item(0, 1, "c"));
        assert!(!table.edit_item(3, 0, "x"));
        assert_eq!(table.text_items(), vec![vec!["a".to_string(), "c".to_string()]]);
        assert_eq!(changed.load(Ordering::SeqCst), 1);
    }
}
