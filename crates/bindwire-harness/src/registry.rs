#![forbid(unsafe_code)]

//! The standard accessor table for the reference controls.
//!
//! | Read accessor | Write accessor | Change channel |
//! |---------------|----------------|----------------|
//! | `Widget.is_visible` | `set_visible` | none |
//! | `Widget.is_enabled` | `set_enabled` | none |
//! | `Label.text` | `set_text` | none |
//! | `LineEdit.text` | `set_text` | `text_changed` |
//! | `AbstractButton.is_checked` | `set_checked` | `toggled` |
//! | `ProgressBar.value` | `set_value` | `value_changed` |
//! | `ProgressBar.maximum` | `set_maximum` | none |
//! | `Dialog.result` | `set_result` | `finished` |
//! | `TableWidget.text_items` | `set_data` | `item_changed` |

use std::sync::{Arc, OnceLock};

use bindwire_core::{BindError, ControlAccessorEntry, ControlAdapterRegistry, RegistryBuilder};

use crate::buttons::AbstractButton;
use crate::types::{
    ABSTRACT_BUTTON, DIALOG, FINISHED, ITEM_CHANGED, LABEL, LINE_EDIT, PROGRESS_BAR,
    TABLE_WIDGET, TEXT_CHANGED, TOGGLED, VALUE_CHANGED, WIDGET,
};
use crate::widgets::{Dialog, Label, LineEdit, ProgressBar, TableWidget, Widget};

/// Add the standard entries to `builder`.
pub fn register_standard(builder: &mut RegistryBuilder) -> Result<(), BindError> {
    builder
        .register(ControlAccessorEntry::new(
            &WIDGET,
            "is_visible",
            Widget::is_visible,
            "set_visible",
            Widget::set_visible,
        ))?
        .register(ControlAccessorEntry::new(
            &WIDGET,
            "is_enabled",
            Widget::is_enabled,
            "set_enabled",
            Widget::set_enabled,
        ))?
        .register(ControlAccessorEntry::new(
            &LABEL,
            "text",
            Label::text,
            "set_text",
            Label::set_text,
        ))?
        .register(
            ControlAccessorEntry::new(
                &LINE_EDIT,
                "text",
                LineEdit::text,
                "set_text",
                LineEdit::set_text,
            )
            .with_change_channel(TEXT_CHANGED),
        )?
        .register(
            ControlAccessorEntry::new(
                &ABSTRACT_BUTTON,
                "is_checked",
                AbstractButton::is_checked,
                "set_checked",
                AbstractButton::set_checked,
            )
            .with_change_channel(TOGGLED),
        )?
        .register(
            ControlAccessorEntry::new(
                &PROGRESS_BAR,
                "value",
                ProgressBar::value,
                "set_value",
                ProgressBar::set_value,
            )
            .with_change_channel(VALUE_CHANGED),
        )?
        .register(ControlAccessorEntry::new(
            &PROGRESS_BAR,
            "maximum",
            ProgressBar::maximum,
            "set_maximum",
            ProgressBar::set_maximum,
        ))?
        .register(
            ControlAccessorEntry::new(
                &DIALOG,
                "result",
                Dialog::result,
                "set_result",
                Dialog::set_result,
            )
            .with_change_channel(FINISHED),
        )?
        .register(
            ControlAccessorEntry::new(
                &TABLE_WIDGET,
                "text_items",
                TableWidget::text_items,
                "set_data",
                TableWidget::set_data,
            )
            .with_change_channel(ITEM_CHANGED),
        )?;
    Ok(())
}

/// A fresh registry holding only the standard entries.
pub fn build_standard_registry() -> Result<ControlAdapterRegistry, BindError> {
    let mut builder = ControlAdapterRegistry::builder();
    register_standard(&mut builder)?;
    Ok(builder.build())
}

/// Process-wide shared standard registry.
///
/// # Panics
///
/// Panics if the standard table itself is inconsistent (a duplicate entry),
/// which is a bug in this crate rather than a runtime condition.
pub fn standard_registry() -> Arc<ControlAdapterRegistry> {
    static REGISTRY: OnceLock<Arc<ControlAdapterRegistry>> = OnceLock::new();
    REGISTRY
        .get_or_init(|| {
            Arc::new(build_standard_registry().expect("standard accessor table has duplicates"))
        })
        .clone()
}
