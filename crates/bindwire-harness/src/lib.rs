#![forbid(unsafe_code)]

//! Harness: reference controls for Bindwire.
//!
//! # Role in Bindwire
//! The binding engine never talks to a real toolkit. `bindwire-harness`
//! provides a small, headless widget set that behaves the way toolkit
//! controls do (type hierarchy, change channels that fire on every change,
//! programmatic or user-driven) together with the accessor table that
//! registers them.
//!
//! Tests and the demo use these controls to drive bindings exactly as a UI
//! would: [`LineEdit::type_text`], [`AbstractButton::click`],
//! [`RadioGroup::select`], [`Dialog::done`] and [`TableWidget::edit_item`]
//! simulate user input.

pub mod buttons;
pub mod registry;
pub mod types;
pub mod widgets;

pub use buttons::{AbstractButton, CheckBox, PushButton, RadioButton, RadioGroup};
pub use registry::{build_standard_registry, register_standard, standard_registry};
pub use widgets::{Dialog, Label, LineEdit, ProgressBar, TableWidget, Widget};
