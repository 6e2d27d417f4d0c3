#![forbid(unsafe_code)]

//! The demo form: a line edit, a label, a check box, a push button and an
//! exclusive group of three radio buttons.

use std::sync::Arc;

use bindwire_core::{BindError, Control, ControlAccessor};
use bindwire_harness::types::CLICKED;
use bindwire_harness::{CheckBox, Dialog, Label, LineEdit, PushButton, RadioButton, RadioGroup};
use bindwire_runtime::BindingCoordinator;

use crate::controller::MainController;
use crate::model::MainModel;

/// Text seeded into the edit and the label.
pub const INITIAL_TEXT: &str = "Enter text here...";

/// Initial checked state of the three radio buttons.
pub const INITIAL_RADIOS: [bool; 3] = [false, false, true];

#[derive(Debug)]
pub struct MainView {
    title: String,
    pub dialog: Arc<Dialog>,
    pub line_edit: Arc<LineEdit>,
    pub label: Arc<Label>,
    pub check_box: Arc<CheckBox>,
    pub push_button: Arc<PushButton>,
    pub radios: RadioGroup,
}

impl MainView {
    #[must_use]
    pub fn new() -> Self {
        let buttons = (0..3)
            .map(|i| Arc::new(RadioButton::new(format!("Radio {i}"))))
            .collect();
        Self {
            title: "My Form".to_owned(),
            dialog: Arc::new(Dialog::new()),
            line_edit: Arc::new(LineEdit::new()),
            label: Arc::new(Label::new()),
            check_box: Arc::new(CheckBox::new("This is a checkbox")),
            push_button: Arc::new(PushButton::new("Disable me")),
            radios: RadioGroup::new(buttons),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Bind every control to its model property and seed initial values.
    ///
    /// Must run before the controller registers its callbacks so that view
    /// bindings are notified first.
    pub fn bind_to_model(&self, binder: &BindingCoordinator<MainModel>) -> Result<(), BindError> {
        binder.bind_two_way(
            ControlAccessor::of(&self.line_edit, "text"),
            MainModel::EDIT_TEXT,
            Some(INITIAL_TEXT.to_owned()),
        )?;
        binder.bind_one_way(
            MainModel::LABEL_TEXT,
            ControlAccessor::of(&self.label, "text"),
            Some(INITIAL_TEXT.to_owned()),
        )?;
        binder.bind_two_way(
            ControlAccessor::of(&self.check_box, "is_checked"),
            MainModel::IS_CHECKED,
            Some(false),
        )?;
        binder.bind_one_way(
            MainModel::BUTTON_ENABLED,
            ControlAccessor::of(&self.push_button, "is_enabled"),
            None,
        )?;
        for ((button, property), initial) in self
            .radios
            .buttons()
            .iter()
            .zip(MainModel::RADIOS)
            .zip(INITIAL_RADIOS)
        {
            binder.bind_two_way(
                ControlAccessor::of(button, "is_checked"),
                property,
                Some(initial),
            )?;
        }
        Ok(())
    }

    /// Wire commands that do not originate from the model.
    pub fn bind_to_controller(&self, controller: &MainController) {
        let controller = controller.clone();
        self.push_button
            .signals()
            .connect(CLICKED, move || controller.disable_button());
    }
}

impl Default for MainView {
    fn default() -> Self {
        Self::new()
    }
}
