#![forbid(unsafe_code)]

//! Controller: application logic reacting to model changes.
//!
//! Callbacks registered here are plain (no `UI_THREAD` flag); they run on
//! whichever thread changed the model. View bindings registered before them
//! see the new value first, so the controller always reads current state.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use bindwire_runtime::CallbackFlags;
use tracing::info;

use crate::model::MainModel;

/// What the radio callback saw when it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioSelection {
    /// 1-based index of the checked radio property.
    Selected(u8),
    /// No radio property was set; an exclusive switch was in flight.
    MidSelection,
}

/// Reacts to the model and issues commands on it.
#[derive(Debug, Clone)]
pub struct MainController {
    model: Arc<MainModel>,
    selections: Arc<Mutex<Vec<RadioSelection>>>,
}

impl MainController {
    #[must_use]
    pub fn new(model: Arc<MainModel>) -> Self {
        Self {
            model,
            selections: Arc::default(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &Arc<MainModel> {
        &self.model
    }

    /// Register the controller's model callbacks.
    ///
    /// Selecting a different radio first clears the old property and then
    /// sets the new one, so the radio callback also fires once with nothing
    /// selected.
    pub fn add_callbacks(&self) {
        let state = self.model.state();
        let model = Arc::downgrade(&self.model);
        state.add_callback(
            MainModel::EDIT_TEXT.name(),
            move || {
                if let Some(model) = model.upgrade() {
                    Self::set_label(&model);
                }
            },
            CallbackFlags::empty(),
        );

        for radio in MainModel::RADIOS {
            let model = Arc::downgrade(&self.model);
            let selections = Arc::clone(&self.selections);
            state.add_callback(
                radio.name(),
                move || Self::record_selected_radio(&model, &selections),
                CallbackFlags::empty(),
            );
        }
    }

    fn set_label(model: &MainModel) {
        MainModel::LABEL_TEXT.set(model, MainModel::EDIT_TEXT.get(model));
    }

    /// Command bound to the push button.
    pub fn disable_button(&self) {
        MainModel::BUTTON_ENABLED.set(&self.model, false);
    }

    fn record_selected_radio(model: &Weak<MainModel>, selections: &Mutex<Vec<RadioSelection>>) {
        let Some(model) = model.upgrade() else {
            return;
        };
        let selection = MainModel::RADIOS
            .iter()
            .position(|p| p.get(&model))
            .map_or(RadioSelection::MidSelection, |i| {
                RadioSelection::Selected(i as u8 + 1)
            });
        match selection {
            RadioSelection::Selected(n) => info!(radio = n, "Radio selected"),
            RadioSelection::MidSelection => info!("Radio callback fired mid-selection"),
        }
        selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(selection);
    }

    /// Every radio callback observation so far, oldest first.
    #[must_use]
    pub fn selections(&self) -> Vec<RadioSelection> {
        self.selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
