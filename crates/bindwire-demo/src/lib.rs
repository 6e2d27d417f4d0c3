#![forbid(unsafe_code)]

//! Bindwire demo: a small model/view/controller form.
//!
//! [`DemoApp::assemble`] wires the three parts in the order that keeps the
//! view and the model consistent:
//!
//! 1. view and model (bindings, with initial values seeded),
//! 2. controller and model (controller callbacks),
//! 3. view and controller (commands such as the push button).
//!
//! View bindings are therefore notified before controller callbacks, and a
//! controller reacting to a change always sees the control already updated.

pub mod cli;
pub mod controller;
pub mod model;
pub mod view;

use std::sync::Arc;

use bindwire_core::{BindError, ControlAdapterRegistry};
use bindwire_runtime::{BindingCoordinator, Marshaller};
use tracing::debug;

pub use controller::{MainController, RadioSelection};
pub use model::{MainModel, ModelSnapshot};
pub use view::MainView;

/// The assembled form.
#[derive(Debug)]
pub struct DemoApp {
    pub model: Arc<MainModel>,
    pub view: MainView,
    pub controller: MainController,
}

impl DemoApp {
    /// Build the model, view and controller and bind them together.
    ///
    /// Must run on the UI thread when `marshaller` is attached, since initial
    /// values are written to the controls synchronously.
    pub fn assemble(
        marshaller: Marshaller,
        registry: Arc<ControlAdapterRegistry>,
    ) -> Result<Self, BindError> {
        let model = Arc::new(MainModel::new(marshaller.clone()));
        let view = MainView::new();
        let binder = BindingCoordinator::new(Arc::clone(&model), registry, marshaller);
        view.bind_to_model(&binder)?;

        let controller = MainController::new(Arc::clone(&model));
        controller.add_callbacks();
        view.bind_to_controller(&controller);

        debug!(title = view.title(), "Demo form assembled");
        Ok(Self {
            model,
            view,
            controller,
        })
    }
}
