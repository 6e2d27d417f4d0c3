#![forbid(unsafe_code)]

//! Binding coordinator: wires control accessors to model properties.
//!
//! # Directions
//!
//! - **Model to view**: a view-binding callback on the property pushes the
//!   new value into the control through the marshaller, with the control's
//!   change signals blocked during the write.
//! - **View to model**: a slot on the control's change channel reads the
//!   control and assigns the property, with the property's view bindings
//!   suppressed so the value does not bounce back into the control.
//! - **Both**: the two combined. Echo-free in both directions.
//!
//! # Invariants
//!
//! 1. Every configuration error is detected before anything is wired; a
//!    failed `bind_*` call leaves the model and the control untouched.
//! 2. Initial-value seeding fires no callbacks at all: the control is written
//!    with its signals blocked and the model is assigned silently.
//! 3. Bindings hold only weak references to the model and the control, so
//!    dropping either disables the binding instead of leaking it.
//! 4. Model-to-view callbacks run in registration order relative to every
//!    other callback on the same property.

use std::fmt;
use std::sync::{Arc, Weak};

use bindwire_core::{BindError, Control, ControlAccessor, ControlAdapterRegistry};
use tracing::{debug, warn};

use super::observable::{CallbackFlags, Observable, short_type_name};
use super::property::Property;
use crate::ui_thread::Marshaller;

/// Which side drives a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ModelToView,
    ViewToModel,
    Both,
}

impl Direction {
    /// Model changes reach the control.
    #[must_use]
    pub const fn model_drives(self) -> bool {
        matches!(self, Self::ModelToView | Self::Both)
    }

    /// Control changes reach the model. Requires a change channel.
    #[must_use]
    pub const fn view_drives(self) -> bool {
        matches!(self, Self::ViewToModel | Self::Both)
    }
}

/// One side of a binding call: a control accessor or a model property.
pub enum BindArg<M, V> {
    Control(ControlAccessor),
    Property(Property<M, V>),
}

impl<M, V> BindArg<M, V> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Control(_) => "a control accessor",
            Self::Property(_) => "a property",
        }
    }
}

impl<M, V> From<ControlAccessor> for BindArg<M, V> {
    fn from(accessor: ControlAccessor) -> Self {
        Self::Control(accessor)
    }
}

impl<M, V> From<Property<M, V>> for BindArg<M, V> {
    fn from(property: Property<M, V>) -> Self {
        Self::Property(property)
    }
}

impl<M, V> fmt::Debug for BindArg<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control(accessor) => f.debug_tuple("Control").field(accessor).finish(),
            Self::Property(property) => f.debug_tuple("Property").field(property).finish(),
        }
    }
}

/// Split an argument pair into its control and property halves.
///
/// The returned flag is true when the property came first.
fn classify<M, V>(
    first: BindArg<M, V>,
    second: BindArg<M, V>,
) -> Result<(ControlAccessor, Property<M, V>, bool), BindError> {
    match (first, second) {
        (BindArg::Control(control), BindArg::Property(property)) => Ok((control, property, false)),
        (BindArg::Property(property), BindArg::Control(control)) => Ok((control, property, true)),
        (first, second) => Err(BindError::AmbiguousBindingArguments {
            first: first.kind(),
            second: second.kind(),
        }),
    }
}

/// Creates bindings between one model and any number of controls.
pub struct BindingCoordinator<M> {
    model: Arc<M>,
    registry: Arc<ControlAdapterRegistry>,
    marshaller: Marshaller,
}

impl<M> Clone for BindingCoordinator<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            registry: Arc::clone(&self.registry),
            marshaller: self.marshaller.clone(),
        }
    }
}

impl<M: Observable> BindingCoordinator<M> {
    pub fn new(
        model: Arc<M>,
        registry: Arc<ControlAdapterRegistry>,
        marshaller: Marshaller,
    ) -> Self {
        Self {
            model,
            registry,
            marshaller,
        }
    }

    #[must_use]
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ControlAdapterRegistry> {
        &self.registry
    }

    /// Keep a control and a property in sync in both directions.
    ///
    /// The arguments may be given in either order.
    pub fn bind_two_way<V>(
        &self,
        a: impl Into<BindArg<M, V>>,
        b: impl Into<BindArg<M, V>>,
        initial: Option<V>,
    ) -> Result<(), BindError>
    where
        V: Clone + Send + 'static,
    {
        let (control, property, _) = classify(a.into(), b.into())?;
        self.bind(control, property, Direction::Both, initial)
    }

    /// Propagate changes from `source` to `sink` only.
    pub fn bind_one_way<V>(
        &self,
        source: impl Into<BindArg<M, V>>,
        sink: impl Into<BindArg<M, V>>,
        initial: Option<V>,
    ) -> Result<(), BindError>
    where
        V: Clone + Send + 'static,
    {
        let (control, property, property_is_source) = classify(source.into(), sink.into())?;
        let direction = if property_is_source {
            Direction::ModelToView
        } else {
            Direction::ViewToModel
        };
        self.bind(control, property, direction, initial)
    }

    /// Bind `control` to `property` in `direction`.
    pub fn bind<V>(
        &self,
        control: ControlAccessor,
        property: Property<M, V>,
        direction: Direction,
        initial: Option<V>,
    ) -> Result<(), BindError>
    where
        V: Clone + Send + 'static,
    {
        let model_name = short_type_name::<M>();
        let state = self
            .model
            .observable_state()
            .ok_or(BindError::MissingObservableState { model: model_name })?;
        let entry = self
            .registry
            .resolve(control.control().as_ref(), control.name())?;
        let accessors = entry.accessors::<V>()?;
        let channel = match (direction.view_drives(), entry.change_channel()) {
            (true, None) => {
                return Err(BindError::MissingChangeChannel {
                    control_type: control.control_type().name(),
                    accessor: entry.read(),
                    model: model_name,
                    property: property.name(),
                });
            }
            (true, Some(channel)) => Some(channel),
            (false, _) => None,
        };

        let weak_control: Weak<dyn Control> = Arc::downgrade(control.control());

        if let Some(value) = initial {
            property.set_silently(&self.model, value.clone());
            let (target, seed) = (weak_control.clone(), accessors.clone());
            let seeded = self.marshaller.execute(
                move || {
                    if let Some(control) = target.upgrade() {
                        let _blocked = control.signals().block();
                        seed.write(control.as_ref(), value);
                    }
                },
                true,
            );
            if let Err(err) = seeded {
                warn!(property = property.name(), error = %err, "Initial value did not reach the control");
            }
        }

        if direction.model_drives() {
            let model = Arc::downgrade(&self.model);
            let updater = self.marshaller.wrap_for_repeated_ui_update(
                weak_control.clone(),
                accessors.clone(),
                move || model.upgrade().map(|m| property.get(&m)),
            );
            state.add_callback(property.name(), move || updater(), CallbackFlags::VIEW_BINDING);
        }

        if let Some(channel) = channel {
            let model = Arc::downgrade(&self.model);
            let source = weak_control;
            control.control().signals().connect(channel, move || {
                let (Some(model), Some(control)) = (model.upgrade(), source.upgrade()) else {
                    return;
                };
                let Some(value) = accessors.read(control.as_ref()) else {
                    warn!(
                        control_type = control.control_type().name(),
                        property = property.name(),
                        "Control value could not be read"
                    );
                    return;
                };
                match model.observable_state() {
                    Some(state) => {
                        let _suppressed = state.suppress_view_bindings(property.name());
                        property.set(&model, value);
                    }
                    None => property.set(&model, value),
                }
            });
        }

        debug!(
            control_type = control.control_type().name(),
            accessor = %entry.read(),
            model = model_name,
            property = property.name(),
            ?direction,
            "Bound control to property"
        );
        Ok(())
    }
}

impl<M> fmt::Debug for BindingCoordinator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingCoordinator")
            .field("model", &short_type_name::<M>())
            .field("registry_len", &self.registry.len())
            .field("marshaller", &self.marshaller)
            .finish()
    }
}
