#![forbid(unsafe_code)]

//! Reactive bindings between model properties and UI controls.
//!
//! - [`ObservableState`]: per-model callback table with view-binding
//!   suppression.
//! - [`Property`]: typed property descriptor whose `set` notifies.
//! - [`BindingCoordinator`]: wires control accessors to properties in one or
//!   both directions.
//!
//! # Architecture
//!
//! Everything here is `Send + Sync`: models are shared as `Arc<M>`, callback
//! tables sit behind a `Mutex`, and callbacks are `Arc<dyn Fn() + Send + Sync>`.
//! Control writes always go through a [`Marshaller`](crate::Marshaller).
//!
//! # Invariants
//!
//! 1. Callbacks for a property run in registration order.
//! 2. A view-originated change never echoes back into the control it came
//!    from.
//! 3. A model-originated write never re-enters the model through the
//!    control's change channel.

pub mod binding;
pub mod observable;
pub mod property;

pub use binding::{BindArg, BindingCoordinator, Direction};
pub use observable::{Callback, CallbackFlags, Observable, ObservableState, ViewBindingSuppression};
pub use property::Property;
