#![forbid(unsafe_code)]

//! Runtime: observable state, UI-thread marshalling, and bindings.
//!
//! # Role in Bindwire
//! `bindwire-runtime` is where model changes meet controls. It owns the
//! callback tables that properties notify, the task queue that moves control
//! writes onto the UI thread, and the coordinator that connects the two.
//!
//! # Primary responsibilities
//! - **ObservableState / Property**: synchronous change notification with
//!   scoped suppression of view-binding callbacks.
//! - **UiRuntime / Marshaller**: a single-slot task queue drained on the UI
//!   thread, with fire-and-forget and blocking submission from any thread.
//! - **BindingCoordinator**: one-way and two-way bindings resolved through a
//!   [`ControlAdapterRegistry`](bindwire_core::ControlAdapterRegistry).
//! - **MarshallerConfig**: blocking behavior and headless mode, with
//!   environment overrides.
//!
//! # How it fits in the system
//! `bindwire-core` supplies the control contract and the registry. Hosts
//! create a [`UiRuntime`] on their UI thread, hand [`Marshaller`]s to model
//! state and coordinators, and drain the runtime from their event loop.

pub mod config;
pub mod reactive;
pub mod ui_thread;

pub use config::MarshallerConfig;
pub use reactive::{
    BindArg, BindingCoordinator, Callback, CallbackFlags, Direction, Observable, ObservableState,
    Property, ViewBindingSuppression,
};
pub use ui_thread::{MarshalError, Marshaller, QUEUE_CAPACITY, UiRuntime, UiUpdater};
