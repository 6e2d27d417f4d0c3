#![forbid(unsafe_code)]

//! Core: control capability contract, accessor registry, and binding errors.
//!
//! # Role in Bindwire
//! `bindwire-core` is the toolkit-facing layer. It describes what the binding
//! engine needs from a UI control (a read accessor, a write accessor, and an
//! optional change channel) without knowing anything about the toolkit that
//! draws it.
//!
//! # Primary responsibilities
//! - **Control**: the capability trait every bindable control implements,
//!   plus [`ControlType`] descriptors that model the control's type chain.
//! - **ChangeSignals**: per-control change channels with scoped blocking.
//! - **ControlAdapterRegistry**: maps a read accessor to its write accessor
//!   and change channel, searching ancestor types when the concrete type has
//!   no entry of its own.
//! - **BindError**: the configuration-error taxonomy shared by all crates.
//!
//! # How it fits in the system
//! The runtime (`bindwire-runtime`) resolves control accessors through the
//! registry when a binding is created and drives controls only through the
//! typed accessors the registry hands back.

pub mod control;
pub mod error;
pub mod logging;
pub mod registry;

pub use control::{
    AccessorId, ChangeSignals, ChannelId, Control, ControlAccessor, ControlType,
    SignalBlockGuard,
};
pub use error::BindError;
pub use registry::{Accessors, ControlAccessorEntry, ControlAdapterRegistry, RegistryBuilder};
