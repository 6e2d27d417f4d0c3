#![forbid(unsafe_code)]

//! Binding configuration errors.
//!
//! Everything here except [`BindError::OrphanedObservableMutation`] is a
//! setup-time misconfiguration: it is returned to the caller constructing the
//! registry or the binding, and no partial binding is left behind.
//!
//! `OrphanedObservableMutation` is never returned. It exists so the warning
//! logged for a mutator without backing state reads the same way as every
//! other binding diagnostic.

use std::fmt;

use crate::control::AccessorId;

/// Errors from registry construction and binding setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No registry entry for the accessor on any type in the control's chain.
    UnregisteredControlCapability {
        control_type: &'static str,
        accessor: &'static str,
        searched: Vec<&'static str>,
    },
    /// A view-originating binding on an accessor with no change channel.
    MissingChangeChannel {
        control_type: &'static str,
        accessor: AccessorId,
        model: &'static str,
        property: &'static str,
    },
    /// The two binding arguments were not one control accessor and one property.
    AmbiguousBindingArguments {
        first: &'static str,
        second: &'static str,
    },
    /// A property mutator ran on a model with no observable state.
    OrphanedObservableMutation {
        model: &'static str,
        property: &'static str,
    },
    /// The same read accessor was registered twice.
    DuplicateRegistration { accessor: AccessorId },
    /// Two distinct control type descriptors share a name.
    ConflictingTypeName { name: &'static str },
    /// The accessor transfers a different value type than the property.
    ValueTypeMismatch {
        accessor: AccessorId,
        expected: &'static str,
        found: &'static str,
    },
    /// The model has no observable state to attach callbacks to.
    MissingObservableState { model: &'static str },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnregisteredControlCapability {
                control_type,
                accessor,
                searched,
            } => write!(
                f,
                "no registered write accessor for '{control_type}.{accessor}' \
                 under the type chain [{}]; add it to the control registry",
                searched.join(", ")
            ),
            Self::MissingChangeChannel {
                control_type,
                accessor,
                model,
                property,
            } => write!(
                f,
                "binding '{control_type}.{}' -> '{model}.{property}' needs a change channel, \
                 but '{accessor}' is registered without one",
                accessor.name
            ),
            Self::AmbiguousBindingArguments { first, second } => write!(
                f,
                "expected a control accessor and a model property, but received {first} and {second}"
            ),
            Self::OrphanedObservableMutation { model, property } => write!(
                f,
                "no observable state behind '{model}.{property}'; the mutation was not broadcast"
            ),
            Self::DuplicateRegistration { accessor } => {
                write!(f, "accessor '{accessor}' is already registered")
            }
            Self::ConflictingTypeName { name } => write!(
                f,
                "control type name '{name}' is already claimed by a different descriptor"
            ),
            Self::ValueTypeMismatch {
                accessor,
                expected,
                found,
            } => write!(
                f,
                "accessor '{accessor}' transfers {expected}, but the property holds {found}"
            ),
            Self::MissingObservableState { model } => {
                write!(f, "model '{model}' exposes no observable state to bind against")
            }
        }
    }
}

impl std::error::Error for BindError {}
