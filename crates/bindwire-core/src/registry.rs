#![forbid(unsafe_code)]

//! Control accessor registry.
//!
//! Maps a control's read accessor to its write accessor and (optional)
//! change channel. Entries are registered once, at startup, for the type that
//! declares the accessor; controls deriving from that type find the entry by
//! walking their type chain.
//!
//! # Resolution
//!
//! For a control of type `T` and accessor name `a`, the registry tries
//! `T.a`, then `parent(T).a`, and so on up to the root. The first hit wins.
//! If no type in the chain has an entry, resolution fails with
//! [`BindError::UnregisteredControlCapability`], listing every type searched.
//!
//! # Invariants
//!
//! 1. Every entry has a write accessor (enforced by construction).
//! 2. Read accessor identities are unique; duplicates are rejected by
//!    [`RegistryBuilder::register`].
//! 3. A built [`ControlAdapterRegistry`] is immutable.
//! 4. Resolution never returns a partial result: it is either a complete
//!    entry or an error.
//!
//! # Example
//!
//! ```
//! use std::any::Any;
//! use std::sync::{Arc, Mutex};
//! use bindwire_core::{
//!     ChangeSignals, ChannelId, Control, ControlAccessorEntry, ControlAdapterRegistry,
//!     ControlType,
//! };
//!
//! static FIELD: ControlType = ControlType::root("Field");
//! const EDITED: ChannelId = ChannelId::new("edited");
//!
//! #[derive(Default)]
//! struct Field {
//!     text: Mutex<String>,
//!     signals: ChangeSignals,
//! }
//!
//! impl Field {
//!     fn text(&self) -> String {
//!         self.text.lock().unwrap().clone()
//!     }
//!     fn set_text(&self, text: String) {
//!         *self.text.lock().unwrap() = text;
//!     }
//! }
//!
//! impl Control for Field {
//!     fn control_type(&self) -> &'static ControlType {
//!         &FIELD
//!     }
//!     fn component(&self, ty: &'static ControlType) -> Option<&dyn Any> {
//!         (*ty == FIELD).then_some(self as &dyn Any)
//!     }
//!     fn signals(&self) -> &ChangeSignals {
//!         &self.signals
//!     }
//! }
//!
//! let mut builder = ControlAdapterRegistry::builder();
//! builder
//!     .register(
//!         ControlAccessorEntry::new(&FIELD, "text", Field::text, "set_text", Field::set_text)
//!             .with_change_channel(EDITED),
//!     )
//!     .unwrap();
//! let registry = builder.build();
//!
//! let field = Field::default();
//! let entry = registry.resolve(&field, "text").unwrap();
//! assert_eq!(entry.write().name, "set_text");
//! assert_eq!(entry.change_channel(), Some(EDITED));
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::control::{AccessorId, ChannelId, Control, ControlType};
use crate::error::BindError;

type Getter<V> = Arc<dyn Fn(&dyn Control) -> Option<V> + Send + Sync>;
type Setter<V> = Arc<dyn Fn(&dyn Control, V) -> bool + Send + Sync>;

/// Typed read/write closures of one registry entry.
///
/// Both closures upcast the control to the component that declares the
/// accessor before calling it.
pub struct Accessors<V> {
    get: Getter<V>,
    set: Setter<V>,
}

impl<V> Clone for Accessors<V> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<V> Accessors<V> {
    /// Read the control's current value. `None` if the control does not
    /// carry the declaring component.
    pub fn read(&self, control: &dyn Control) -> Option<V> {
        (self.get)(control)
    }

    /// Write `value` into the control. Returns `false` if the control does
    /// not carry the declaring component.
    pub fn write(&self, control: &dyn Control, value: V) -> bool {
        (self.set)(control, value)
    }
}

impl<V> fmt::Debug for Accessors<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessors")
            .field("value_type", &type_name::<V>())
            .finish_non_exhaustive()
    }
}

/// One registered `{read, write, change_channel}` triple.
pub struct ControlAccessorEntry {
    owner: &'static ControlType,
    read: AccessorId,
    write: AccessorId,
    change_channel: Option<ChannelId>,
    value_type: &'static str,
    accessors: Arc<dyn Any + Send + Sync>,
}

impl ControlAccessorEntry {
    /// Declare an accessor pair on component type `C`, which implements
    /// control type `owner`.
    pub fn new<C, V, G, S>(
        owner: &'static ControlType,
        read: &'static str,
        getter: G,
        write: &'static str,
        setter: S,
    ) -> Self
    where
        C: Any,
        V: Send + 'static,
        G: Fn(&C) -> V + Send + Sync + 'static,
        S: Fn(&C, V) + Send + Sync + 'static,
    {
        let get: Getter<V> = Arc::new(move |control: &dyn Control| {
            control
                .component(owner)
                .and_then(|c| c.downcast_ref::<C>())
                .map(|component| getter(component))
        });
        let set: Setter<V> = Arc::new(move |control: &dyn Control, value: V| {
            match control.component(owner).and_then(|c| c.downcast_ref::<C>()) {
                Some(component) => {
                    setter(component, value);
                    true
                }
                None => false,
            }
        });
        Self {
            owner,
            read: AccessorId::new(owner.name(), read),
            write: AccessorId::new(owner.name(), write),
            change_channel: None,
            value_type: type_name::<V>(),
            accessors: Arc::new(Accessors { get, set }),
        }
    }

    /// Attach the channel the control emits when this value changes.
    #[must_use]
    pub fn with_change_channel(mut self, channel: ChannelId) -> Self {
        self.change_channel = Some(channel);
        self
    }

    /// The type that declares the accessor.
    #[must_use]
    pub fn owner(&self) -> &'static ControlType {
        self.owner
    }

    #[must_use]
    pub fn read(&self) -> AccessorId {
        self.read
    }

    #[must_use]
    pub fn write(&self) -> AccessorId {
        self.write
    }

    #[must_use]
    pub fn change_channel(&self) -> Option<ChannelId> {
        self.change_channel
    }

    /// Name of the value type the accessors transfer.
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    /// Typed accessors, if `V` is the registered value type.
    pub fn accessors<V: 'static>(&self) -> Result<Accessors<V>, BindError> {
        self.accessors
            .downcast_ref::<Accessors<V>>()
            .cloned()
            .ok_or_else(|| BindError::ValueTypeMismatch {
                accessor: self.read,
                expected: self.value_type,
                found: type_name::<V>(),
            })
    }
}

impl fmt::Debug for ControlAccessorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlAccessorEntry")
            .field("read", &self.read)
            .field("write", &self.write)
            .field("change_channel", &self.change_channel)
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// Collects entries before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<AccessorId, Arc<ControlAccessorEntry>>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Fails if its read accessor is already registered, or if
    /// another descriptor already registered under the owner's name.
    pub fn register(&mut self, entry: ControlAccessorEntry) -> Result<&mut Self, BindError> {
        let key = entry.read;
        if self.entries.contains_key(&key) {
            return Err(BindError::DuplicateRegistration { accessor: key });
        }
        if self
            .entries
            .values()
            .any(|known| known.owner.name() == entry.owner.name() && known.owner != entry.owner)
        {
            return Err(BindError::ConflictingTypeName {
                name: entry.owner.name(),
            });
        }
        debug!(
            read = %entry.read,
            write = %entry.write,
            channel = entry.change_channel.map(ChannelId::name),
            value_type = entry.value_type,
            "Registered control accessor"
        );
        self.entries.insert(key, Arc::new(entry));
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> ControlAdapterRegistry {
        ControlAdapterRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable accessor registry shared by every binding coordinator.
#[derive(Debug)]
pub struct ControlAdapterRegistry {
    entries: HashMap<AccessorId, Arc<ControlAccessorEntry>>,
}

impl ControlAdapterRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Exact lookup, without the ancestor walk.
    #[must_use]
    pub fn get(&self, read: &AccessorId) -> Option<&Arc<ControlAccessorEntry>> {
        self.entries.get(read)
    }

    /// Resolve a control's read accessor, searching its type chain.
    pub fn resolve(
        &self,
        control: &dyn Control,
        read: &'static str,
    ) -> Result<Arc<ControlAccessorEntry>, BindError> {
        let ty = control.control_type();
        for ancestor in ty.ancestors() {
            let key = AccessorId::new(ancestor.name(), read);
            if let Some(entry) = self.entries.get(&key).filter(|e| e.owner == ancestor) {
                debug!(
                    control_type = ty.name(),
                    accessor = read,
                    resolved = %entry.read,
                    "Resolved control accessor"
                );
                return Ok(Arc::clone(entry));
            }
        }
        Err(BindError::UnregisteredControlCapability {
            control_type: ty.name(),
            accessor: read,
            searched: ty.ancestors().map(ControlType::name).collect(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered read accessors, in no particular order.
    pub fn read_accessors(&self) -> impl Iterator<Item = &AccessorId> {
        self.entries.keys()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ChangeSignals;
    use std::sync::Mutex;

    static BASE: ControlType = ControlType::root("Base");
    static TOGGLE: ControlType = ControlType::derived("Toggle", &BASE);
    static FANCY_TOGGLE: ControlType = ControlType::derived("FancyToggle", &TOGGLE);
    static UNRELATED: ControlType = ControlType::root("Unrelated");

    const TOGGLED: ChannelId = ChannelId::new("toggled");

    #[derive(Default)]
    struct BasePart {
        visible: Mutex<bool>,
        signals: ChangeSignals,
    }

    impl BasePart {
        fn is_visible(&self) -> bool {
            *self.visible.lock().unwrap()
        }
        fn set_visible(&self, visible: bool) {
            *self.visible.lock().unwrap() = visible;
        }
    }

    #[derive(Default)]
    struct TogglePart {
        base: BasePart,
        on: Mutex<bool>,
    }

    impl TogglePart {
        fn is_on(&self) -> bool {
            *self.on.lock().unwrap()
        }
        fn set_on(&self, on: bool) {
            *self.on.lock().unwrap() = on;
        }
    }

    #[derive(Default)]
    struct FancyToggle {
        toggle: TogglePart,
    }

    impl Control for FancyToggle {
        fn control_type(&self) -> &'static ControlType {
            &FANCY_TOGGLE
        }
        fn component(&self, ty: &'static ControlType) -> Option<&dyn Any> {
            if *ty == FANCY_TOGGLE {
                Some(self as &dyn Any)
            } else if *ty == TOGGLE {
                Some(&self.toggle as &dyn Any)
            } else if *ty == BASE {
                Some(&self.toggle.base as &dyn Any)
            } else {
                None
            }
        }
        fn signals(&self) -> &ChangeSignals {
            &self.toggle.base.signals
        }
    }

    struct Stranger(ChangeSignals);

    impl Control for Stranger {
        fn control_type(&self) -> &'static ControlType {
            &UNRELATED
        }
        fn component(&self, ty: &'static ControlType) -> Option<&dyn Any> {
            (*ty == UNRELATED).then_some(self as &dyn Any)
        }
        fn signals(&self) -> &ChangeSignals {
            &self.0
        }
    }

    fn registry() -> ControlAdapterRegistry {
        let mut builder = ControlAdapterRegistry::builder();
        builder
            .register(ControlAccessorEntry::new(
                &BASE,
                "is_visible",
                BasePart::is_visible,
                "set_visible",
                BasePart::set_visible,
            ))
            .unwrap()
            .register(
                ControlAccessorEntry::new(
                    &TOGGLE,
                    "is_on",
                    TogglePart::is_on,
                    "set_on",
                    TogglePart::set_on,
                )
                .with_change_channel(TOGGLED),
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn resolves_through_two_levels() {
        let registry = registry();
        let control = FancyToggle::default();
        let entry = registry.resolve(&control, "is_visible").unwrap();
        assert_eq!(entry.read(), AccessorId::new("Base", "is_visible"));
        assert_eq!(entry.write(), AccessorId::new("Base", "set_visible"));
        assert_eq!(entry.change_channel(), None);
        assert_eq!(entry.owner().name(), "Base");
    }

    #[test]
    fn resolves_nearest_ancestor() {
        let registry = registry();
        let control = FancyToggle::default();
        let entry = registry.resolve(&control, "is_on").unwrap();
        assert_eq!(entry.read().owner, "Toggle");
        assert_eq!(entry.change_channel(), Some(TOGGLED));
    }

    #[test]
    fn unknown_accessor_lists_full_chain() {
        let registry = registry();
        let control = FancyToggle::default();
        let err = registry.resolve(&control, "is_spinning").unwrap_err();
        assert_eq!(
            err,
            BindError::UnregisteredControlCapability {
                control_type: "FancyToggle",
                accessor: "is_spinning",
                searched: vec!["FancyToggle", "Toggle", "Base"],
            }
        );
    }

    #[test]
    fn unrelated_control_not_resolved() {
        let registry = registry();
        let control = Stranger(ChangeSignals::new());
        assert!(matches!(
            registry.resolve(&control, "is_visible"),
            Err(BindError::UnregisteredControlCapability { .. })
        ));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut builder = ControlAdapterRegistry::builder();
        builder
            .register(ControlAccessorEntry::new(
                &TOGGLE,
                "is_on",
                TogglePart::is_on,
                "set_on",
                TogglePart::set_on,
            ))
            .unwrap();
        let err = builder
            .register(ControlAccessorEntry::new(
                &TOGGLE,
                "is_on",
                TogglePart::is_on,
                "set_on",
                TogglePart::set_on,
            ))
            .unwrap_err();
        assert_eq!(
            err,
            BindError::DuplicateRegistration {
                accessor: AccessorId::new("Toggle", "is_on")
            }
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn same_named_descriptor_is_rejected() {
        static SHADOW_TOGGLE: ControlType = ControlType::root("Toggle");
        let mut builder = ControlAdapterRegistry::builder();
        builder
            .register(ControlAccessorEntry::new(
                &TOGGLE,
                "is_on",
                TogglePart::is_on,
                "set_on",
                TogglePart::set_on,
            ))
            .unwrap();
        let err = builder
            .register(ControlAccessorEntry::new(
                &SHADOW_TOGGLE,
                "is_lit",
                TogglePart::is_on,
                "set_lit",
                TogglePart::set_on,
            ))
            .unwrap_err();
        assert_eq!(err, BindError::ConflictingTypeName { name: "Toggle" });
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn same_descriptor_may_register_many_accessors() {
        let mut builder = ControlAdapterRegistry::builder();
        builder
            .register(ControlAccessorEntry::new(
                &TOGGLE,
                "is_on",
                TogglePart::is_on,
                "set_on",
                TogglePart::set_on,
            ))
            .unwrap()
            .register(ControlAccessorEntry::new(
                &TOGGLE,
                "is_lit",
                TogglePart::is_on,
                "set_lit",
                TogglePart::set_on,
            ))
            .unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn typed_accessors_read_and_write_through_component() {
        let registry = registry();
        let control = FancyToggle::default();
        let entry = registry.resolve(&control, "is_on").unwrap();
        let accessors = entry.accessors::<bool>().unwrap();

        assert_eq!(accessors.read(&control), Some(false));
        assert!(accessors.write(&control, true));
        assert_eq!(accessors.read(&control), Some(true));
        assert!(control.toggle.is_on());
    }

    #[test]
    fn wrong_value_type_is_reported() {
        let registry = registry();
        let control = FancyToggle::default();
        let entry = registry.resolve(&control, "is_on").unwrap();
        let err = entry.accessors::<String>().unwrap_err();
        assert_eq!(
            err,
            BindError::ValueTypeMismatch {
                accessor: AccessorId::new("Toggle", "is_on"),
                expected: type_name::<bool>(),
                found: type_name::<String>(),
            }
        );
    }

    #[test]
    fn accessors_on_foreign_control_fail_softly() {
        let registry = registry();
        let entry = registry
            .get(&AccessorId::new("Toggle", "is_on"))
            .unwrap()
            .clone();
        let accessors = entry.accessors::<bool>().unwrap();
        let stranger = Stranger(ChangeSignals::new());
        assert_eq!(accessors.read(&stranger), None);
        assert!(!accessors.write(&stranger, true));
    }

    #[test]
    fn built_registry_reports_contents() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        let mut keys: Vec<String> = registry.read_accessors().map(ToString::to_string).collect();
        keys.sort();
        assert_eq!(keys, ["Base.is_visible", "Toggle.is_on"]);
    }
}
