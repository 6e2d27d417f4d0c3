#![forbid(unsafe_code)]

//! Control capability contract.
//!
//! A control is anything that displays a value and can report when the user
//! changed it. Bindwire never touches a toolkit directly: it only needs
//!
//! - a [`ControlType`] describing where the control sits in its type chain,
//! - a way to reach the component that owns an inherited accessor
//!   ([`Control::component`]), and
//! - a [`ChangeSignals`] table the control emits on when its value changes.
//!
//! # Inheritance by composition
//!
//! Toolkits model "a check box is a button is a widget" with inheritance.
//! Here each level is a struct embedded in the next one, and
//! [`Control::component`] hands out the embedded struct for a given
//! ancestor type. Accessors registered for an ancestor therefore work on
//! every descendant.
//!
//! # Invariants
//!
//! 1. `control_type().ancestors()` starts with the control's own type and
//!    ends at a root (a type with no parent).
//! 2. `component(t)` returns `Some` for every `t` in that chain.
//! 3. While a [`SignalBlockGuard`] is alive, [`ChangeSignals::emit`] calls no
//!    slots. Dropping the guard restores the previous blocked state, even
//!    during unwinding.
//! 4. Slots are invoked in connection order, outside the slot table lock.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// Type descriptors
// ============================================================================

/// Static descriptor of a control type and its parent.
///
/// Descriptors compare by identity, so declare each one as a `static`.
/// Names form half of every [`AccessorId`]; a registry refuses two distinct
/// descriptors sharing a name.
///
/// ```
/// use bindwire_core::ControlType;
///
/// static WIDGET: ControlType = ControlType::root("Widget");
/// static BUTTON: ControlType = ControlType::derived("Button", &WIDGET);
///
/// let chain: Vec<_> = BUTTON.ancestors().map(ControlType::name).collect();
/// assert_eq!(chain, ["Button", "Widget"]);
/// ```
#[derive(Debug)]
pub struct ControlType {
    name: &'static str,
    parent: Option<&'static ControlType>,
}

impl ControlType {
    /// A type with no parent.
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A type deriving from `parent`.
    #[must_use]
    pub const fn derived(name: &'static str, parent: &'static ControlType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn parent(&self) -> Option<&'static ControlType> {
        self.parent
    }

    /// Walk the type chain, most-derived first.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static ControlType> {
        std::iter::successors(Some(self), |ty| ty.parent)
    }

    /// Whether `self` is `other` or derives from it.
    #[must_use]
    pub fn is_a(&'static self, other: &ControlType) -> bool {
        self.ancestors().any(|ty| ty == other)
    }
}

impl PartialEq for ControlType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ControlType {}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of an accessor declared on a particular control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessorId {
    pub owner: &'static str,
    pub name: &'static str,
}

impl AccessorId {
    #[must_use]
    pub const fn new(owner: &'static str, name: &'static str) -> Self {
        Self { owner, name }
    }
}

impl fmt::Display for AccessorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// Name of a change-notification channel (e.g. `"text_changed"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(&'static str);

impl ChannelId {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// ============================================================================
// Control trait
// ============================================================================

/// A bindable UI control.
pub trait Control: Any + Send + Sync {
    /// The control's most-derived type.
    fn control_type(&self) -> &'static ControlType;

    /// The embedded component implementing `ty`, if `ty` is on this
    /// control's type chain.
    fn component(&self, ty: &'static ControlType) -> Option<&dyn Any>;

    /// The control's change channels.
    fn signals(&self) -> &ChangeSignals;
}

/// A read accessor bound to a concrete control instance.
///
/// This is what callers hand to the binding layer in place of a bound
/// method: the control plus the name of the accessor that reads it.
#[derive(Clone)]
pub struct ControlAccessor {
    control: Arc<dyn Control>,
    name: &'static str,
}

impl ControlAccessor {
    pub fn new(control: Arc<dyn Control>, name: &'static str) -> Self {
        Self { control, name }
    }

    /// Convenience for concrete control handles.
    pub fn of<C: Control>(control: &Arc<C>, name: &'static str) -> Self {
        let control: Arc<dyn Control> = control.clone();
        Self { control, name }
    }

    #[must_use]
    pub fn control(&self) -> &Arc<dyn Control> {
        &self.control
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn control_type(&self) -> &'static ControlType {
        self.control.control_type()
    }
}

impl fmt::Debug for ControlAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlAccessor")
            .field("control_type", &self.control.control_type().name())
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================================
// Change signals
// ============================================================================

type Slot = Arc<dyn Fn() + Send + Sync>;

/// Change-notification channels of one control.
///
/// Controls call [`emit`](Self::emit) whenever their value changes,
/// programmatically or through user interaction. The binding layer blocks
/// emission around its own writes so that pushing a model value into the
/// control does not bounce back into the model.
#[derive(Default)]
pub struct ChangeSignals {
    blocked: AtomicBool,
    slots: Mutex<Vec<(ChannelId, Slot)>>,
}

impl ChangeSignals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `slot` to `channel`. Slots run in connection order.
    pub fn connect(&self, channel: ChannelId, slot: impl Fn() + Send + Sync + 'static) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, Arc::new(slot)));
    }

    /// Emit `channel`. Returns how many slots ran (0 while blocked).
    pub fn emit(&self, channel: ChannelId) -> usize {
        if self.is_blocked() {
            return 0;
        }
        // Snapshot so slots may connect further slots or emit again.
        let slots: Vec<Slot> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .map(|(_, slot)| Arc::clone(slot))
            .collect();
        for slot in &slots {
            slot();
        }
        slots.len()
    }

    /// Block emission until the returned guard is dropped.
    pub fn block(&self) -> SignalBlockGuard<'_> {
        let previous = self.blocked.swap(true, Ordering::AcqRel);
        SignalBlockGuard {
            signals: self,
            previous,
        }
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Number of slots connected to `channel`.
    #[must_use]
    pub fn slot_count(&self, channel: ChannelId) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .count()
    }
}

impl fmt::Debug for ChangeSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot_count = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ChangeSignals")
            .field("blocked", &self.is_blocked())
            .field("slot_count", &slot_count)
            .finish()
    }
}

/// RAII guard returned by [`ChangeSignals::block`].
#[must_use]
pub struct SignalBlockGuard<'a> {
    signals: &'a ChangeSignals,
    previous: bool,
}

impl Drop for SignalBlockGuard<'_> {
    fn drop(&mut self) {
        self.signals.blocked.store(self.previous, Ordering::Release);
    }
}

impl fmt::Debug for SignalBlockGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBlockGuard")
            .field("previous", &self.previous)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
