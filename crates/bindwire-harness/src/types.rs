#![forbid(unsafe_code)]

//! Type descriptors and change channels of the reference controls.
//!
//! ```text
//! Widget
//! ├── Label
//! ├── LineEdit
//! ├── ProgressBar
//! ├── Dialog
//! ├── TableWidget
//! └── AbstractButton
//!     ├── CheckBox
//!     ├── RadioButton
//!     └── PushButton
//! ```

use bindwire_core::{ChannelId, ControlType};

pub static WIDGET: ControlType = ControlType::root("Widget");
pub static LABEL: ControlType = ControlType::derived("Label", &WIDGET);
pub static LINE_EDIT: ControlType = ControlType::derived("LineEdit", &WIDGET);
pub static PROGRESS_BAR: ControlType = ControlType::derived("ProgressBar", &WIDGET);
pub static DIALOG: ControlType = ControlType::derived("Dialog", &WIDGET);
pub static TABLE_WIDGET: ControlType = ControlType::derived("TableWidget", &WIDGET);
pub static ABSTRACT_BUTTON: ControlType = ControlType::derived("AbstractButton", &WIDGET);
pub static CHECK_BOX: ControlType = ControlType::derived("CheckBox", &ABSTRACT_BUTTON);
pub static RADIO_BUTTON: ControlType = ControlType::derived("RadioButton", &ABSTRACT_BUTTON);
pub static PUSH_BUTTON: ControlType = ControlType::derived("PushButton", &ABSTRACT_BUTTON);

/// Line edit text changed.
pub const TEXT_CHANGED: ChannelId = ChannelId::new("text_changed");
/// Checkable button changed state.
pub const TOGGLED: ChannelId = ChannelId::new("toggled");
/// Button activated.
pub const CLICKED: ChannelId = ChannelId::new("clicked");
/// Progress value changed.
pub const VALUE_CHANGED: ChannelId = ChannelId::new("value_changed");
/// Dialog closed with a result code.
pub const FINISHED: ChannelId = ChannelId::new("finished");
/// A table cell was edited.
pub const ITEM_CHANGED: ChannelId = ChannelId::new("item_changed");
