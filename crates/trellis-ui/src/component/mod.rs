mod arena;
mod calendar;
mod switch;

pub use arena::{ComponentArena, ComponentKey};
pub use calendar::{CALENDAR_SPEC, CalendarState};
pub use switch::{SWITCH_SPEC, SwitchState};

use crate::error::BridgeError;
use crate::events::ListenerSet;
use smartstring::{LazyCompact, SmartString};
use trellis_toolkit::{Toolkit, WidgetId, WidgetKind};

/// Script-visible operations a widget kind may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SetStyle,
    AddEventListener,
    Align,
    AlignTo,
    AppendChild,
    RemoveChild,
    Checked,
    Calendar,
}

/// Per-variant construction/teardown hooks plus the capability list.
///
/// One static per widget kind; the lifecycle protocol itself is shared and
/// lives in [`crate::bridge`].
pub struct WidgetSpec {
    pub kind: WidgetKind,
    pub capabilities: &'static [Capability],
    /// Create the native widget under the given parent, including any
    /// variant-specific setup (e.g. calendar header controls). Must unwind its
    /// own partial work on failure.
    pub create: fn(&mut dyn Toolkit, WidgetId) -> Result<WidgetId, BridgeError>,
    pub init_state: fn() -> VariantState,
    /// Variant teardown, run after the back-reference is cleared and before
    /// the native widget is destroyed.
    pub on_destroy: fn(&mut VariantState, &mut dyn Toolkit),
}

/// Variant-specific state carried by a component.
#[derive(Debug)]
pub enum VariantState {
    Switch(SwitchState),
    Calendar(CalendarState),
}

/// Native-side wrapper around exactly one widget instance.
pub struct Component {
    spec: &'static WidgetSpec,
    uid: SmartString<LazyCompact>,
    widget: WidgetId,
    pub(crate) listeners: ListenerSet,
    pub(crate) state: VariantState,
}

impl Component {
    pub fn new(spec: &'static WidgetSpec, uid: &str, widget: WidgetId) -> Self {
        Self {
            spec,
            uid: uid.into(),
            widget,
            listeners: ListenerSet::new(),
            state: (spec.init_state)(),
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.spec.kind
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.spec.capabilities.contains(&capability)
    }

    pub fn state(&self) -> &VariantState {
        &self.state
    }

    pub(crate) fn spec(&self) -> &'static WidgetSpec {
        self.spec
    }
}
