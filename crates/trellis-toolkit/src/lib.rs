//! Interface to the retained-mode graphics toolkit.
//!
//! The bridge layer never talks to a concrete toolkit; everything goes through
//! the [`Toolkit`] trait: widget creation and teardown, the user-data slot that
//! carries the bridge's back-reference, liveness queries, style and geometry
//! setters, and the event queue. [`HeadlessToolkit`] is the in-memory
//! implementation backing tests.

mod headless;
mod style;

pub use headless::HeadlessToolkit;
pub use style::{Align, AlignSpec, StyleProps, StyleValue};

use thiserror::Error;

/// Identifier for a native widget owned by the toolkit scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub(crate) u32);

impl WidgetId {
    pub fn from_index(index: u32) -> Self {
        WidgetId(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Widget kinds the toolkit knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Screen,
    Switch,
    Calendar,
    CalendarHeaderDropdown,
    CalendarHeaderArrow,
}

impl WidgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Screen => "Screen",
            WidgetKind::Switch => "Switch",
            WidgetKind::Calendar => "Calendar",
            WidgetKind::CalendarHeaderDropdown => "CalendarHeaderDropdown",
            WidgetKind::CalendarHeaderArrow => "CalendarHeaderArrow",
        }
    }
}

/// A calendar date as the toolkit stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Event kinds a widget can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Clicked,
    ValueChanged,
    Pressed,
    Released,
    LongPressed,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Clicked => "clicked",
            EventKind::ValueChanged => "value_changed",
            EventKind::Pressed => "pressed",
            EventKind::Released => "released",
            EventKind::LongPressed => "long_pressed",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "clicked" => Some(EventKind::Clicked),
            "value_changed" => Some(EventKind::ValueChanged),
            "pressed" => Some(EventKind::Pressed),
            "released" => Some(EventKind::Released),
            "long_pressed" => Some(EventKind::LongPressed),
            _ => None,
        }
    }
}

/// Payload carried alongside an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    None,
    Checked(bool),
    Date(CalendarDate),
}

/// An event raised by the toolkit, addressed by native widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolkitEvent {
    pub target: WidgetId,
    pub kind: EventKind,
    pub value: EventValue,
}

/// Opaque back-reference stored on a native widget's user-data slot.
///
/// The toolkit never interprets this; the bridge uses it to resolve an event's
/// target widget back to the owning component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackRef(pub u32);

#[derive(Debug, Error, PartialEq)]
pub enum ToolkitError {
    #[error("widget #{} is no longer valid", .0.index())]
    InvalidWidget(WidgetId),
    #[error("widget kind mismatch: expected {expected}, got {got}")]
    KindMismatch {
        expected: &'static str,
        got: &'static str,
    },
}

/// Everything the bridge consumes from the graphics toolkit.
///
/// Per-kind setters follow the toolkit's own API shape (one function per
/// property) rather than a generic property bag.
pub trait Toolkit {
    /// The active screen, used as the default parent.
    fn root(&self) -> WidgetId;

    fn create(&mut self, kind: WidgetKind, parent: WidgetId) -> Result<WidgetId, ToolkitError>;

    /// Destroy a widget and its entire subtree. Queued events addressed to any
    /// widget that went down are discarded, so a later occupant of a reused
    /// slot can never receive them.
    fn destroy(&mut self, id: WidgetId) -> Result<(), ToolkitError>;

    fn is_valid(&self, id: WidgetId) -> bool;

    fn set_user_data(&mut self, id: WidgetId, data: Option<BackRef>) -> Result<(), ToolkitError>;
    fn user_data(&self, id: WidgetId) -> Option<BackRef>;

    fn reparent(&mut self, id: WidgetId, new_parent: WidgetId) -> Result<(), ToolkitError>;
    fn parent(&self, id: WidgetId) -> Option<WidgetId>;
    fn children(&self, id: WidgetId) -> Vec<WidgetId>;

    fn set_style(&mut self, id: WidgetId, props: &StyleProps) -> Result<(), ToolkitError>;
    fn align(&mut self, id: WidgetId, spec: AlignSpec) -> Result<(), ToolkitError>;
    fn align_to(
        &mut self,
        id: WidgetId,
        target: WidgetId,
        spec: AlignSpec,
    ) -> Result<(), ToolkitError>;

    fn set_calendar_today(&mut self, id: WidgetId, date: CalendarDate)
        -> Result<(), ToolkitError>;
    fn set_calendar_shown_month(
        &mut self,
        id: WidgetId,
        year: u16,
        month: u8,
    ) -> Result<(), ToolkitError>;
    fn set_calendar_highlights(
        &mut self,
        id: WidgetId,
        dates: &[CalendarDate],
    ) -> Result<(), ToolkitError>;
    fn calendar_today(&self, id: WidgetId) -> Option<CalendarDate>;
    fn calendar_shown_month(&self, id: WidgetId) -> Option<(u16, u8)>;
    fn calendar_highlights(&self, id: WidgetId) -> Vec<CalendarDate>;

    fn set_checked(&mut self, id: WidgetId, checked: bool) -> Result<(), ToolkitError>;
    fn checked(&self, id: WidgetId) -> Option<bool>;

    /// Raise an event at a widget, queueing it for the next drain.
    fn send_event(
        &mut self,
        id: WidgetId,
        kind: EventKind,
        value: EventValue,
    ) -> Result<(), ToolkitError>;

    /// Take all queued events in FIFO order.
    fn drain_events(&mut self) -> Vec<ToolkitEvent>;
}
