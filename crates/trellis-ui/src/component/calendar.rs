use super::{Capability, VariantState, WidgetSpec};
use crate::error::BridgeError;
use trellis_toolkit::{CalendarDate, Toolkit, WidgetId, WidgetKind};

/// Calendar-specific state.
///
/// Mirrors the highlight list handed to the toolkit so the component remains
/// the source of truth for what the script requested.
#[derive(Debug, Default)]
pub struct CalendarState {
    highlighted: Vec<CalendarDate>,
}

impl CalendarState {
    pub fn set_highlights(&mut self, dates: Vec<CalendarDate>) {
        self.highlighted = dates;
    }

    pub fn highlights(&self) -> &[CalendarDate] {
        &self.highlighted
    }
}

fn create(toolkit: &mut dyn Toolkit, parent: WidgetId) -> Result<WidgetId, BridgeError> {
    let id = toolkit.create(WidgetKind::Calendar, parent)?;
    if let Err(err) = setup_headers(toolkit, id) {
        let _ = toolkit.destroy(id);
        return Err(err);
    }
    Ok(id)
}

fn setup_headers(toolkit: &mut dyn Toolkit, calendar: WidgetId) -> Result<(), BridgeError> {
    toolkit.create(WidgetKind::CalendarHeaderDropdown, calendar)?;
    toolkit.create(WidgetKind::CalendarHeaderArrow, calendar)?;
    Ok(())
}

fn init_state() -> VariantState {
    VariantState::Calendar(CalendarState::default())
}

fn on_destroy(state: &mut VariantState, _toolkit: &mut dyn Toolkit) {
    if let VariantState::Calendar(calendar) = state {
        calendar.highlighted.clear();
    }
}

pub static CALENDAR_SPEC: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Calendar,
    capabilities: &[
        Capability::SetStyle,
        Capability::AddEventListener,
        Capability::Align,
        Capability::AlignTo,
        Capability::Calendar,
    ],
    create,
    init_state,
    on_destroy,
};
