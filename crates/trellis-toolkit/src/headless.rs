use crate::style::{AlignSpec, StyleProps, StyleValue};
use crate::{
    BackRef, CalendarDate, EventKind, EventValue, Toolkit, ToolkitError, ToolkitEvent, WidgetId,
    WidgetKind,
};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
struct AlignRecord {
    spec: AlignSpec,
    relative_to: Option<WidgetId>,
}

#[derive(Debug, Default)]
struct CalendarRecord {
    today: Option<CalendarDate>,
    shown: Option<(u16, u8)>,
    highlighted: Vec<CalendarDate>,
}

#[derive(Debug)]
struct WidgetRecord {
    kind: WidgetKind,
    parent: Option<WidgetId>,
    children: SmallVec<[WidgetId; 4]>,
    user_data: Option<BackRef>,
    styles: HashMap<String, StyleValue>,
    alignment: Option<AlignRecord>,
    calendar: Option<CalendarRecord>,
    checked: bool,
}

impl WidgetRecord {
    fn new(kind: WidgetKind, parent: Option<WidgetId>) -> Self {
        Self {
            kind,
            parent,
            children: SmallVec::new(),
            user_data: None,
            styles: HashMap::new(),
            alignment: None,
            calendar: matches!(kind, WidgetKind::Calendar).then(CalendarRecord::default),
            checked: false,
        }
    }
}

/// In-memory scene graph implementing [`Toolkit`].
///
/// Slots are reused through a free list; a destroyed widget's id stays invalid
/// until the slot is handed out again.
pub struct HeadlessToolkit {
    widgets: Vec<Option<WidgetRecord>>,
    free_list: Vec<u32>,
    root: WidgetId,
    events: Vec<ToolkitEvent>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        let mut toolkit = Self {
            widgets: Vec::new(),
            free_list: Vec::new(),
            root: WidgetId(0),
            events: Vec::new(),
        };
        let root = toolkit.alloc(WidgetRecord::new(WidgetKind::Screen, None));
        toolkit.root = root;
        toolkit
    }

    /// Number of live widgets, the root screen included.
    pub fn widget_count(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_some()).count()
    }

    pub fn kind(&self, id: WidgetId) -> Option<WidgetKind> {
        self.record(id).map(|w| w.kind)
    }

    pub fn style_value(&self, id: WidgetId, name: &str) -> Option<StyleValue> {
        self.record(id).and_then(|w| w.styles.get(name).cloned())
    }

    pub fn alignment(&self, id: WidgetId) -> Option<AlignSpec> {
        self.record(id).and_then(|w| w.alignment).map(|a| a.spec)
    }

    /// The reference widget of the last `align_to`, if any.
    pub fn alignment_target(&self, id: WidgetId) -> Option<WidgetId> {
        self.record(id).and_then(|w| w.alignment)?.relative_to
    }

    fn alloc(&mut self, record: WidgetRecord) -> WidgetId {
        if let Some(idx) = self.free_list.pop() {
            self.widgets[idx as usize] = Some(record);
            WidgetId(idx)
        } else {
            let idx = self.widgets.len() as u32;
            self.widgets.push(Some(record));
            WidgetId(idx)
        }
    }

    fn record(&self, id: WidgetId) -> Option<&WidgetRecord> {
        self.widgets.get(id.0 as usize)?.as_ref()
    }

    fn record_mut(&mut self, id: WidgetId) -> Option<&mut WidgetRecord> {
        self.widgets.get_mut(id.0 as usize)?.as_mut()
    }

    fn require(&self, id: WidgetId) -> Result<&WidgetRecord, ToolkitError> {
        self.record(id).ok_or(ToolkitError::InvalidWidget(id))
    }

    fn require_mut(&mut self, id: WidgetId) -> Result<&mut WidgetRecord, ToolkitError> {
        self.record_mut(id).ok_or(ToolkitError::InvalidWidget(id))
    }

    fn calendar_mut(&mut self, id: WidgetId) -> Result<&mut CalendarRecord, ToolkitError> {
        let record = self.require_mut(id)?;
        let got = record.kind.as_str();
        record.calendar.as_mut().ok_or(ToolkitError::KindMismatch {
            expected: WidgetKind::Calendar.as_str(),
            got,
        })
    }

    fn detach(&mut self, id: WidgetId) {
        if let Some(parent) = self.record(id).and_then(|w| w.parent) {
            if let Some(record) = self.record_mut(parent) {
                record.children.retain(|c| *c != id);
            }
        }
    }

    fn destroy_subtree(&mut self, id: WidgetId) {
        let children = match self.record(id) {
            Some(record) => record.children.clone(),
            None => return,
        };
        for child in children {
            self.destroy_subtree(child);
        }
        self.widgets[id.0 as usize] = None;
        self.free_list.push(id.0);
    }
}

impl Default for HeadlessToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit for HeadlessToolkit {
    fn root(&self) -> WidgetId {
        self.root
    }

    fn create(&mut self, kind: WidgetKind, parent: WidgetId) -> Result<WidgetId, ToolkitError> {
        self.require(parent)?;
        let id = self.alloc(WidgetRecord::new(kind, Some(parent)));
        if let Some(record) = self.record_mut(parent) {
            record.children.push(id);
        }
        trace!(kind = kind.as_str(), id = id.index(), "widget created");
        Ok(id)
    }

    fn destroy(&mut self, id: WidgetId) -> Result<(), ToolkitError> {
        self.require(id)?;
        self.detach(id);
        self.destroy_subtree(id);
        // Events addressed to the dead subtree must not survive into a reused
        // slot.
        let mut events = std::mem::take(&mut self.events);
        events.retain(|event| self.record(event.target).is_some());
        self.events = events;
        trace!(id = id.index(), "widget destroyed");
        Ok(())
    }

    fn is_valid(&self, id: WidgetId) -> bool {
        self.record(id).is_some()
    }

    fn set_user_data(&mut self, id: WidgetId, data: Option<BackRef>) -> Result<(), ToolkitError> {
        self.require_mut(id)?.user_data = data;
        Ok(())
    }

    fn user_data(&self, id: WidgetId) -> Option<BackRef> {
        self.record(id)?.user_data
    }

    fn reparent(&mut self, id: WidgetId, new_parent: WidgetId) -> Result<(), ToolkitError> {
        self.require(id)?;
        self.require(new_parent)?;
        self.detach(id);
        self.require_mut(id)?.parent = Some(new_parent);
        if let Some(record) = self.record_mut(new_parent) {
            record.children.push(id);
        }
        Ok(())
    }

    fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.record(id)?.parent
    }

    fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.record(id)
            .map(|w| w.children.to_vec())
            .unwrap_or_default()
    }

    fn set_style(&mut self, id: WidgetId, props: &StyleProps) -> Result<(), ToolkitError> {
        let record = self.require_mut(id)?;
        for (name, value) in props {
            record.styles.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    fn align(&mut self, id: WidgetId, spec: AlignSpec) -> Result<(), ToolkitError> {
        self.require_mut(id)?.alignment = Some(AlignRecord {
            spec,
            relative_to: None,
        });
        Ok(())
    }

    fn align_to(
        &mut self,
        id: WidgetId,
        target: WidgetId,
        spec: AlignSpec,
    ) -> Result<(), ToolkitError> {
        self.require(target)?;
        self.require_mut(id)?.alignment = Some(AlignRecord {
            spec,
            relative_to: Some(target),
        });
        Ok(())
    }

    fn set_calendar_today(
        &mut self,
        id: WidgetId,
        date: CalendarDate,
    ) -> Result<(), ToolkitError> {
        self.calendar_mut(id)?.today = Some(date);
        Ok(())
    }

    fn set_calendar_shown_month(
        &mut self,
        id: WidgetId,
        year: u16,
        month: u8,
    ) -> Result<(), ToolkitError> {
        self.calendar_mut(id)?.shown = Some((year, month));
        Ok(())
    }

    fn set_calendar_highlights(
        &mut self,
        id: WidgetId,
        dates: &[CalendarDate],
    ) -> Result<(), ToolkitError> {
        self.calendar_mut(id)?.highlighted = dates.to_vec();
        Ok(())
    }

    fn calendar_today(&self, id: WidgetId) -> Option<CalendarDate> {
        self.record(id)?.calendar.as_ref()?.today
    }

    fn calendar_shown_month(&self, id: WidgetId) -> Option<(u16, u8)> {
        self.record(id)?.calendar.as_ref()?.shown
    }

    fn calendar_highlights(&self, id: WidgetId) -> Vec<CalendarDate> {
        self.record(id)
            .and_then(|w| w.calendar.as_ref())
            .map(|c| c.highlighted.clone())
            .unwrap_or_default()
    }

    fn set_checked(&mut self, id: WidgetId, checked: bool) -> Result<(), ToolkitError> {
        self.require_mut(id)?.checked = checked;
        Ok(())
    }

    fn checked(&self, id: WidgetId) -> Option<bool> {
        self.record(id).map(|w| w.checked)
    }

    fn send_event(
        &mut self,
        id: WidgetId,
        kind: EventKind,
        value: EventValue,
    ) -> Result<(), ToolkitError> {
        self.require(id)?;
        self.events.push(ToolkitEvent {
            target: id,
            kind,
            value,
        });
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<ToolkitEvent> {
        std::mem::take(&mut self.events)
    }
}
