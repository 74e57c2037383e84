//! The shared lifecycle protocol every widget kind follows.
//!
//! Construction ordering, mutation dispatch, and the idempotent finalize
//! routine live here; widget kinds only contribute their [`WidgetSpec`].

use crate::component::{
    Capability, Component, ComponentArena, ComponentKey, VariantState, WidgetSpec,
};
use crate::error::BridgeError;
use mlua::RegistryKey;
use tracing::debug;
use trellis_toolkit::{AlignSpec, CalendarDate, EventKind, StyleProps, Toolkit, WidgetId};

pub struct Bridge {
    toolkit: Box<dyn Toolkit>,
    components: ComponentArena,
}

impl Bridge {
    pub fn new(toolkit: Box<dyn Toolkit>) -> Self {
        Self {
            toolkit,
            components: ComponentArena::new(),
        }
    }

    pub fn toolkit(&self) -> &dyn Toolkit {
        self.toolkit.as_ref()
    }

    pub fn toolkit_mut(&mut self) -> &mut dyn Toolkit {
        self.toolkit.as_mut()
    }

    pub fn components(&self) -> &ComponentArena {
        &self.components
    }

    /// Look up a live component by uid. Linear scan, diagnostics and tests.
    pub fn find_by_uid(&self, uid: &str) -> Option<ComponentKey> {
        self.components
            .iter()
            .find(|(_, c)| c.uid() == uid)
            .map(|(key, _)| key)
    }

    /// Construct a component: create the native widget under the resolved
    /// parent, run variant setup, then store the back-reference — all before
    /// the handle becomes script-reachable. Unwinds on failure.
    pub fn construct(
        &mut self,
        spec: &'static WidgetSpec,
        uid: &str,
        parent: Option<ComponentKey>,
    ) -> Result<ComponentKey, BridgeError> {
        let parent_widget = match parent {
            Some(key) => self.live_widget(key)?,
            None => self.toolkit.root(),
        };

        let widget = (spec.create)(self.toolkit.as_mut(), parent_widget)?;
        let key = self.components.insert(Component::new(spec, uid, widget));
        if let Err(err) = self.toolkit.set_user_data(widget, Some(key.backref())) {
            self.components.remove(key);
            let _ = self.toolkit.destroy(widget);
            return Err(err.into());
        }

        debug!(kind = spec.kind.as_str(), uid, "component created");
        Ok(key)
    }

    /// Two-phase teardown shared by the GC finalizer and explicit destroy.
    ///
    /// Clears the back-reference first so no event can resolve to the dying
    /// component, runs the variant hook, then destroys the native widget —
    /// unless an ancestor teardown already took it, which the liveness query
    /// detects. Finalizing an already-removed key is a no-op.
    pub fn finalize(&mut self, key: ComponentKey) {
        let Some(mut component) = self.components.remove(key) else {
            return;
        };
        let widget = component.widget();
        if self.toolkit.is_valid(widget) {
            let _ = self.toolkit.set_user_data(widget, None);
        }
        (component.spec().on_destroy)(&mut component.state, self.toolkit.as_mut());
        if self.toolkit.is_valid(widget) {
            let _ = self.toolkit.destroy(widget);
        }
        // The freed key must not linger in any parent's bookkeeping: the arena
        // hands it out again.
        for (_, other) in self.components.iter_mut() {
            if let VariantState::Switch(state) = &mut other.state {
                state.remove(key);
            }
        }
        debug!(
            kind = component.kind().as_str(),
            uid = component.uid(),
            "component released"
        );
    }

    pub fn set_style(&mut self, key: ComponentKey, props: &StyleProps) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::SetStyle, "set_style")?;
        self.toolkit.set_style(widget, props)?;
        Ok(())
    }

    pub fn align(&mut self, key: ComponentKey, spec: AlignSpec) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::Align, "align")?;
        self.toolkit.align(widget, spec)?;
        Ok(())
    }

    pub fn align_to(
        &mut self,
        key: ComponentKey,
        target: ComponentKey,
        spec: AlignSpec,
    ) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::AlignTo, "align_to")?;
        let target_widget = self.live_widget(target)?;
        self.toolkit.align_to(widget, target_widget, spec)?;
        Ok(())
    }

    pub fn add_event_listener(
        &mut self,
        key: ComponentKey,
        kind: EventKind,
        callback: RegistryKey,
    ) -> Result<(), BridgeError> {
        self.require_live(key, Capability::AddEventListener, "add_event_listener")?;
        if let Some(component) = self.components.get_mut(key) {
            component.listeners.add(kind, callback);
            debug!(
                uid = component.uid(),
                kind = kind.as_str(),
                "listener registered"
            );
        }
        Ok(())
    }

    /// Reparent the child's widget under this component and track it in the
    /// variant's own bookkeeping.
    pub fn append_child(
        &mut self,
        parent: ComponentKey,
        child: ComponentKey,
    ) -> Result<(), BridgeError> {
        let parent_widget = self.require_live(parent, Capability::AppendChild, "append_child")?;
        let child_widget = self.live_widget(child)?;
        self.toolkit.reparent(child_widget, parent_widget)?;
        if let Some(component) = self.components.get_mut(parent) {
            if let VariantState::Switch(state) = &mut component.state {
                state.append(child);
            }
        }
        self.log_child_op(parent, child, "append child");
        Ok(())
    }

    /// Detach the child from this component, back to the root screen.
    pub fn remove_child(
        &mut self,
        parent: ComponentKey,
        child: ComponentKey,
    ) -> Result<(), BridgeError> {
        self.require_live(parent, Capability::RemoveChild, "remove_child")?;
        let child_widget = self.live_widget(child)?;
        let root = self.toolkit.root();
        self.toolkit.reparent(child_widget, root)?;
        if let Some(component) = self.components.get_mut(parent) {
            if let VariantState::Switch(state) = &mut component.state {
                state.remove(child);
            }
        }
        self.log_child_op(parent, child, "remove child");
        Ok(())
    }

    pub fn set_checked(&mut self, key: ComponentKey, checked: bool) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::Checked, "set_checked")?;
        self.toolkit.set_checked(widget, checked)?;
        Ok(())
    }

    pub fn checked(&self, key: ComponentKey) -> Result<bool, BridgeError> {
        let widget = self.require_live(key, Capability::Checked, "checked")?;
        Ok(self.toolkit.checked(widget).unwrap_or(false))
    }

    pub fn set_today(&mut self, key: ComponentKey, date: CalendarDate) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::Calendar, "set_today")?;
        self.toolkit.set_calendar_today(widget, date)?;
        Ok(())
    }

    pub fn set_shown_month(
        &mut self,
        key: ComponentKey,
        year: u16,
        month: u8,
    ) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::Calendar, "set_shown_month")?;
        self.toolkit.set_calendar_shown_month(widget, year, month)?;
        Ok(())
    }

    pub fn set_highlight_dates(
        &mut self,
        key: ComponentKey,
        dates: Vec<CalendarDate>,
    ) -> Result<(), BridgeError> {
        let widget = self.require_live(key, Capability::Calendar, "set_highlight_dates")?;
        self.toolkit.set_calendar_highlights(widget, &dates)?;
        if let Some(component) = self.components.get_mut(key) {
            if let VariantState::Calendar(state) = &mut component.state {
                state.set_highlights(dates);
            }
        }
        Ok(())
    }

    fn component(&self, key: ComponentKey) -> Result<&Component, BridgeError> {
        // A handle clears its key in the same step that removes the slot, so a
        // missing slot here means a caller bypassed the handle layer.
        self.components.get(key).ok_or(BridgeError::UseAfterFree {
            kind: "component",
            uid: format!("#{}", key.index()),
        })
    }

    fn live_widget(&self, key: ComponentKey) -> Result<WidgetId, BridgeError> {
        let component = self.component(key)?;
        let widget = component.widget();
        if !self.toolkit.is_valid(widget) {
            return Err(BridgeError::ToolkitInvalidState {
                kind: component.kind().as_str(),
                uid: component.uid().to_string(),
            });
        }
        Ok(widget)
    }

    fn require_live(
        &self,
        key: ComponentKey,
        capability: Capability,
        op: &'static str,
    ) -> Result<WidgetId, BridgeError> {
        let component = self.component(key)?;
        if !component.supports(capability) {
            return Err(BridgeError::UnsupportedOperation {
                op,
                kind: component.kind().as_str(),
            });
        }
        self.live_widget(key)
    }

    fn log_child_op(&self, parent: ComponentKey, child: ComponentKey, op: &'static str) {
        if let (Some(p), Some(c)) = (self.components.get(parent), self.components.get(child)) {
            debug!(parent_uid = p.uid(), child_uid = c.uid(), "{op}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{CALENDAR_SPEC, SWITCH_SPEC};
    use trellis_toolkit::{HeadlessToolkit, WidgetKind};

    fn bridge() -> Bridge {
        Bridge::new(Box::new(HeadlessToolkit::new()))
    }

    #[test]
    fn test_construct_sets_back_reference() {
        let mut bridge = bridge();
        let key = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();

        let widget = bridge.components().get(key).unwrap().widget();
        assert!(bridge.toolkit().is_valid(widget));
        assert_eq!(bridge.toolkit().user_data(widget), Some(key.backref()));
        assert_eq!(bridge.toolkit().parent(widget), Some(bridge.toolkit().root()));
    }

    #[test]
    fn test_calendar_construct_creates_headers() {
        let mut bridge = bridge();
        let key = bridge.construct(&CALENDAR_SPEC, "cal1", None).unwrap();

        let widget = bridge.components().get(key).unwrap().widget();
        assert_eq!(bridge.toolkit().children(widget).len(), 2);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut bridge = bridge();
        let key = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        let widget = bridge.components().get(key).unwrap().widget();

        bridge.finalize(key);
        assert!(!bridge.toolkit().is_valid(widget));
        assert!(bridge.components().is_empty());

        // Second finalize is a no-op, not a crash.
        bridge.finalize(key);
        assert!(bridge.components().is_empty());
    }

    #[test]
    fn test_mutation_after_finalize_fails() {
        let mut bridge = bridge();
        let key = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        bridge.finalize(key);

        let err = bridge.align(key, AlignSpec::new(trellis_toolkit::Align::Center));
        assert!(matches!(err, Err(BridgeError::UseAfterFree { .. })));
    }

    #[test]
    fn test_append_and_remove_child() {
        let mut bridge = bridge();
        let parent = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        let child = bridge.construct(&SWITCH_SPEC, "s2", None).unwrap();
        let parent_widget = bridge.components().get(parent).unwrap().widget();
        let child_widget = bridge.components().get(child).unwrap().widget();

        bridge.append_child(parent, child).unwrap();
        assert_eq!(bridge.toolkit().parent(child_widget), Some(parent_widget));
        match bridge.components().get(parent).unwrap().state() {
            VariantState::Switch(state) => assert_eq!(state.children(), &[child]),
            other => panic!("unexpected state: {other:?}"),
        }

        bridge.remove_child(parent, child).unwrap();
        assert_eq!(
            bridge.toolkit().parent(child_widget),
            Some(bridge.toolkit().root())
        );
        match bridge.components().get(parent).unwrap().state() {
            VariantState::Switch(state) => assert!(state.children().is_empty()),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_child_finalize_prunes_parent_bookkeeping() {
        let mut bridge = bridge();
        let parent = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        let child = bridge.construct(&SWITCH_SPEC, "s2", None).unwrap();
        bridge.append_child(parent, child).unwrap();

        bridge.finalize(child);
        let parent_widget = bridge.components().get(parent).unwrap().widget();
        assert!(bridge.toolkit().children(parent_widget).is_empty());
        match bridge.components().get(parent).unwrap().state() {
            VariantState::Switch(state) => assert!(state.children().is_empty()),
            other => panic!("unexpected state: {other:?}"),
        }

        // A component reusing the freed slot is tracked as a fresh child, in
        // scene-graph order.
        let next = bridge.construct(&SWITCH_SPEC, "s3", None).unwrap();
        assert_eq!(next, child);
        bridge.append_child(parent, next).unwrap();
        let next_widget = bridge.components().get(next).unwrap().widget();
        assert_eq!(bridge.toolkit().children(parent_widget), vec![next_widget]);
        match bridge.components().get(parent).unwrap().state() {
            VariantState::Switch(state) => assert_eq!(state.children(), &[next]),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_append_child_on_calendar_unsupported() {
        let mut bridge = bridge();
        let calendar = bridge.construct(&CALENDAR_SPEC, "cal1", None).unwrap();
        let child = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();

        let err = bridge.append_child(calendar, child);
        assert!(matches!(
            err,
            Err(BridgeError::UnsupportedOperation { op: "append_child", .. })
        ));
    }

    #[test]
    fn test_ancestor_destroy_leaves_component_detectable() {
        let mut bridge = bridge();
        let parent = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        let child = bridge.construct(&SWITCH_SPEC, "s2", parent.into()).unwrap();
        let child_widget = bridge.components().get(child).unwrap().widget();

        // Finalizing the parent tears its subtree down inside the toolkit.
        bridge.finalize(parent);
        assert!(!bridge.toolkit().is_valid(child_widget));
        assert!(bridge.components().get(child).is_some());

        // The orphaned component reports invalid state on mutation, eagerly.
        let err = bridge.set_style(child, &vec![]);
        assert!(matches!(err, Err(BridgeError::ToolkitInvalidState { .. })));

        // Its own finalize skips the redundant destruction.
        bridge.finalize(child);
        assert!(bridge.components().is_empty());
    }

    #[test]
    fn test_construct_under_finalized_parent_fails_clean() {
        let mut bridge = bridge();
        let parent = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        bridge.finalize(parent);

        let err = bridge.construct(&SWITCH_SPEC, "s2", Some(parent));
        assert!(matches!(err, Err(BridgeError::UseAfterFree { .. })));
        assert!(bridge.components().is_empty());
        // Only the root screen remains.
        assert!(bridge.toolkit().children(bridge.toolkit().root()).is_empty());
    }

    #[test]
    fn test_highlight_dates_kept_in_variant_state() {
        let mut bridge = bridge();
        let key = bridge.construct(&CALENDAR_SPEC, "cal1", None).unwrap();
        let dates = vec![CalendarDate {
            year: 2024,
            month: 3,
            day: 10,
        }];

        bridge.set_highlight_dates(key, dates.clone()).unwrap();
        let widget = bridge.components().get(key).unwrap().widget();
        assert_eq!(bridge.toolkit().calendar_highlights(widget), dates);
        match bridge.components().get(key).unwrap().state() {
            VariantState::Calendar(state) => assert_eq!(state.highlights(), dates.as_slice()),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_checked_round_trip_and_capability() {
        let mut bridge = bridge();
        let switch = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        let calendar = bridge.construct(&CALENDAR_SPEC, "cal1", None).unwrap();

        assert!(!bridge.checked(switch).unwrap());
        bridge.set_checked(switch, true).unwrap();
        assert!(bridge.checked(switch).unwrap());

        let err = bridge.set_checked(calendar, true);
        assert!(matches!(
            err,
            Err(BridgeError::UnsupportedOperation { op: "set_checked", .. })
        ));
    }

    #[test]
    fn test_kind_discriminator() {
        let mut bridge = bridge();
        let key = bridge.construct(&SWITCH_SPEC, "s1", None).unwrap();
        assert_eq!(
            bridge.components().get(key).unwrap().kind(),
            WidgetKind::Switch
        );
        assert_eq!(bridge.find_by_uid("s1"), Some(key));
        assert_eq!(bridge.find_by_uid("nope"), None);
    }
}
