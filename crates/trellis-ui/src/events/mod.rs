//! Event routing from the toolkit back into script listeners.

use crate::SharedBridge;
use crate::component::ComponentKey;
use mlua::{Function, Lua, RegistryKey, Table};
use smartstring::{LazyCompact, SmartString};
use std::rc::Rc;
use tracing::{error, trace};
use trellis_toolkit::{EventKind, EventValue, ToolkitEvent};

/// Listener registrations for one component, ordered per event kind.
///
/// Registration order is invocation order. Keys are shared so an in-flight
/// dispatch keeps its snapshot alive even if the component is finalized by one
/// of its own listeners; mlua reclaims the referenced functions on a later GC
/// cycle.
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<(EventKind, Rc<RegistryKey>)>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: EventKind, key: RegistryKey) {
        self.entries.push((kind, Rc::new(key)));
    }

    pub fn for_kind(&self, kind: EventKind) -> impl Iterator<Item = &Rc<RegistryKey>> {
        self.entries
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, key)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drain the toolkit queue and deliver every event to its script listeners.
///
/// Returns the number of listener invocations, counting listeners that raised.
pub fn dispatch_pending(lua: &Lua, bridge: &SharedBridge) -> mlua::Result<usize> {
    let events = bridge.borrow_mut().toolkit_mut().drain_events();
    let mut delivered = 0;
    for event in &events {
        delivered += dispatch_one(lua, bridge, event)?;
    }
    Ok(delivered)
}

fn dispatch_one(lua: &Lua, bridge: &SharedBridge, event: &ToolkitEvent) -> mlua::Result<usize> {
    // Snapshot listeners under the borrow, then release it before touching the
    // Lua state: a listener may mutate or finalize components, and a Lua
    // allocation can collect a handle whose finalizer re-borrows the bridge.
    let (uid, keys): (SmartString<LazyCompact>, Vec<Rc<RegistryKey>>) = {
        let state = bridge.borrow();
        let Some(backref) = state.toolkit().user_data(event.target) else {
            // Expected during teardown, not an error.
            trace!(
                widget = event.target.index(),
                kind = event.kind.as_str(),
                "dropping event for detached widget"
            );
            return Ok(0);
        };
        let Some(component) = state.components().get(ComponentKey::from_backref(backref)) else {
            trace!(
                widget = event.target.index(),
                kind = event.kind.as_str(),
                "dropping event with stale back-reference"
            );
            return Ok(0);
        };
        let keys = component.listeners.for_kind(event.kind).cloned().collect();
        (component.uid().into(), keys)
    };

    if keys.is_empty() {
        return Ok(0);
    }

    let payload = build_payload(lua, &uid, event)?;
    let mut delivered = 0;
    for key in keys {
        let callback: Function = lua.registry_value(&key)?;
        // A listener raising must not stop later listeners, and the error must
        // never cross back into the native event loop.
        if let Err(err) = callback.call::<()>(&payload) {
            error!(
                uid = %uid,
                kind = event.kind.as_str(),
                error = %err,
                "event listener failed"
            );
        }
        delivered += 1;
    }
    Ok(delivered)
}

/// The payload table handed to listeners; lives only for the dispatch.
fn build_payload(lua: &Lua, uid: &str, event: &ToolkitEvent) -> mlua::Result<Table> {
    let payload = lua.create_table()?;
    payload.set("target", uid)?;
    payload.set("kind", event.kind.as_str())?;
    match &event.value {
        EventValue::None => {}
        EventValue::Checked(checked) => payload.set("checked", *checked)?,
        EventValue::Date(date) => {
            let value = lua.create_table()?;
            value.set("year", date.year)?;
            value.set("month", date.month)?;
            value.set("day", date.day)?;
            payload.set("date", value)?;
        }
    }
    Ok(payload)
}
