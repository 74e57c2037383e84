use super::convert;
use crate::SharedBridge;
use crate::component::ComponentKey;
use crate::error::BridgeError;
use mlua::{Function, Table, UserData, UserDataFields, UserDataMethods, Value};
use std::cell::Cell;
use tracing::debug;
use trellis_toolkit::EventKind;

/// The script-visible wrapper around one component.
///
/// Holds the component key and a shared reference to the bridge; the Lua GC
/// collecting this userdata is the finalize trigger. `key` goes to `None` on
/// the first finalize, which is what makes the second one a no-op and turns
/// any later operation into a use-after-free error instead of a crash.
pub struct LuaHandle {
    kind: &'static str,
    uid: String,
    key: Cell<Option<ComponentKey>>,
    bridge: SharedBridge,
}

impl LuaHandle {
    pub(crate) fn new(
        kind: &'static str,
        uid: String,
        key: ComponentKey,
        bridge: SharedBridge,
    ) -> Self {
        Self {
            kind,
            uid,
            key: Cell::new(Some(key)),
            bridge,
        }
    }

    pub(crate) fn require_key(&self) -> Result<ComponentKey, BridgeError> {
        self.key.get().ok_or_else(|| BridgeError::UseAfterFree {
            kind: self.kind,
            uid: self.uid.clone(),
        })
    }

    fn finalize(&self) {
        if let Some(key) = self.key.take() {
            debug!(kind = self.kind, uid = %self.uid, "handle finalized");
            self.bridge.borrow_mut().finalize(key);
        }
    }
}

impl Drop for LuaHandle {
    // The GC path; explicit destroy() goes through the same routine.
    fn drop(&mut self) {
        self.finalize();
    }
}

impl UserData for LuaHandle {
    fn add_fields<F: UserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("uid", |_lua, this| Ok(this.uid.clone()));
        fields.add_field_method_get("kind", |_lua, this| Ok(this.kind));
    }

    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("set_style", |_lua, this, props: Table| {
            let key = this.require_key()?;
            let style = convert::style_from_table(&props)?;
            this.bridge.borrow_mut().set_style(key, &style)?;
            Ok(())
        });

        methods.add_method(
            "add_event_listener",
            |lua, this, (kind, callback): (String, Function)| {
                let key = this.require_key()?;
                let event_kind = EventKind::parse(&kind).ok_or_else(|| {
                    mlua::Error::from(BridgeError::Configuration(format!(
                        "unknown event kind: {kind}"
                    )))
                })?;
                let registry_key = lua.create_registry_value(callback)?;
                this.bridge
                    .borrow_mut()
                    .add_event_listener(key, event_kind, registry_key)?;
                Ok(())
            },
        );

        methods.add_method("align", |_lua, this, spec: Table| {
            let key = this.require_key()?;
            let spec = convert::align_spec_from_table(&spec)?;
            this.bridge.borrow_mut().align(key, spec)?;
            Ok(())
        });

        methods.add_method("align_to", |_lua, this, (target, spec): (Value, Table)| {
            let key = this.require_key()?;
            let target_key = convert::handle_key(&target)?;
            let spec = convert::align_spec_from_table(&spec)?;
            this.bridge.borrow_mut().align_to(key, target_key, spec)?;
            Ok(())
        });

        methods.add_method("append_child", |_lua, this, child: Value| {
            let key = this.require_key()?;
            let child_key = convert::handle_key(&child)?;
            this.bridge.borrow_mut().append_child(key, child_key)?;
            Ok(())
        });

        methods.add_method("remove_child", |_lua, this, child: Value| {
            let key = this.require_key()?;
            let child_key = convert::handle_key(&child)?;
            this.bridge.borrow_mut().remove_child(key, child_key)?;
            Ok(())
        });

        // Explicit teardown, same routine the GC finalizer runs.
        methods.add_method("destroy", |_lua, this, ()| {
            this.finalize();
            Ok(())
        });

        methods.add_method("set_checked", |_lua, this, checked: bool| {
            let key = this.require_key()?;
            this.bridge.borrow_mut().set_checked(key, checked)?;
            Ok(())
        });

        methods.add_method("checked", |_lua, this, ()| {
            let key = this.require_key()?;
            Ok(this.bridge.borrow().checked(key)?)
        });

        methods.add_method("set_today", |_lua, this, (year, month, day): (u16, u8, u8)| {
            let key = this.require_key()?;
            this.bridge.borrow_mut().set_today(
                key,
                trellis_toolkit::CalendarDate { year, month, day },
            )?;
            Ok(())
        });

        methods.add_method("set_shown_month", |_lua, this, (year, month): (u16, u8)| {
            let key = this.require_key()?;
            this.bridge.borrow_mut().set_shown_month(key, year, month)?;
            Ok(())
        });

        methods.add_method("set_highlight_dates", |_lua, this, dates: Vec<Table>| {
            let key = this.require_key()?;
            let dates = dates
                .iter()
                .map(convert::date_from_table)
                .collect::<mlua::Result<Vec<_>>>()?;
            this.bridge.borrow_mut().set_highlight_dates(key, dates)?;
            Ok(())
        });
    }
}
