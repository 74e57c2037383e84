mod convert;
mod handle;

pub use handle::LuaHandle;

use crate::SharedBridge;
use crate::component::{CALENDAR_SPEC, SWITCH_SPEC, WidgetSpec};
use crate::error::BridgeError;
use mlua::{Lua, Result, Table, Value};

/// Register one constructor per widget kind on the given table (the `trellis`
/// global).
pub fn register_ui_module(lua: &Lua, table: &Table, bridge: SharedBridge) -> Result<()> {
    register_constructor(lua, table, &SWITCH_SPEC, bridge.clone())?;
    register_constructor(lua, table, &CALENDAR_SPEC, bridge)?;
    Ok(())
}

fn register_constructor(
    lua: &Lua,
    table: &Table,
    spec: &'static WidgetSpec,
    bridge: SharedBridge,
) -> Result<()> {
    let constructor = lua.create_function(move |_lua, (config, parent): (Table, Option<Value>)| {
        let uid = read_uid(&config)?;
        let parent_key = match &parent {
            None | Some(Value::Nil) => None,
            Some(value) => Some(convert::handle_key(value)?),
        };
        let key = bridge.borrow_mut().construct(spec, &uid, parent_key)?;
        Ok(LuaHandle::new(spec.kind.as_str(), uid, key, bridge.clone()))
    })?;
    table.set(spec.kind.as_str(), constructor)?;
    Ok(())
}

/// The uid is duplicated out of the configuration table; the source value is
/// not required to outlive the constructor call.
fn read_uid(config: &Table) -> Result<String> {
    match config.get::<Value>("uid")? {
        Value::String(s) => Ok(s.to_str()?.to_string()),
        other => Err(BridgeError::Configuration(format!(
            "uid must be a string, got {}",
            other.type_name()
        ))
        .into()),
    }
}
