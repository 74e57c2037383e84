//! Conversions between Lua values and toolkit types.

use crate::component::ComponentKey;
use crate::error::BridgeError;
use crate::lua::LuaHandle;
use mlua::{Table, Value};
use trellis_toolkit::{Align, AlignSpec, CalendarDate, StyleProps, StyleValue};

/// Capability check for operation arguments: the value must be one of our own
/// wrapped handles, and that handle must still be live.
pub(crate) fn handle_key(value: &Value) -> Result<ComponentKey, BridgeError> {
    let Value::UserData(ud) = value else {
        return Err(BridgeError::TypeMismatch {
            got: value.type_name().to_string(),
        });
    };
    let Ok(handle) = ud.borrow::<LuaHandle>() else {
        return Err(BridgeError::TypeMismatch {
            got: "foreign userdata".to_string(),
        });
    };
    handle.require_key()
}

pub(crate) fn style_from_table(props: &Table) -> mlua::Result<StyleProps> {
    let mut style = StyleProps::new();
    for entry in props.pairs::<String, Value>() {
        let (name, value) = entry?;
        let value = match value {
            Value::Integer(n) => StyleValue::Px(n as i32),
            Value::Number(n) => StyleValue::Px(n as i32),
            Value::String(s) => StyleValue::Text(s.to_str()?.to_string()),
            Value::Boolean(b) => StyleValue::Flag(b),
            other => {
                return Err(BridgeError::Configuration(format!(
                    "style property {name} has unsupported type {}",
                    other.type_name()
                ))
                .into());
            }
        };
        style.push((name, value));
    }
    Ok(style)
}

pub(crate) fn align_spec_from_table(spec: &Table) -> mlua::Result<AlignSpec> {
    let name: String = spec.get("align")?;
    let align = Align::parse(&name).ok_or_else(|| {
        mlua::Error::from(BridgeError::Configuration(format!(
            "unknown alignment: {name}"
        )))
    })?;
    Ok(AlignSpec {
        align,
        x_ofs: spec.get::<Option<i32>>("x")?.unwrap_or(0),
        y_ofs: spec.get::<Option<i32>>("y")?.unwrap_or(0),
    })
}

pub(crate) fn date_from_table(date: &Table) -> mlua::Result<CalendarDate> {
    Ok(CalendarDate {
        year: date.get("year")?,
        month: date.get("month")?,
        day: date.get("day")?,
    })
}
