use crate::bridge::Bridge;
use crate::{SharedBridge, events};
use mlua::Lua;
use std::cell::RefCell;
use std::rc::Rc;
use trellis_toolkit::{HeadlessToolkit, Toolkit};

/// Owns the Lua state and the bridge over one toolkit.
///
/// Everything runs on the caller's thread: construction, mutation, event
/// dispatch, and finalization all happen inside Lua calls or [`App::tick`].
pub struct App {
    lua: Lua,
    bridge: SharedBridge,
}

impl App {
    pub fn new() -> mlua::Result<Self> {
        Self::with_toolkit(Box::new(HeadlessToolkit::new()))
    }

    pub fn with_toolkit(toolkit: Box<dyn Toolkit>) -> mlua::Result<Self> {
        let lua = Lua::new();
        let bridge: SharedBridge = Rc::new(RefCell::new(Bridge::new(toolkit)));

        let module = lua.create_table()?;
        crate::lua::register_ui_module(&lua, &module, bridge.clone())?;
        lua.globals().set("trellis", module)?;

        Ok(Self { lua, bridge })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    pub fn bridge(&self) -> &SharedBridge {
        &self.bridge
    }

    /// Deliver queued toolkit events to script listeners. Returns the number
    /// of listener invocations.
    pub fn tick(&mut self) -> mlua::Result<usize> {
        events::dispatch_pending(&self.lua, &self.bridge)
    }
}
