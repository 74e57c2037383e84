//! Lua-facing widget bridge.
//!
//! Script code constructs widget wrappers through the `trellis` module; each
//! wrapper is a userdata [`lua::LuaHandle`] owning exactly one
//! [`component::Component`], which in turn owns the destruction of one native
//! widget. The Lua garbage collector finalizing the userdata is what tears the
//! whole chain down.

pub mod app;
pub mod bridge;
pub mod component;
pub mod error;
pub mod events;
pub mod lua;

use std::cell::RefCell;
use std::rc::Rc;

pub use app::App;
pub use bridge::Bridge;
pub use error::BridgeError;
pub use lua::register_ui_module;

/// Shared reference to the bridge state (single-threaded, interior mutability).
pub type SharedBridge = Rc<RefCell<Bridge>>;
