use super::{Capability, ComponentKey, VariantState, WidgetSpec};
use crate::error::BridgeError;
use smallvec::SmallVec;
use trellis_toolkit::{Toolkit, WidgetId, WidgetKind};

/// Ordered child bookkeeping beyond what the scene graph alone records.
#[derive(Debug, Default)]
pub struct SwitchState {
    children: SmallVec<[ComponentKey; 4]>,
}

impl SwitchState {
    pub fn append(&mut self, child: ComponentKey) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    /// Returns false if the child was not tracked.
    pub fn remove(&mut self, child: ComponentKey) -> bool {
        match self.children.iter().position(|c| *c == child) {
            Some(idx) => {
                self.children.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> &[ComponentKey] {
        &self.children
    }
}

fn create(toolkit: &mut dyn Toolkit, parent: WidgetId) -> Result<WidgetId, BridgeError> {
    Ok(toolkit.create(WidgetKind::Switch, parent)?)
}

fn init_state() -> VariantState {
    VariantState::Switch(SwitchState::default())
}

fn on_destroy(state: &mut VariantState, _toolkit: &mut dyn Toolkit) {
    if let VariantState::Switch(switch) = state {
        switch.children.clear();
    }
}

pub static SWITCH_SPEC: WidgetSpec = WidgetSpec {
    kind: WidgetKind::Switch,
    capabilities: &[
        Capability::SetStyle,
        Capability::AddEventListener,
        Capability::Align,
        Capability::AlignTo,
        Capability::AppendChild,
        Capability::RemoveChild,
        Capability::Checked,
    ],
    create,
    init_state,
    on_destroy,
};
