use super::Component;
use trellis_toolkit::BackRef;

/// Stable identifier for a component slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey(pub(crate) u32);

impl ComponentKey {
    /// The value stored in the native widget's user-data slot.
    pub(crate) fn backref(self) -> BackRef {
        BackRef(self.0)
    }

    pub(crate) fn from_backref(backref: BackRef) -> Self {
        ComponentKey(backref.0)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// Slot storage for live components, with slot reuse.
pub struct ComponentArena {
    slots: Vec<Option<Component>>,
    free_list: Vec<u32>,
}

impl ComponentArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn insert(&mut self, component: Component) -> ComponentKey {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(component);
            ComponentKey(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Some(component));
            ComponentKey(idx)
        }
    }

    pub fn get(&self, key: ComponentKey) -> Option<&Component> {
        self.slots.get(key.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, key: ComponentKey) -> Option<&mut Component> {
        self.slots.get_mut(key.0 as usize)?.as_mut()
    }

    pub fn remove(&mut self, key: ComponentKey) -> Option<Component> {
        let slot = self.slots.get_mut(key.0 as usize)?;
        let component = slot.take();
        if component.is_some() {
            self.free_list.push(key.0);
        }
        component
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentKey, &Component)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (ComponentKey(idx as u32), c)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ComponentKey, &mut Component)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|c| (ComponentKey(idx as u32), c)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ComponentArena {
    fn default() -> Self {
        Self::new()
    }
}
