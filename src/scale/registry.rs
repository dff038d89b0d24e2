use std::collections::BTreeMap;

use super::model::{ScaleId, ScaleModel};
use super::pixel::PixelScale;

/// Owner of every scale model used by one figure.
#[derive(Debug, Clone, Default)]
pub struct ScaleRegistry {
    scales: BTreeMap<ScaleId, ScaleModel>,
}

impl ScaleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a scale model.
    pub fn insert(&mut self, model: ScaleModel) -> ScaleId {
        let id = model.id();
        self.scales.insert(id, model);
        id
    }

    /// Remove a scale model.
    pub fn remove(&mut self, id: ScaleId) -> Option<ScaleModel> {
        self.scales.remove(&id)
    }

    /// Access a scale model.
    pub fn get(&self, id: ScaleId) -> Option<&ScaleModel> {
        self.scales.get(&id)
    }

    /// Access a scale model mutably.
    pub fn get_mut(&mut self, id: ScaleId) -> Option<&mut ScaleModel> {
        self.scales.get_mut(&id)
    }

    /// Check whether the registry owns a scale.
    pub fn contains(&self, id: ScaleId) -> bool {
        self.scales.contains_key(&id)
    }

    /// Create a fresh view of a scale.
    pub fn view(&self, id: ScaleId) -> Option<PixelScale> {
        self.get(id).map(PixelScale::new)
    }

    /// Iterate over all scale models.
    pub fn iter(&self) -> impl Iterator<Item = &ScaleModel> {
        self.scales.values()
    }

    /// Number of scales.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}
