//! Host-side widget models.
//!
//! A [`WidgetModel`] is the attribute store a host keeps for every plot
//! object. Attributes are JSON values; setting one records a
//! `change:<attr>` event, notifies subscribers and marks the attribute
//! dirty until the next [`WidgetModel::touch`]. Models refer to each other
//! with `IPY_MODEL_<id>` strings which the [`ModelStore`] resolves.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::error::{PlotError, Result};

/// Prefix of serialized model references.
pub const MODEL_REF_PREFIX: &str = "IPY_MODEL_";

type AttributeListener = Box<dyn FnMut(&str, &Json) + Send>;

/// Attribute store of one widget.
pub struct WidgetModel {
    id: String,
    model_name: String,
    state: Map<String, Json>,
    dirty: BTreeSet<String>,
    events: Vec<String>,
    listeners: BTreeMap<String, Vec<AttributeListener>>,
}

impl WidgetModel {
    pub fn new(id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_name: model_name.into(),
            state: Map::new(),
            dirty: BTreeSet::new(),
            events: Vec::new(),
            listeners: BTreeMap::new(),
        }
    }

    /// Seed initial state without recording changes.
    pub fn with_state(mut self, state: Map<String, Json>) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn state(&self) -> &Map<String, Json> {
        &self.state
    }

    pub fn get(&self, attr: &str) -> Option<&Json> {
        self.state.get(attr).filter(|value| !value.is_null())
    }

    /// Deserialize an attribute; `None` when it is absent or `null`.
    pub fn get_as<T: DeserializeOwned>(&self, attr: &str) -> Result<Option<T>> {
        let Some(value) = self.get(attr) else {
            return Ok(None);
        };
        T::deserialize(value)
            .map(Some)
            .map_err(|err| PlotError::InvalidAttribute {
                name: attr.to_string(),
                reason: err.to_string(),
            })
    }

    /// Set an attribute. Returns `false` when the value is unchanged.
    pub fn set(&mut self, attr: &str, value: Json) -> bool {
        if self.state.get(attr) == Some(&value) {
            return false;
        }
        tracing::trace!(model = %self.id, attr, "widget attribute changed");
        if let Some(listeners) = self.listeners.get_mut(attr) {
            for listener in listeners.iter_mut() {
                listener(attr, &value);
            }
        }
        self.state.insert(attr.to_string(), value);
        self.dirty.insert(attr.to_string());
        self.events.push(format!("change:{attr}"));
        true
    }

    /// Call `listener` whenever `attr` changes.
    pub fn subscribe(&mut self, attr: &str, listener: impl FnMut(&str, &Json) + Send + 'static) {
        self.listeners
            .entry(attr.to_string())
            .or_default()
            .push(Box::new(listener));
    }

    /// Drain the recorded `change:<attr>` events.
    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    /// Attributes changed since the last touch, to be synced to the host.
    pub fn touch(&mut self) -> Vec<String> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl std::fmt::Debug for WidgetModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetModel")
            .field("id", &self.id)
            .field("model_name", &self.model_name)
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct SerializedModel {
    model_name: String,
    #[serde(default)]
    state: Map<String, Json>,
}

/// All widget models of a session, keyed by id.
#[derive(Debug, Default)]
pub struct ModelStore {
    models: BTreeMap<String, WidgetModel>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "<id>": { "model_name": ..., "state": {...} } }`.
    pub fn from_json(value: &Json) -> Result<Self> {
        let serialized: BTreeMap<String, SerializedModel> = serde_json::from_value(value.clone())?;
        let mut store = Self::new();
        for (id, model) in serialized {
            store.insert(WidgetModel::new(id, model.model_name).with_state(model.state));
        }
        Ok(store)
    }

    pub fn insert(&mut self, model: WidgetModel) {
        self.models.insert(model.id().to_string(), model);
    }

    pub fn get(&self, id: &str) -> Result<&WidgetModel> {
        self.models
            .get(id)
            .ok_or_else(|| PlotError::UnknownModel(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut WidgetModel> {
        self.models
            .get_mut(id)
            .ok_or_else(|| PlotError::UnknownModel(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetModel> {
        self.models.values()
    }

    /// Resolve an `IPY_MODEL_<id>` reference to the model it names.
    pub fn resolve(&self, reference: &Json) -> Result<&WidgetModel> {
        let text = reference.as_str().unwrap_or_default();
        let id = text
            .strip_prefix(MODEL_REF_PREFIX)
            .ok_or_else(|| PlotError::DanglingReference(reference.to_string()))?;
        self.models
            .get(id)
            .ok_or_else(|| PlotError::DanglingReference(text.to_string()))
    }

    /// Resolve a reference attribute of `model`; `None` when unset.
    pub fn resolve_attr(&self, model: &WidgetModel, attr: &str) -> Result<Option<&WidgetModel>> {
        model.get(attr).map(|value| self.resolve(value)).transpose()
    }

    /// Resolve a list of references.
    pub fn resolve_list(&self, model: &WidgetModel, attr: &str) -> Result<Vec<&WidgetModel>> {
        match model.get(attr) {
            None => Ok(Vec::new()),
            Some(Json::Array(items)) => items.iter().map(|item| self.resolve(item)).collect(),
            Some(_) => Err(PlotError::InvalidAttribute {
                name: attr.to_string(),
                reason: "expected a list of model references".to_string(),
            }),
        }
    }

    /// Resolve a `{name: reference}` map.
    pub fn resolve_map(
        &self,
        model: &WidgetModel,
        attr: &str,
    ) -> Result<Vec<(String, &WidgetModel)>> {
        match model.get(attr) {
            None => Ok(Vec::new()),
            Some(Json::Object(entries)) => entries
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| Ok((key.clone(), self.resolve(value)?)))
                .collect(),
            Some(_) => Err(PlotError::InvalidAttribute {
                name: attr.to_string(),
                reason: "expected a map of model references".to_string(),
            }),
        }
    }

    /// Dirty attributes of every model, clearing them.
    pub fn touch_all(&mut self) -> Vec<(String, Vec<String>)> {
        self.models
            .values_mut()
            .filter(|model| model.is_dirty())
            .map(|model| (model.id().to_string(), model.touch()))
            .collect()
    }
}

/// Serialize a model id as a reference.
pub fn model_ref(id: &str) -> Json {
    Json::String(format!("{MODEL_REF_PREFIX}{id}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[test]
    fn set_records_changes_and_touch_clears() {
        let mut model = WidgetModel::new("a", "ScatterModel");
        assert!(model.set("x", json!([1, 2])));
        assert!(!model.set("x", json!([1, 2])));
        model.set("visible", json!(false));
        assert_eq!(model.take_events(), vec!["change:x", "change:visible"]);
        assert_eq!(model.touch(), vec!["visible".to_string(), "x".to_string()]);
        assert!(model.touch().is_empty());
    }

    #[test]
    fn subscribers_see_new_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut model = WidgetModel::new("a", "LinearScaleModel");
        model.subscribe("min", move |_, value| sink.lock().unwrap().push(value.clone()));
        model.set("min", json!(3.0));
        model.set("max", json!(4.0));
        assert_eq!(*seen.lock().unwrap(), vec![json!(3.0)]);
    }

    #[test]
    fn typed_get_reports_attribute() {
        let model = WidgetModel::new("a", "AxisModel")
            .with_state(json!({"label": 5, "side": null}).as_object().unwrap().clone());
        assert_eq!(model.get_as::<String>("side").unwrap(), None);
        assert!(matches!(
            model.get_as::<String>("label"),
            Err(PlotError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn store_resolves_references() {
        let store = ModelStore::from_json(&json!({
            "s": {"model_name": "LinearScaleModel"},
            "m": {"model_name": "ScatterModel", "state": {
                "scales": {"x": "IPY_MODEL_s"},
                "axes": ["IPY_MODEL_missing"]
            }}
        }))
        .unwrap();
        let mark = store.get("m").unwrap();
        let scales = store.resolve_map(mark, "scales").unwrap();
        assert_eq!(scales[0].0, "x");
        assert_eq!(scales[0].1.model_name(), "LinearScaleModel");
        assert!(matches!(
            store.resolve_list(mark, "axes"),
            Err(PlotError::DanglingReference(_))
        ));
        assert!(matches!(
            store.resolve(&json!("s")),
            Err(PlotError::DanglingReference(_))
        ));
        assert_eq!(model_ref("s"), json!("IPY_MODEL_s"));
    }
}
