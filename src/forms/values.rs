//! Live form values, keyed by field name.
//!
//! Names may be dotted paths (`vitalSigns.heartRate`): they stay flat while
//! the form is being edited and are expanded into nested objects on submit.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::FormError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K: Into<String>, V: Into<String>>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Flattens a JSON object into dotted keys. Scalars become text,
    /// `null` is skipped and arrays are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        let mut values = Self::new();
        if let Value::Object(map) = value {
            flatten_into(&mut values.0, "", map);
        }
        values
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// A copy holding only `names`.
    pub fn restricted_to(&self, names: &[String]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| names.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Builds the nested submission object from `(name, value)` pairs.
    pub fn expand<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Value, FormError> {
        let mut root = Map::new();

        for (name, value) in entries {
            let mut segments: Vec<&str> = name.split('.').collect();
            let leaf = segments.pop().unwrap_or(name);

            let mut cursor = &mut root;
            for segment in segments {
                let slot = cursor
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                cursor = match slot {
                    Value::Object(inner) => inner,
                    _ => return Err(FormError::ConflictingPath(name.to_string())),
                };
            }

            if cursor.contains_key(leaf) {
                return Err(FormError::ConflictingPath(name.to_string()));
            }
            cursor.insert(leaf.to_string(), Value::String(value.to_string()));
        }

        Ok(Value::Object(root))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Null => {}
            Value::String(s) => {
                out.insert(name, s.clone());
            }
            Value::Object(inner) => flatten_into(out, &name, inner),
            other => {
                out.insert(name, other.to_string());
            }
        }
    }
}
