//! Turns path-based writes into per-record child events.
//!
//! The realtime database streams writes as `(path, data)` pairs relative to
//! the subscribed collection. The tracker keeps the last known body of every
//! record so it can tell additions, modifications and removals apart.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::event::ChildEvent;
use crate::models::Food;

/// Last known state of every record in the collection, ordered by key.
#[derive(Debug, Default)]
pub(crate) struct ChildTracker {
    children: BTreeMap<String, Value>,
}

impl ChildTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.children.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Applies a write of `data` at `path`.
    pub(crate) fn put(&mut self, path: &str, data: Value) -> Vec<ChildEvent> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => self.replace_all(data),
            [key] => self.set_child(key, data).into_iter().collect(),
            [key, rest @ ..] => {
                let mut body = self
                    .children
                    .get(*key)
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                set_at(&mut body, rest, data);
                self.set_child(key, body).into_iter().collect()
            }
        }
    }

    /// Applies a multi-location update: each entry is a write relative to
    /// `path`.
    pub(crate) fn patch(&mut self, path: &str, data: Value) -> Vec<ChildEvent> {
        let Value::Object(entries) = data else {
            tracing::warn!(path, "Ignoring patch whose data is not an object");
            return Vec::new();
        };

        let base = path.trim_end_matches('/');
        entries
            .into_iter()
            .flat_map(|(relative, value)| self.put(&format!("{}/{}", base, relative), value))
            .collect()
    }

    fn replace_all(&mut self, data: Value) -> Vec<ChildEvent> {
        let incoming = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                tracing::warn!(value = %other, "Ignoring collection value that is not an object");
                return Vec::new();
            }
        };

        let gone: Vec<String> = self
            .children
            .keys()
            .filter(|key| !incoming.contains_key(key.as_str()))
            .cloned()
            .collect();

        let mut events = Vec::new();
        for key in gone {
            events.extend(self.set_child(&key, Value::Null));
        }
        for (key, value) in incoming {
            events.extend(self.set_child(&key, value));
        }
        events
    }

    fn set_child(&mut self, key: &str, body: Value) -> Option<ChildEvent> {
        if is_empty_value(&body) {
            let previous = self.children.remove(key)?;
            let food = Food::from_record(key, &previous)
                .unwrap_or_else(|| Food::default().with_id(key));
            return Some(ChildEvent::Removed(food));
        }

        let Some(food) = Food::from_record(key, &body) else {
            tracing::warn!(key, "Skipping child that is not a food record");
            return None;
        };

        match self.children.insert(key.to_string(), body) {
            None => Some(ChildEvent::Added(food)),
            Some(previous) if Food::from_record(key, &previous).as_ref() == Some(&food) => None,
            Some(_) => Some(ChildEvent::Changed(food)),
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Writes `data` at `path` inside `target`, creating objects along the way.
/// A null `data` deletes the entry.
fn set_at(target: &mut Value, path: &[&str], data: Value) {
    let Some((first, rest)) = path.split_first() else {
        *target = data;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };

    if rest.is_empty() {
        if data.is_null() {
            map.remove(*first);
        } else {
            map.insert(first.to_string(), data);
        }
        return;
    }

    let child = map
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    set_at(child, rest, data);
}
