use serde::{Deserialize, Serialize};
use std::fmt;

use super::food_id::FoodId;

/// A menu item.
///
/// The record body stored remotely holds only `name` and `price`; the id is
/// the record's key and is filled in from the event that delivered it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Food {
    #[serde(skip)]
    pub id: Option<FoodId>,
    pub name: String,
    /// Display text, never parsed as a number.
    pub price: String,
}

impl Food {
    /// Creates an unsaved item from user input, trimming both fields.
    pub fn new(name: impl AsRef<str>, price: impl AsRef<str>) -> Self {
        Self {
            id: None,
            name: name.as_ref().trim().to_string(),
            price: price.as_ref().trim().to_string(),
        }
    }

    pub fn with_id(mut self, id: impl Into<FoodId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builds an item from a remote record body and its key.
    ///
    /// Missing fields become empty strings. Returns `None` if the body is not
    /// a record object or a field is not a string.
    pub fn from_record(key: &str, record: &serde_json::Value) -> Option<Self> {
        if !record.is_object() {
            return None;
        }
        serde_json::from_value::<Food>(record.clone())
            .ok()
            .map(|food| food.with_id(key))
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// True when both items carry the same id.
    ///
    /// Items without an id are never the same item, not even as themselves.
    pub fn is_same_item(&self, other: &Food) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn display_price(&self, currency: &str) -> String {
        format!("{}{}", currency, self.price)
    }
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
