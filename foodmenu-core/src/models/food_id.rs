//! Record keys assigned by the remote collection.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Key of a food record in the remote collection.
///
/// Keys are opaque strings; the remote side decides their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoodId(String);

impl FoodId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FoodId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for FoodId {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for FoodId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generate_unique() {
        let a = FoodId::generate();
        let b = FoodId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(FoodId::from("-Nabc"), 1);
        assert_eq!(map.get("-Nabc"), Some(&1));
        assert_eq!(map.get("-Nxyz"), None);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = FoodId::new("-Nabc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"-Nabc\"");
    }
}
