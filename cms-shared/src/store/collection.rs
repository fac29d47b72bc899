/// Known collections and their default values

use serde_json::{json, Value};
use std::fmt;

use crate::models::{content::default_sections, settings::Settings};

/// A named collection persisted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Settings,
    Blocks,
    Forms,
    Submissions,
    Images,
    Videos,
    Logo,
    Sections,
}

impl Collection {
    /// Every known collection, in initialization order
    pub const ALL: [Collection; 9] = [
        Collection::Users,
        Collection::Settings,
        Collection::Blocks,
        Collection::Forms,
        Collection::Submissions,
        Collection::Images,
        Collection::Videos,
        Collection::Logo,
        Collection::Sections,
    ];

    /// Number of known collections
    pub const COUNT: usize = Self::ALL.len();

    /// Storage key (file stem on disk)
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Settings => "settings",
            Collection::Blocks => "blocks",
            Collection::Forms => "forms",
            Collection::Submissions => "submissions",
            Collection::Images => "images",
            Collection::Videos => "videos",
            Collection::Logo => "logo",
            Collection::Sections => "sections",
        }
    }

    /// Looks up a collection by its storage key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Whether the collection is a list of records
    pub fn is_list(&self) -> bool {
        !matches!(
            self,
            Collection::Settings | Collection::Logo | Collection::Sections
        )
    }

    /// Value a collection holds before anything has been written
    pub fn default_value(&self) -> Value {
        match self {
            Collection::Settings => {
                serde_json::to_value(Settings::default()).unwrap_or_else(|_| json!({}))
            }
            Collection::Sections => {
                serde_json::to_value(default_sections()).unwrap_or_else(|_| json!({}))
            }
            Collection::Logo => json!({}),
            _ => json!([]),
        }
    }

    /// Number of entries, for logging
    pub fn size_of(value: &Value) -> usize {
        match value {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_key(collection.key()), Some(collection));
        }
        assert_eq!(Collection::from_key("unknown"), None);
    }

    #[test]
    fn test_index_matches_position() {
        for (position, collection) in Collection::ALL.iter().enumerate() {
            assert_eq!(collection.index(), position);
        }
    }

    #[test]
    fn test_default_shapes() {
        assert_eq!(Collection::Users.default_value(), json!([]));
        assert_eq!(Collection::Logo.default_value(), json!({}));
        assert_eq!(Collection::Settings.default_value()["title"], "My Site");
        assert!(Collection::Sections.default_value()["hero"].is_object());

        for collection in Collection::ALL {
            assert_eq!(collection.is_list(), collection.default_value().is_array());
        }
    }
}
