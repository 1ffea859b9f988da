//! Business category entity.

use serde::{Deserialize, Serialize};

/// A business category, as reported by a data source.
///
/// Providers disagree on how much they report: Foursquare supplies ids and
/// icons, Yelp only human-readable titles. Absent fields are omitted from
/// serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    /// Creates a category carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            short_name: None,
            icon: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_category() {
        let cat = Category::named("Coffee Shop");
        assert_eq!(cat.name, "Coffee Shop");
        assert!(cat.id.is_none());
    }

    #[test]
    fn test_absent_fields_skipped_in_json() {
        let cat = Category::named("Pizza Place");
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Pizza Place" }));
    }
}
