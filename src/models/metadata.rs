//! Commerce metadata attached to every stored file.

use serde::{Deserialize, Serialize};

/// Price used when an item carries no metadata or omits `price`.
pub const DEFAULT_PRICE: &str = "0";

/// Names of the eight metadata keys, in the order they are serialized.
pub const METADATA_FIELDS: [&str; 8] = [
    "text",
    "price",
    "type",
    "category",
    "collection",
    "description",
    "howToUse",
    "priceTwo",
];

/// Metadata as supplied by a caller on upload or update.
///
/// Every field is optional. Only the fields that are `Some` end up in the
/// encoded blob; absent fields are omitted rather than written as `null`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_to_use: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_two: Option<String>,
}

impl ItemMetadata {
    /// Set a field by its wire name. Returns `false` for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "text" => &mut self.text,
            "price" => &mut self.price,
            "type" => &mut self.item_type,
            "category" => &mut self.category,
            "collection" => &mut self.collection,
            "description" => &mut self.description,
            "howToUse" => &mut self.how_to_use,
            "priceTwo" => &mut self.price_two,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Metadata after decoding, with defaults applied to every missing field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub text: String,
    pub price: String,
    pub item_type: String,
    pub category: String,
    pub collection: String,
    pub description: String,
    pub how_to_use: String,
    pub price_two: String,
}

impl Default for ResolvedMetadata {
    fn default() -> Self {
        Self {
            text: String::new(),
            price: DEFAULT_PRICE.to_string(),
            item_type: String::new(),
            category: String::new(),
            collection: String::new(),
            description: String::new(),
            how_to_use: String::new(),
            price_two: String::new(),
        }
    }
}

impl From<ItemMetadata> for ResolvedMetadata {
    fn from(meta: ItemMetadata) -> Self {
        let defaults = Self::default();
        Self {
            text: meta.text.unwrap_or(defaults.text),
            price: meta.price.unwrap_or(defaults.price),
            item_type: meta.item_type.unwrap_or(defaults.item_type),
            category: meta.category.unwrap_or(defaults.category),
            collection: meta.collection.unwrap_or(defaults.collection),
            description: meta.description.unwrap_or(defaults.description),
            how_to_use: meta.how_to_use.unwrap_or(defaults.how_to_use),
            price_two: meta.price_two.unwrap_or(defaults.price_two),
        }
    }
}
