//! Metadata codec and listing transform.
//!
//! Metadata travels to Drive as one JSON object stored in the file's
//! `description` field. `encode` writes only the keys a caller supplied;
//! `decode` reads them back and fills every missing key with its default
//! (`"0"` for `price`, `""` otherwise).
//!
//! Listing uses [`decode_or_default`]: a blob that fails to parse yields the
//! default record for that one item so the rest of the listing is unaffected.

use crate::models::{
    item::{DriveFile, ListingEntry},
    metadata::{ItemMetadata, METADATA_FIELDS, ResolvedMetadata},
};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Placeholder replaced by the file id in a [`ThumbnailTemplate`].
pub const ID_PLACEHOLDER: &str = "{id}";

pub const DEFAULT_THUMBNAIL_TEMPLATE: &str = "https://drive.google.com/thumbnail?id={id}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed metadata blob: {0}")]
    MalformedMetadataBlob(String),
    #[error("thumbnail template `{0}` must contain the `{{id}}` placeholder")]
    InvalidThumbnailTemplate(String),
}

/// URL template used to build the `image` link of a listing entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailTemplate(String);

impl ThumbnailTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, CodecError> {
        let template = template.into();
        if !template.contains(ID_PLACEHOLDER) {
            return Err(CodecError::InvalidThumbnailTemplate(template));
        }
        Ok(Self(template))
    }

    pub fn render(&self, id: &str) -> String {
        self.0.replace(ID_PLACEHOLDER, id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThumbnailTemplate {
    fn default() -> Self {
        Self(DEFAULT_THUMBNAIL_TEMPLATE.to_string())
    }
}

/// Serialize the supplied metadata fields into a blob.
pub fn encode(meta: &ItemMetadata) -> String {
    // A struct of optional strings always serializes.
    serde_json::to_string(meta).unwrap_or_else(|_| "{}".to_string())
}

/// Parse a blob back into a fully-populated record.
///
/// An absent or blank blob gives the default record. Unknown keys are
/// ignored; `null`, arrays and nested objects count as absent; numbers and
/// booleans are taken as their JSON text.
pub fn decode(blob: Option<&str>) -> Result<ResolvedMetadata, CodecError> {
    let Some(raw) = blob.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(ResolvedMetadata::default());
    };

    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CodecError::MalformedMetadataBlob(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(CodecError::MalformedMetadataBlob(
            "expected a JSON object".into(),
        ));
    };

    let mut meta = ItemMetadata::default();
    for name in METADATA_FIELDS {
        if let Some(text) = map.get(name).and_then(scalar_text) {
            meta.set_field(name, text);
        }
    }
    Ok(meta.into())
}

/// Decode for listing: malformed blobs are logged and replaced by defaults.
pub fn decode_or_default(item_id: &str, blob: Option<&str>) -> ResolvedMetadata {
    decode(blob).unwrap_or_else(|err| {
        warn!(item_id, error = %err, "substituting default metadata");
        ResolvedMetadata::default()
    })
}

/// Project one backend file into its listing entry.
pub fn project_listing(file: &DriveFile, thumbnails: &ThumbnailTemplate) -> ListingEntry {
    let meta = decode_or_default(&file.id, file.description.as_deref());
    ListingEntry {
        id: file.id.clone(),
        text: file.name.clone(),
        image: thumbnails.render(&file.id),
        price: meta.price,
        category: meta.category,
        collection: meta.collection,
        item_type: meta.item_type,
        description: meta.description,
        how_to_use: meta.how_to_use,
        price_two: meta.price_two,
    }
}

/// Project a whole backend page, keeping the backend's order.
pub fn project_all(files: &[DriveFile], thumbnails: &ThumbnailTemplate) -> Vec<ListingEntry> {
    files
        .iter()
        .map(|file| project_listing(file, thumbnails))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata::DEFAULT_PRICE;

    fn file(id: &str, name: &str, description: Option<String>) -> DriveFile {
        DriveFile {
            id: id.into(),
            name: name.into(),
            description,
        }
    }

    #[test]
    fn encode_omits_absent_fields() {
        let meta = ItemMetadata {
            price: Some("10".into()),
            category: Some("tops".into()),
            ..Default::default()
        };
        assert_eq!(encode(&meta), r#"{"price":"10","category":"tops"}"#);
        assert_eq!(encode(&ItemMetadata::default()), "{}");
    }

    #[test]
    fn encode_uses_wire_names_in_order() {
        let meta = ItemMetadata {
            text: Some("a".into()),
            price: Some("b".into()),
            item_type: Some("c".into()),
            category: Some("d".into()),
            collection: Some("e".into()),
            description: Some("f".into()),
            how_to_use: Some("g".into()),
            price_two: Some("h".into()),
        };
        assert_eq!(
            encode(&meta),
            r#"{"text":"a","price":"b","type":"c","category":"d","collection":"e","description":"f","howToUse":"g","priceTwo":"h"}"#
        );
    }

    #[test]
    fn decode_restores_present_fields_and_defaults_the_rest() {
        let meta = ItemMetadata {
            how_to_use: Some("Wash cold".into()),
            price_two: Some("".into()),
            text: Some("Summer shirt".into()),
            ..Default::default()
        };
        let decoded = decode(Some(encode(&meta).as_str())).unwrap();
        assert_eq!(decoded.how_to_use, "Wash cold");
        assert_eq!(decoded.price_two, "");
        assert_eq!(decoded.text, "Summer shirt");
        assert_eq!(decoded.price, "0");
        assert_eq!(decoded.category, "");
    }

    fn resolved_field<'a>(resolved: &'a ResolvedMetadata, name: &str) -> &'a str {
        match name {
            "text" => &resolved.text,
            "price" => &resolved.price,
            "type" => &resolved.item_type,
            "category" => &resolved.category,
            "collection" => &resolved.collection,
            "description" => &resolved.description,
            "howToUse" => &resolved.how_to_use,
            "priceTwo" => &resolved.price_two,
            other => panic!("unknown field {other}"),
        }
    }

    #[test]
    fn every_field_subset_round_trips() {
        for mask in 0u32..1 << METADATA_FIELDS.len() {
            let present = |i: usize| mask & (1 << i) != 0;
            let mut meta = ItemMetadata::default();
            for (i, name) in METADATA_FIELDS.iter().enumerate() {
                if present(i) {
                    // Odd masks write empty strings so "present but empty" is covered too.
                    let value = if mask % 2 == 1 { String::new() } else { format!("{name}-{mask}") };
                    assert!(meta.set_field(name, value));
                }
            }

            let decoded = decode(Some(encode(&meta).as_str())).unwrap();
            for (i, name) in METADATA_FIELDS.iter().enumerate() {
                let expected = match (present(i), mask % 2 == 1) {
                    (true, true) => String::new(),
                    (true, false) => format!("{name}-{mask}"),
                    (false, _) if *name == "price" => DEFAULT_PRICE.to_string(),
                    (false, _) => String::new(),
                };
                assert_eq!(resolved_field(&decoded, name), expected, "mask {mask:#010b} field {name}");
            }
        }
    }

    #[test]
    fn decode_keeps_explicit_empty_price() {
        let meta = ItemMetadata {
            price: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(decode(Some(encode(&meta).as_str())).unwrap().price, "");
    }

    #[test]
    fn empty_and_absent_blobs_decode_to_defaults() {
        let expected = ResolvedMetadata::default();
        assert_eq!(decode(None).unwrap(), expected);
        assert_eq!(decode(Some("")).unwrap(), expected);
        assert_eq!(decode(Some("   ")).unwrap(), expected);
        assert_eq!(decode(Some(encode(&ItemMetadata::default()).as_str())).unwrap(), expected);
        assert_eq!(expected.price, "0");
    }

    #[test]
    fn decode_ignores_unknown_keys_and_null() {
        let decoded =
            decode(Some(r#"{"price":"7","color":"red","category":null,"tags":["a"]}"#)).unwrap();
        assert_eq!(decoded.price, "7");
        assert_eq!(decoded.category, "");
    }

    #[test]
    fn decode_stringifies_numbers_and_booleans() {
        let decoded = decode(Some(r#"{"price":12.5,"priceTwo":3,"type":true}"#)).unwrap();
        assert_eq!(decoded.price, "12.5");
        assert_eq!(decoded.price_two, "3");
        assert_eq!(decoded.item_type, "true");
    }

    #[test]
    fn decode_rejects_malformed_blobs() {
        assert!(matches!(
            decode(Some("not json")),
            Err(CodecError::MalformedMetadataBlob(_))
        ));
        assert!(matches!(
            decode(Some("[1,2]")),
            Err(CodecError::MalformedMetadataBlob(_))
        ));
        assert_eq!(
            decode_or_default("x", Some("{broken")),
            ResolvedMetadata::default()
        );
    }

    #[test]
    fn project_listing_maps_name_and_thumbnail() {
        let blob = encode(&ItemMetadata {
            price: Some("10".into()),
            category: Some("tops".into()),
            ..Default::default()
        });
        let entry = project_listing(
            &file("X123", "shirt.png", Some(blob)),
            &ThumbnailTemplate::default(),
        );
        assert_eq!(
            entry,
            ListingEntry {
                id: "X123".into(),
                text: "shirt.png".into(),
                image: "https://drive.google.com/thumbnail?id=X123".into(),
                price: "10".into(),
                category: "tops".into(),
                collection: String::new(),
                item_type: String::new(),
                description: String::new(),
                how_to_use: String::new(),
                price_two: String::new(),
            }
        );
    }

    #[test]
    fn project_all_preserves_order_and_survives_corrupt_items() {
        let files = vec![
            file("b", "second.png", Some(r#"{"price":"5"}"#.into())),
            file("a", "first.png", Some("%%corrupt%%".into())),
            file("c", "third.png", None),
            file("a", "first.png", None),
        ];
        let entries = project_all(&files, &ThumbnailTemplate::default());
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c", "a"]);
        assert_eq!(entries[0].price, "5");
        assert_eq!(entries[1].price, "0");
        assert_eq!(entries[1].text, "first.png");
    }

    #[test]
    fn thumbnail_template_requires_placeholder() {
        assert!(matches!(
            ThumbnailTemplate::new("https://cdn.example/img"),
            Err(CodecError::InvalidThumbnailTemplate(_))
        ));
        let template = ThumbnailTemplate::new("https://cdn.example/{id}/thumb?src={id}").unwrap();
        assert_eq!(template.render("Q9"), "https://cdn.example/Q9/thumb?src=Q9");
    }
}
