//! Projection of collected property nodes into the editor's UI schema.
//!
//! Field declaration order below is the JSON key order. It is kept alphabetical because the
//! existing editor front-end was written against a serializer that sorts keys.

use std::collections::BTreeMap;

use plwasm_engine::NodeKind;
use serde::Serialize;

use crate::collector::PropertyNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Unsigned,
    Signed,
    Float,
    String,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumField {
    pub name: String,
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemProperties {
    UnsignedRange { max: u128, min: u128 },
    SignedRange { max: i128, min: i128 },
    Length { length: u64 },
    Fields { fields: Vec<EnumField> },
    Empty {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaItem {
    pub id: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ItemProperties>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<ItemType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaCategory {
    #[serde(rename = "categoryName")]
    pub category_name: String,
    pub items: Vec<SchemaItem>,
}

/// Categories sorted by name, items within a category sorted by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    categories: Vec<SchemaCategory>,
}

impl SchemaDocument {
    pub fn categories(&self) -> &[SchemaCategory] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn item(&self, category: &str, name: &str) -> Option<&SchemaItem> {
        self.categories
            .iter()
            .find(|c| c.category_name == category)?
            .items
            .iter()
            .find(|i| i.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build the schema document for `properties`.
///
/// Output order is by category then display name; ids keep discovery order. A repeated
/// display name within one category keeps the last node.
pub fn project(properties: &[PropertyNode]) -> SchemaDocument {
    let mut index: BTreeMap<&str, BTreeMap<&str, &PropertyNode>> = BTreeMap::new();
    for property in properties {
        index
            .entry(property.category.as_str())
            .or_default()
            .insert(property.name.as_str(), property);
    }

    let categories = index
        .into_iter()
        .map(|(category, items)| SchemaCategory {
            category_name: category.to_string(),
            items: items.into_iter().map(|(name, property)| item(name, property)).collect(),
        })
        .collect();

    SchemaDocument { categories }
}

fn item(name: &str, property: &PropertyNode) -> SchemaItem {
    let size = property.node.size;
    let (ty, properties) = match &property.node.kind {
        NodeKind::Unsigned => (
            Some(ItemType::Unsigned),
            Some(unsigned_range(size).map_or(ItemProperties::Empty {}, |(min, max)| {
                ItemProperties::UnsignedRange { max, min }
            })),
        ),
        NodeKind::Signed => (
            Some(ItemType::Signed),
            Some(signed_range(size).map_or(ItemProperties::Empty {}, |(min, max)| {
                ItemProperties::SignedRange { max, min }
            })),
        ),
        NodeKind::Float => (Some(ItemType::Float), Some(ItemProperties::Empty {})),
        NodeKind::String => (Some(ItemType::String), Some(ItemProperties::Length { length: size })),
        NodeKind::Enum { entries } => {
            let fields = entries
                .iter()
                .map(|e| EnumField { name: e.name.clone(), value: e.min })
                .collect();
            (Some(ItemType::Enum), Some(ItemProperties::Fields { fields }))
        }
        NodeKind::Other { type_name } => {
            log::debug!("property '{name}' has no editor type ({type_name})");
            (None, None)
        }
    };

    SchemaItem { id: property.id, name: name.to_string(), properties, ty }
}

/// Width in bits of a `size`-byte integer, for the sizes that fit 128-bit arithmetic.
fn bit_width(size: u64) -> Option<u32> {
    match size {
        0..=16 => Some(size as u32 * 8),
        _ => None,
    }
}

/// `(0, 2^(8*size) - 1)`
pub fn unsigned_range(size: u64) -> Option<(u128, u128)> {
    let max = match bit_width(size)? {
        0 => 0,
        bits => u128::MAX >> (128 - bits),
    };
    Some((0, max))
}

/// `(-2^(8*size-1), 2^(8*size-1) - 1)`, undefined for size 0.
pub fn signed_range(size: u64) -> Option<(i128, i128)> {
    let bits = bit_width(size).filter(|&bits| bits > 0)?;
    let max = i128::MAX >> (128 - bits);
    Some((-max - 1, max))
}
