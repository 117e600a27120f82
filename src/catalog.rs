use crate::types::ProductRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog fallback list must not be empty")]
    EmptyFallback,
    #[error("catalog entry '{0}' has no products")]
    EmptyEntry(String),
}

/// Versioned face-shape -> products mapping with a fallback list.
///
/// Every lookup resolves to a non-empty list: the configured entry when the
/// label is known, the fallback otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct RecommendationTable {
    version: u32,
    entries: BTreeMap<String, Vec<ProductRecord>>,
    fallback: Vec<ProductRecord>,
}

#[derive(Serialize, Deserialize)]
struct RawTable {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Vec<ProductRecord>>,
    #[serde(default)]
    fallback: Vec<ProductRecord>,
}

fn default_version() -> u32 {
    1
}

impl TryFrom<RawTable> for RecommendationTable {
    type Error = CatalogError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        RecommendationTable::new(raw.version, raw.entries, raw.fallback)
    }
}

impl From<RecommendationTable> for RawTable {
    fn from(table: RecommendationTable) -> Self {
        RawTable {
            version: table.version,
            entries: table.entries,
            fallback: table.fallback,
        }
    }
}

impl RecommendationTable {
    pub fn new(
        version: u32,
        entries: BTreeMap<String, Vec<ProductRecord>>,
        fallback: Vec<ProductRecord>,
    ) -> Result<Self, CatalogError> {
        if fallback.is_empty() {
            return Err(CatalogError::EmptyFallback);
        }
        if let Some((label, _)) = entries.iter().find(|(_, products)| products.is_empty()) {
            return Err(CatalogError::EmptyEntry(label.clone()));
        }
        Ok(Self { version, entries, fallback })
    }

    /// Products for `face_type` in display order.
    pub fn lookup(&self, face_type: &str) -> &[ProductRecord] {
        self.entries
            .get(face_type)
            .map(Vec::as_slice)
            .unwrap_or(&self.fallback)
    }

    pub fn contains(&self, face_type: &str) -> bool {
        self.entries.contains_key(face_type)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn fallback(&self) -> &[ProductRecord] {
        &self.fallback
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Square".to_string(),
            vec![
                ProductRecord::new(1, "Classic Gold", "₩249,000", Some("BEST")),
                ProductRecord::new(2, "Modern Black", "₩189,000", None),
                ProductRecord::new(3, "Seoul Aviator", "₩310,000", Some("NEW")),
            ],
        );
        entries.insert(
            "Round".to_string(),
            vec![
                ProductRecord::new(11, "Gangnam Square", "₩219,000", Some("BEST")),
                ProductRecord::new(12, "Hanok Wayfarer", "₩199,000", None),
            ],
        );
        entries.insert(
            "Oval".to_string(),
            vec![
                ProductRecord::new(21, "Bukchon Cat-Eye", "₩239,000", None),
                ProductRecord::new(22, "Classic Gold", "₩249,000", Some("BEST")),
            ],
        );

        Self {
            version: 1,
            entries,
            fallback: vec![ProductRecord::new(0, "LookFit Signature", "₩159,000", Some("PICK"))],
        }
    }
}
