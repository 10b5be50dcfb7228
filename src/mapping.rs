//! The mapping store: a confirmed raw-label to logical-column association
//! for one run, with YAML persistence for reuse across runs.
//!
//! A mapping is one-to-one in both directions. Inserting a second raw label
//! for a logical column that already has one is rejected as a conflict
//! rather than silently overwritten.

use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{data::normalize_label, error::IntakeError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn contains_logical(&self, logical: &str) -> bool {
        self.entries.values().any(|target| target == logical)
    }

    /// Associates a raw label (normalized on the way in) with a logical
    /// column. Fails if another raw label already targets that column.
    pub fn insert(&mut self, raw: &str, logical: &str) -> Result<(), IntakeError> {
        let raw = normalize_label(raw);
        if let Some((existing, _)) = self
            .entries
            .iter()
            .find(|(key, target)| *target == logical && **key != raw)
        {
            return Err(IntakeError::ConflictingMapping {
                logical: logical.to_string(),
                existing: existing.clone(),
                incoming: raw,
            });
        }
        self.entries.insert(raw, logical.to_string());
        Ok(())
    }

    /// Checks that every mandatory logical column is mapped. Reports the
    /// full sorted list of missing columns, not just the first.
    pub fn validate(&self, mandatory: &[&str]) -> Result<(), IntakeError> {
        let mut missing: Vec<String> = mandatory
            .iter()
            .filter(|logical| !self.contains_logical(logical))
            .map(|logical| (*logical).to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(IntakeError::IncompleteMapping { missing })
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = serde_yaml::to_string(self).context("Serializing mapping to YAML")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("Writing mapping document {path:?}"))?;
        Ok(())
    }

    /// Loads a persisted mapping document. Keys are re-normalized and
    /// conflict-checked exactly as interactive inserts are, so a loaded
    /// mapping behaves identically to one confirmed by hand.
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Opening mapping document {path:?}"))?;
        let reader = BufReader::new(file);
        let raw: BTreeMap<String, String> =
            serde_yaml::from_reader(reader).context("Parsing mapping YAML")?;
        let mut mapping = Self::new();
        for (label, logical) in raw {
            mapping.insert(&label, &logical)?;
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_normalizes_raw_labels() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("  ID_Motorista ", "driver_id").unwrap();
        assert_eq!(mapping.get("id_motorista"), Some("driver_id"));
    }

    #[test]
    fn insert_rejects_second_label_for_same_logical_column() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("motorista", "driver_id").unwrap();
        let err = mapping.insert("id_motorista", "driver_id").unwrap_err();
        match err {
            IntakeError::ConflictingMapping {
                logical,
                existing,
                incoming,
            } => {
                assert_eq!(logical, "driver_id");
                assert_eq!(existing, "motorista");
                assert_eq!(incoming, "id_motorista");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        // Re-inserting the same pair is not a conflict.
        mapping.insert("motorista", "driver_id").unwrap();
    }

    #[test]
    fn validate_lists_every_missing_mandatory_column() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("id_motorista", "driver_id").unwrap();
        let err = mapping
            .validate(&["pdv_ids", "driver_id", "vehicle_id"])
            .unwrap_err();
        match err {
            IntakeError::IncompleteMapping { missing } => {
                assert_eq!(missing, ["pdv_ids", "vehicle_id"]);
            }
            other => panic!("expected incomplete mapping, got {other:?}"),
        }
    }

    #[test]
    fn validate_passes_when_all_mandatory_fields_resolve() {
        let mut mapping = ColumnMapping::new();
        mapping.insert("poc", "pdv_ids").unwrap();
        mapping.insert("id_motorista", "driver_id").unwrap();
        mapping.insert("carro", "vehicle_id").unwrap();
        mapping
            .validate(&["pdv_ids", "driver_id", "vehicle_id"])
            .unwrap();
    }
}
