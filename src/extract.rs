//! The extraction and validation engine: applies a confirmed mapping to the
//! unified record set and produces one result per contract table.
//!
//! Tables are independent. A table whose required columns are absent after
//! mapping reports exactly which columns are missing; the remaining tables
//! still extract. Extraction projects rows onto the table's declared
//! columns, drops rows that are null in every projected column, then drops
//! exact duplicates keeping the first occurrence.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    data::{Cell, RecordSet},
    mapping::ColumnMapping,
    registry::Contract,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableResult {
    Extracted(ExtractedTable),
    MissingColumns(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingOutcome {
    pub tables: BTreeMap<String, TableResult>,
}

impl ProcessingOutcome {
    /// True iff every contract table produced an extracted table.
    pub fn is_success(&self) -> bool {
        self.tables
            .values()
            .all(|result| matches!(result, TableResult::Extracted(_)))
    }

    pub fn extracted(&self) -> impl Iterator<Item = &ExtractedTable> {
        self.tables.values().filter_map(|result| match result {
            TableResult::Extracted(table) => Some(table),
            TableResult::MissingColumns(_) => None,
        })
    }

    /// Per-table missing-column failures, in table-name order.
    pub fn failures(&self) -> Vec<(&str, &[String])> {
        self.tables
            .iter()
            .filter_map(|(name, result)| match result {
                TableResult::MissingColumns(missing) => {
                    Some((name.as_str(), missing.as_slice()))
                }
                TableResult::Extracted(_) => None,
            })
            .collect()
    }
}

pub fn process(
    records: &RecordSet,
    mapping: &ColumnMapping,
    contract: &Contract,
) -> ProcessingOutcome {
    // Rename mapped raw labels to logical names; everything else keeps its
    // raw label and simply never matches a contract column.
    let labels: Vec<String> = records
        .columns()
        .iter()
        .map(|label| match mapping.get(label) {
            Some(logical) => logical.to_string(),
            None => label.clone(),
        })
        .collect();

    let mut outcome = ProcessingOutcome::default();
    for spec in contract.tables {
        let result = extract_table(records, &labels, spec.name, spec.columns);
        outcome.tables.insert(spec.name.to_string(), result);
    }
    outcome
}

fn extract_table(
    records: &RecordSet,
    labels: &[String],
    name: &str,
    required: &[&str],
) -> TableResult {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for column in required {
        match labels.iter().position(|label| label == column) {
            Some(idx) => indices.push(idx),
            None => missing.push((*column).to_string()),
        }
    }
    if !missing.is_empty() {
        return TableResult::MissingColumns(missing);
    }

    let rows: Vec<Vec<Cell>> = records
        .rows()
        .iter()
        .map(|row| indices.iter().map(|idx| row[*idx].clone()).collect())
        .filter(|projected: &Vec<Cell>| projected.iter().any(|cell| cell.is_some()))
        .unique()
        .collect();

    TableResult::Extracted(ExtractedTable {
        name: name.to_string(),
        columns: required.iter().map(|c| (*c).to_string()).collect(),
        rows,
    })
}
