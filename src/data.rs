use std::{
    fmt,
    hash::{Hash, Hasher},
};

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    (*n as i64).to_string()
                } else {
                    n.to_string()
                }
            }
        }
    }
}

// Number cells are always finite and never -0.0 (parse_cell rejects NaN/inf
// and collapses negative zero), so bitwise comparison gives a total
// equivalence usable for row dedup.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Value::Number(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// One cell: text, number, or null.
pub type Cell = Option<Value>;

/// Normalizes a raw column label for comparison: trim, then lowercase.
/// Idempotent; applied exactly once at load time so downstream label
/// comparisons never re-normalize.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Converts a raw field into a typed cell. Blank (after trimming) is null;
/// a finite numeric literal becomes a number; anything else stays text.
pub fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        // Adding 0.0 collapses -0.0 to 0.0 so "0" and "-0" compare as the
        // same cell under bitwise equality.
        Ok(n) if n.is_finite() => Some(Value::Number(n + 0.0)),
        _ => Some(Value::Text(trimmed.to_string())),
    }
}

/// The unified record set for one run: the outer union of all loaded tables'
/// columns, with rows concatenated in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Appends one parsed table. Labels must already be normalized. New
    /// columns extend the union (existing rows backfilled with null); rows
    /// lacking a unified column get null in that slot.
    pub fn push_table(&mut self, labels: Vec<String>, rows: Vec<Vec<Cell>>) {
        let mut slots = Vec::with_capacity(labels.len());
        for label in labels {
            let idx = match self.column_index(&label) {
                Some(idx) => idx,
                None => {
                    self.columns.push(label);
                    for row in &mut self.rows {
                        row.push(None);
                    }
                    self.columns.len() - 1
                }
            };
            slots.push(idx);
        }
        let width = self.columns.len();
        for row in rows {
            let mut unified = vec![None; width];
            for (cell, idx) in row.into_iter().zip(&slots) {
                unified[*idx] = cell;
            }
            self.rows.push(unified);
        }
    }
}
