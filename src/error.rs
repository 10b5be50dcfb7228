use thiserror::Error;

/// Failure modes of one intake run. Every variant is recoverable by adjusting
/// the inputs or the mapping and retrying the run.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// A source file could not be read as a spreadsheet or delimited text.
    /// Aborts the whole load.
    #[error("cannot read '{file}': {reason}")]
    Format { file: String, reason: String },

    /// One or more mandatory logical columns are unmapped. Lists every
    /// missing column, not just the first.
    #[error("mapping is missing mandatory column(s): {}", .missing.join(", "))]
    IncompleteMapping { missing: Vec<String> },

    /// Two raw labels target the same logical column.
    #[error("both '{existing}' and '{incoming}' map to logical column '{logical}'")]
    ConflictingMapping {
        logical: String,
        existing: String,
        incoming: String,
    },

    /// An output table's required columns are not all present after mapping.
    #[error("table '{table}' is missing column(s): {}", .missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },

    #[error("failed to package output archive: {0}")]
    Packaging(String),

    /// A session method was called out of order.
    #[error("operation requires session state '{expected}', but session is '{actual}'")]
    InvalidTransition {
        expected: &'static str,
        actual: &'static str,
    },
}
