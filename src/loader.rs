//! The tabular loader: reads uploaded byte blobs (delimited text or
//! spreadsheet first sheet), normalizes column labels, and concatenates
//! everything into one [`RecordSet`].
//!
//! Delimited text is tried comma-first; a parse that yields exactly one
//! column, or fails under a single-column header, is retried once with a
//! semicolon delimiter, recovering the common locale-specific export
//! format. Any file unreadable in both formats fails the whole load with
//! the offending file's name.

use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use calamine::{DataType, Reader, open_workbook_auto_from_rs};
use encoding_rs::UTF_8;

use crate::{
    data::{Cell, RecordSet, Value, normalize_label, parse_cell},
    error::IntakeError,
};

const SPREADSHEET_SUFFIXES: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// One uploaded file: its name (used for format dispatch and error
/// reporting) and its whole content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Reading input file {path:?}"))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    fn is_spreadsheet(&self) -> bool {
        PathBuf::from(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                SPREADSHEET_SUFFIXES
                    .iter()
                    .any(|suffix| ext.eq_ignore_ascii_case(suffix))
            })
    }
}

/// Loads every file and merges them into one record set, columns as the
/// outer union, rows in input order.
pub fn load(files: &[SourceFile]) -> Result<RecordSet, IntakeError> {
    if files.is_empty() {
        return Err(IntakeError::Format {
            file: "<none>".to_string(),
            reason: "no input files were provided".to_string(),
        });
    }
    let mut records = RecordSet::new();
    for file in files {
        let (labels, rows) = if file.is_spreadsheet() {
            read_spreadsheet(file)?
        } else {
            read_delimited(file)?
        };
        records.push_table(labels, rows);
    }
    Ok(records)
}

fn format_error(file: &SourceFile, reason: impl ToString) -> IntakeError {
    IntakeError::Format {
        file: file.name.clone(),
        reason: reason.to_string(),
    }
}

fn read_delimited(file: &SourceFile) -> Result<(Vec<String>, Vec<Vec<Cell>>), IntakeError> {
    let (text, _, had_errors) = UTF_8.decode(&file.bytes);
    if had_errors {
        return Err(format_error(file, "content is not valid UTF-8"));
    }

    let table = match parse_delimited(&text, b',') {
        // Single-column result usually means a semicolon-separated export;
        // retry once and keep whichever parse succeeds.
        Ok((labels, rows)) if labels.len() == 1 => {
            parse_delimited(&text, b';').unwrap_or((labels, rows))
        }
        Ok(table) => table,
        // The comma parse can also fail outright under a single-column
        // header when the data itself contains commas (decimal-comma
        // locales). Same recovery, still at most one retry.
        Err(_) if header_count(&text, b',') == Some(1) => {
            parse_delimited(&text, b';').map_err(|err| format_error(file, err))?
        }
        Err(err) => return Err(format_error(file, err)),
    };

    if table.0.is_empty() {
        return Err(format_error(file, "file has no header row"));
    }
    Ok(table)
}

fn header_count(text: &str, delimiter: u8) -> Option<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());
    reader.headers().ok().map(|headers| headers.len())
}

fn parse_delimited(text: &str, delimiter: u8) -> csv::Result<(Vec<String>, Vec<Vec<Cell>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let labels = reader
        .headers()?
        .iter()
        .map(normalize_label)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(parse_cell).collect());
    }
    Ok((labels, rows))
}

fn read_spreadsheet(file: &SourceFile) -> Result<(Vec<String>, Vec<Vec<Cell>>), IntakeError> {
    let cursor = Cursor::new(file.bytes.as_slice());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|err| format_error(file, err))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| format_error(file, "workbook contains no worksheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| format_error(file, format!("worksheet '{sheet_name}' is unreadable")))?
        .map_err(|err| format_error(file, err))?;

    let mut row_iter = range.rows();
    let header_row = row_iter
        .next()
        .ok_or_else(|| format_error(file, "worksheet is empty"))?;
    let labels: Vec<String> = header_row
        .iter()
        .map(|cell| normalize_label(&cell.to_string()))
        .collect();

    let rows = row_iter
        .map(|row| row.iter().map(sheet_cell).collect())
        .collect();
    Ok((labels, rows))
}

fn sheet_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::Int(i) => Some(Value::Number(*i as f64)),
        DataType::Float(f) | DataType::DateTime(f) => {
            if f.is_finite() {
                Some(Value::Number(*f + 0.0))
            } else {
                None
            }
        }
        DataType::Bool(b) => Some(Value::Text(b.to_string())),
        DataType::String(s) => parse_cell(s),
        // Duration and ISO date/duration cells carry their textual form.
        other => parse_cell(&other.to_string()),
    }
}
