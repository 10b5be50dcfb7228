//! The archive packager: serializes extracted tables to CSV and bundles
//! them into a single in-memory zip, one `<table>.csv` entry per table.
//!
//! Only called once every contract table extracted successfully; a partial
//! or corrupt archive is never produced.

use std::io::{Cursor, Write};

use zip::{
    CompressionMethod,
    write::{ExtendedFileOptions, FileOptions},
};

use crate::{error::IntakeError, extract::ExtractedTable};

pub fn pack<'a>(
    tables: impl IntoIterator<Item = &'a ExtractedTable>,
) -> Result<Vec<u8>, IntakeError> {
    let mut buffer = Vec::new();
    {
        let mut archive = zip::ZipWriter::new(Cursor::new(&mut buffer));
        for table in tables {
            let options = FileOptions::<ExtendedFileOptions>::default()
                .compression_method(CompressionMethod::Deflated);
            archive
                .start_file(format!("{}.csv", table.name), options)
                .map_err(packaging_error)?;
            let csv_bytes = table_to_csv(table)?;
            archive.write_all(&csv_bytes).map_err(packaging_error)?;
        }
        archive.finish().map_err(packaging_error)?;
    }
    Ok(buffer)
}

/// Renders one table as UTF-8 CSV: header row of logical column names in
/// declared order, one row per record, no index column.
pub fn table_to_csv(table: &ExtractedTable) -> Result<Vec<u8>, IntakeError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .double_quote(true)
        .from_writer(Vec::new());
    writer
        .write_record(&table.columns)
        .map_err(packaging_error)?;
    for row in &table.rows {
        let record: Vec<String> = row
            .iter()
            .map(|cell| cell.as_ref().map(|v| v.as_display()).unwrap_or_default())
            .collect();
        writer.write_record(&record).map_err(packaging_error)?;
    }
    writer
        .into_inner()
        .map_err(|err| packaging_error(err.to_string()))
}

fn packaging_error(err: impl ToString) -> IntakeError {
    IntakeError::Packaging(err.to_string())
}
