//! XLSX decoding into flat records.
//!
//! The first named sheet is read; its first row holds the headers and every
//! following row becomes a `Record` keyed by header name and tagged with its
//! sheet line. Empty cells are left out of the record, and rows with no values
//! at all are skipped.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use tracing::debug;

use crate::domain::{Cell, Record};
use crate::error::AppError;

/// Decode spreadsheet bytes into records of the first sheet.
pub fn read_records(bytes: &[u8]) -> Result<Vec<Record>, AppError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::data(format!("Failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::data("Workbook has no sheets."))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::data(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<Option<String>> = rows
        .next()
        .ok_or_else(|| AppError::data(format!("Sheet '{sheet_name}' is empty.")))?
        .iter()
        .map(header_name)
        .collect();

    // Absolute 0-based row of the header; data lines are 1-based below it.
    let header_row = range.start().map_or(0, |(row, _)| row as usize);

    let mut records = Vec::with_capacity(range.height().saturating_sub(1));
    for (offset, row) in rows.enumerate() {
        let mut record = Record::at_line(header_row + offset + 2);
        for (header, data) in headers.iter().zip(row.iter()) {
            if let (Some(header), Some(cell)) = (header, cell_value(data)) {
                record.insert(header.as_str(), cell);
            }
        }
        if !record.is_empty() {
            records.push(record);
        }
    }

    debug!("Decoded {} records from sheet '{sheet_name}'", records.len());
    Ok(records)
}

fn header_name(data: &Data) -> Option<String> {
    match cell_value(data)? {
        Cell::Text(s) => {
            let name = s.trim().trim_start_matches('\u{feff}');
            (!name.is_empty()).then(|| name.to_string())
        }
        other => Some(other.as_text()),
    }
}

fn cell_value(data: &Data) -> Option<Cell> {
    match data {
        Data::Empty => None,
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Float(f) => Some(Cell::Number(*f)),
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Cell::Text(s.clone())),
        other => Some(Cell::Text(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    use crate::domain::{Metric, SchemaKeys};
    use crate::transform::{TransformError, select_regions};

    fn sample_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["geoId", "year", "month", "day", "cases"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        sheet.write_string(1, 0, "US").unwrap();
        sheet.write_number(1, 1, 2020).unwrap();
        sheet.write_number(1, 2, 3).unwrap();
        sheet.write_number(1, 3, 2).unwrap();
        sheet.write_number(1, 4, 95).unwrap();
        // Row 2 has no value for `cases`.
        sheet.write_string(2, 0, "DE").unwrap();
        sheet.write_number(2, 1, 2020).unwrap();
        sheet.write_number(2, 2, 3).unwrap();
        sheet.write_number(2, 3, 1).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn first_sheet_rows_become_records() {
        let records = read_records(&sample_workbook()).unwrap();
        assert_eq!(records.len(), 2);

        let us = &records[0];
        assert_eq!(us.get("geoId"), Some(&Cell::Text("US".to_string())));
        assert_eq!(us.get("year").and_then(Cell::as_f64), Some(2020.0));
        assert_eq!(us.get("cases").and_then(Cell::as_f64), Some(95.0));

        assert!(!records[1].contains_key("cases"));
    }

    #[test]
    fn line_numbers_survive_blank_rows() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["geoId", "year", "month", "day", "cases"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        for (col, value) in [2020.0, 3.0, 2.0, 95.0].iter().enumerate() {
            sheet.write_number(1, col as u16 + 1, *value).unwrap();
        }
        sheet.write_string(1, 0, "US").unwrap();
        // Sheet line 3 is blank; line 4 lacks `cases`.
        sheet.write_string(3, 0, "US").unwrap();
        for (col, value) in [2020.0, 3.0, 1.0].iter().enumerate() {
            sheet.write_number(3, col as u16 + 1, *value).unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let records = read_records(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, Some(2));
        assert_eq!(records[1].line, Some(4));

        let keys = SchemaKeys::lowercase(Metric::Cases);
        let err = select_regions(&records, &keys, 100.0, &["US".to_string()], false).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingField {
                line: 4,
                field: "cases".to_string()
            }
        );
    }

    #[test]
    fn garbage_bytes_are_a_data_error() {
        let err = read_records(b"not a workbook").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
