//! First-sheet reader for uploaded royalty reports.
//!
//! The first non-empty row is the header. Every following row that has at
//! least one non-empty cell becomes a [`SheetRow`] keyed by header text.
//! Empty cells are left out of the row object.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{Map, Value};
use std::io::Cursor;
use thiserror::Error;

const ACCEPTED_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/x-ole-storage",
    "application/zip",
];

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to decode spreadsheet: {0}")]
    Decode(#[from] calamine::Error),

    #[error("The workbook contains no sheets")]
    NoSheets,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 1-based row number as shown by spreadsheet applications.
    pub row_number: usize,
    pub values: Map<String, Value>,
}

impl SheetRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

/// Rejects anything that does not look like an XLSX, XLS or ODS workbook.
pub fn sniff_spreadsheet(bytes: &[u8]) -> Result<(), SheetError> {
    match infer::get(bytes) {
        Some(kind) if ACCEPTED_MIME_TYPES.contains(&kind.mime_type()) => Ok(()),
        Some(kind) => Err(SheetError::UnsupportedFileType(
            kind.mime_type().to_string(),
        )),
        None => Err(SheetError::UnsupportedFileType("unknown".to_string())),
    }
}

pub fn read_first_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    sniff_spreadsheet(bytes)?;

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheets)??;

    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let Some((first_row, _)) = range.start() else {
        return Vec::new();
    };

    let mut header: Option<Vec<Option<String>>> = None;
    let mut rows = Vec::new();

    for (index, cells) in range.rows().enumerate() {
        if cells.iter().all(is_blank) {
            continue;
        }
        let row_number = first_row as usize + index + 1;

        let Some(columns) = &header else {
            header = Some(header_names(cells));
            continue;
        };

        let mut values = Map::new();
        for (column, cell) in columns.iter().zip(cells.iter()) {
            let Some(column) = column else {
                continue;
            };
            if is_blank(cell) {
                continue;
            }
            values.insert(column.clone(), cell_to_value(cell));
        }
        rows.push(SheetRow { row_number, values });
    }

    rows
}

/// Header names with duplicates suffixed `_1`, `_2`, ... Blank headers drop the column.
fn header_names(cells: &[Data]) -> Vec<Option<String>> {
    let mut seen: Vec<String> = Vec::new();
    cells
        .iter()
        .map(|cell| {
            let name = cell.to_string().trim().to_string();
            if name.is_empty() {
                return None;
            }
            let mut unique = name.clone();
            let mut suffix = 1;
            while seen.contains(&unique) {
                unique = format!("{}_{}", name, suffix);
                suffix += 1;
            }
            seen.push(unique.clone());
            Some(unique)
        })
        .collect()
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(*f as i64),
        Data::Float(f) => Value::from(*f),
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Empty => Value::Null,
        other => Value::String(other.to_string()),
    }
}
