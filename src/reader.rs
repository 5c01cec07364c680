/*!
 * Input readers
 *
 * Two input surfaces feed the engine: the JSON record-array transport handed
 * over by the host application (export), and an edited spreadsheet coming
 * back in (import). Spreadsheets are read into a raw header+rows string
 * table; all typing happens later in the engine, so a `.csv` and an `.xlsx`
 * of the same report behave identically.
 */

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::ReaderBuilder;

use crate::data_types::VisitRecord;
use crate::{Result, ServisheetError};

/// A raw spreadsheet: header labels plus string rows, one cell per header
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Index of the column with the given header label
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == label)
    }
}

/// Load visit records from the JSON transport (an array of VisitRecord
/// objects with camelCase field names)
pub fn load_visit_records<P: AsRef<Path>>(path: P) -> Result<Vec<VisitRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ServisheetError::file_not_found_with_suggestion(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| ServisheetError::io_with_path(e, path))?;
    let records: Vec<VisitRecord> = serde_json::from_reader(file)?;
    Ok(records)
}

/// Load a spreadsheet into a raw string table, dispatching on the file
/// extension: `.xlsx` through calamine, anything else as delimited text
pub fn load_sheet<P: AsRef<Path>>(path: P) -> Result<SheetTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ServisheetError::file_not_found_with_suggestion(path.to_path_buf()));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("xlsx") => load_sheet_xlsx(path),
        _ => load_sheet_csv(path),
    }
}

fn load_sheet_xlsx(path: &Path) -> Result<SheetTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ServisheetError::Spreadsheet {
            message: format!("Workbook '{}' has no sheets", path.display()),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ServisheetError::Spreadsheet {
            message: format!("Failed to read sheet '{}': {}", sheet_name, e),
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(SheetTable::default());
    };

    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let width = headers.len();

    let data_rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_to_string).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(SheetTable { headers, rows: data_rows })
}

fn load_sheet_csv(path: &Path) -> Result<SheetTable> {
    let file = File::open(path).map_err(|e| ServisheetError::io_with_path(e, path))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        cells.resize(width, String::new());
        rows.push(cells);
    }

    Ok(SheetTable { headers, rows })
}

/// Coerce a calamine cell into text. Integral floats lose the trailing
/// `.0`; Excel-native datetimes come out as ISO date text so the date
/// normalizer can take them.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|ndt| ndt.date().format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_visit_records_missing_file() {
        let err = load_visit_records("no/such/records.json").unwrap_err();
        assert!(matches!(err, ServisheetError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_visit_records_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"customerKey":"C1","visitDate":"2023-01-05","status":"COMPLETED"}}]"#
        )
        .unwrap();

        let records = load_visit_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer_key, "C1");
    }

    #[test]
    fn test_load_sheet_csv_pads_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "Name,Visit 1,Visit 2\nAlice,2023-01-05\n").unwrap();

        let table = load_sheet(&path).unwrap();
        assert_eq!(table.headers, vec!["Name", "Visit 1", "Visit 2"]);
        assert_eq!(table.rows[0], vec!["Alice", "2023-01-05", ""]);
        assert_eq!(table.column_index("Visit 2"), Some(2));
    }
}
