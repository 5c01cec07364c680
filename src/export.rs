/*!
 * Export pipeline and wide-table writers
 *
 * Both artifacts are serialized from the identical `WideTable`: a styled
 * xlsx document (wrapped notes columns, per-column widths) and a plain
 * delimited csv. Dates render as day-month-year text in the xlsx and ISO
 * year-month-day in the csv by default; absent cells render as the
 * placeholder dash in both. Buffers are built in memory and written to disk
 * only after the whole table exists, so a failing run leaves no partial
 * output behind.
 */

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::aggregate::{aggregate, filter_completed};
use crate::config::SheetConfig;
use crate::constants::PLACEHOLDER;
use crate::data_types::{Cell, WideTable};
use crate::dates;
use crate::pivot::pivot;
use crate::reader::load_visit_records;
use crate::report::ExportReport;
use crate::schema::{BaseColumn, ColumnKey};
use crate::{Result, ServisheetError};

/// Trait for wide-table serializers
pub trait WideTableExporter {
    /// Serialize the table into an in-memory artifact
    fn serialize(&self, table: &WideTable) -> Result<Vec<u8>>;

    /// File extension of the artifact, without the dot
    fn extension(&self) -> &'static str;
}

/// Render one cell as text. Absent cells become the placeholder dash; dates
/// follow the artifact's chosen rendering.
fn render_cell(cell: &Cell, day_month_year: bool) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Number(n) => n.to_string(),
        Cell::Date(date) => dates::render_or_placeholder(Some(*date), day_month_year),
        Cell::Empty => PLACEHOLDER.to_string(),
    }
}

/// Styled xlsx exporter
pub struct XlsxExporter {
    sheet_name: String,
    day_month_year: bool,
    wrap_notes: bool,
    notes_width: f64,
    address_width: f64,
    name_width: f64,
    default_width: f64,
}

impl XlsxExporter {
    pub fn new(config: &SheetConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            day_month_year: config.xlsx_day_month_year,
            wrap_notes: config.wrap_notes,
            notes_width: config.notes_column_width,
            address_width: config.address_column_width,
            name_width: config.name_column_width,
            default_width: config.default_column_width,
        }
    }

    fn column_width(&self, key: &ColumnKey) -> f64 {
        match key {
            ColumnKey::Base(base) if base.is_notes() => self.notes_width,
            ColumnKey::Base(BaseColumn::Address) => self.address_width,
            ColumnKey::Base(BaseColumn::Name) => self.name_width,
            _ => self.default_width,
        }
    }
}

impl WideTableExporter for XlsxExporter {
    fn serialize(&self, table: &WideTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        let wrap_format = Format::new().set_text_wrap();

        for (col_idx, key) in table.columns.iter().enumerate() {
            let col = col_idx as u16;
            worksheet.set_column_width(col, self.column_width(key))?;
            worksheet.write_string(0, col, key.label())?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let sheet_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let col = col_idx as u16;
                let wants_wrap = self.wrap_notes
                    && matches!(&table.columns[col_idx], ColumnKey::Base(base) if base.is_notes());

                match cell {
                    Cell::Number(n) => {
                        worksheet.write_number(sheet_row, col, *n as f64)?;
                    }
                    other => {
                        let text = render_cell(other, self.day_month_year);
                        if wants_wrap {
                            worksheet.write_string_with_format(sheet_row, col, &text, &wrap_format)?;
                        } else {
                            worksheet.write_string(sheet_row, col, &text)?;
                        }
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}

/// Plain delimited-text exporter
pub struct DelimitedExporter {
    day_month_year: bool,
    delimiter: u8,
}

impl DelimitedExporter {
    pub fn new(config: &SheetConfig) -> Self {
        Self {
            day_month_year: config.csv_day_month_year,
            delimiter: b',',
        }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl WideTableExporter for DelimitedExporter {
    fn serialize(&self, table: &WideTable) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        let headers: Vec<String> = table.columns.iter().map(|k| k.label()).collect();
        writer.write_record(&headers)?;

        for row in &table.rows {
            let rendered: Vec<String> = row
                .iter()
                .map(|cell| render_cell(cell, self.day_month_year))
                .collect();
            writer.write_record(&rendered)?;
        }

        writer.into_inner().map_err(|e| ServisheetError::Export {
            message: e.to_string(),
            suggestion: None,
        })
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

/// Append an extension to a base path without replacing anything
fn artifact_path(base: &Path, extension: &str) -> PathBuf {
    let mut os = base.as_os_str().to_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}

/// Run the whole export flow: JSON records in, a styled xlsx plus a plain
/// csv derived from the identical wide table out.
///
/// Fatal errors (empty input, everything filtered out, unreadable input,
/// unwritable output) abort before any file is touched. Per-record date
/// faults are absorbed into the report.
pub fn run_export(input: &Path, output_base: &Path, config: &SheetConfig) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    let records = load_visit_records(input)?;
    report.records_read = records.len();

    let completed = filter_completed(records)?;
    report.records_completed = completed.len();

    let groups = aggregate(&completed, &mut report);
    let table = pivot(&groups);
    report.visit_columns = table
        .columns
        .iter()
        .filter_map(|c| match c {
            ColumnKey::Visit(n) => Some(*n),
            _ => None,
        })
        .max()
        .unwrap_or(0);

    // Serialize both artifacts before touching the filesystem.
    let xlsx_exporter = XlsxExporter::new(config);
    let csv_exporter = DelimitedExporter::new(config);
    let xlsx_bytes = xlsx_exporter.serialize(&table)?;
    let csv_bytes = csv_exporter.serialize(&table)?;

    let xlsx_path = artifact_path(output_base, xlsx_exporter.extension());
    let csv_path = artifact_path(output_base, csv_exporter.extension());
    std::fs::write(&xlsx_path, xlsx_bytes)
        .map_err(|e| ServisheetError::io_with_path(e, &xlsx_path))?;
    if let Err(e) = std::fs::write(&csv_path, csv_bytes) {
        // A failing run leaves neither artifact behind.
        let _ = std::fs::remove_file(&xlsx_path);
        return Err(ServisheetError::io_with_path(e, &csv_path));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::{VisitRecord, VisitStatus};
    use chrono::NaiveDate;

    fn completed(key: &str, date: &str) -> VisitRecord {
        VisitRecord {
            customer_key: key.to_string(),
            name: format!("{} name", key),
            address: String::new(),
            phone: String::new(),
            city: String::new(),
            customer_notes: String::new(),
            visit_date: date.to_string(),
            notes: String::new(),
            status: VisitStatus::Completed,
        }
    }

    fn sample_table() -> WideTable {
        let mut report = ExportReport::default();
        let records = vec![
            completed("C1", "2023-01-05"),
            completed("C1", "2023-06-10"),
            completed("C2", "2023-02-01"),
        ];
        let groups = aggregate(&records, &mut report);
        pivot(&groups)
    }

    #[test]
    fn test_render_cell() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        assert_eq!(render_cell(&Cell::Date(date), true), "05-01-2023");
        assert_eq!(render_cell(&Cell::Date(date), false), "2023-01-05");
        assert_eq!(render_cell(&Cell::Empty, true), "-");
        assert_eq!(render_cell(&Cell::Number(3), true), "3");
        assert_eq!(render_cell(&Cell::Text("hi".into()), true), "hi");
    }

    #[test]
    fn test_csv_artifact_renders_iso_and_placeholder() {
        let table = sample_table();
        let exporter = DelimitedExporter::new(&SheetConfig::default());
        let bytes = exporter.serialize(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("No,Name,Address,Phone,City,Installation Date,Last Visit"));
        assert!(header.ends_with("Visit 1"));

        // C1 row carries its routine visit in ISO form
        let c1 = lines.next().unwrap();
        assert!(c1.contains("2023-01-05"));
        assert!(c1.contains("2023-06-10"));

        // C2 has no routine visit; its Visit 1 cell is the placeholder
        let c2 = lines.next().unwrap();
        assert!(c2.ends_with("-"));
    }

    #[test]
    fn test_xlsx_artifact_serializes_to_buffer() {
        let table = sample_table();
        let exporter = XlsxExporter::new(&SheetConfig::default());
        let bytes = exporter.serialize(&table).unwrap();
        // xlsx containers are zip archives
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_artifact_path_appends_extension() {
        assert_eq!(
            artifact_path(Path::new("out/report"), "xlsx"),
            PathBuf::from("out/report.xlsx")
        );
    }

    #[test]
    fn test_run_export_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(
            &input,
            r#"[
                {"customerKey":"C1","name":"Alice","visitDate":"2023-01-05","notes":"install","status":"COMPLETED"},
                {"customerKey":"C1","name":"Alice","visitDate":"2023-06-10","notes":"checkup","status":"COMPLETED"},
                {"customerKey":"C2","name":"Bob","visitDate":"2023-02-01","status":"SCHEDULED"}
            ]"#,
        )
        .unwrap();

        let base = dir.path().join("report");
        let report = run_export(&input, &base, &SheetConfig::default()).unwrap();

        assert_eq!(report.records_read, 3);
        assert_eq!(report.records_completed, 2);
        assert_eq!(report.customers_exported, 1);
        assert_eq!(report.visit_columns, 1);
        assert!(dir.path().join("report.xlsx").exists());
        assert!(dir.path().join("report.csv").exists());
    }

    #[test]
    fn test_failed_csv_write_removes_xlsx_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(
            &input,
            r#"[{"customerKey":"C1","visitDate":"2023-01-05","status":"COMPLETED"}]"#,
        )
        .unwrap();

        // A directory squatting on the csv path makes only the second
        // write fail.
        let base = dir.path().join("report");
        std::fs::create_dir(dir.path().join("report.csv")).unwrap();

        let err = run_export(&input, &base, &SheetConfig::default()).unwrap_err();
        assert!(matches!(err, ServisheetError::Io { .. }));
        assert!(!dir.path().join("report.xlsx").exists());
    }

    #[test]
    fn test_run_export_all_filtered_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(
            &input,
            r#"[{"customerKey":"C1","visitDate":"2023-01-05","status":"CANCELLED"}]"#,
        )
        .unwrap();

        let base = dir.path().join("report");
        let err = run_export(&input, &base, &SheetConfig::default()).unwrap_err();
        assert!(matches!(err, ServisheetError::EmptyResult));
        assert!(!dir.path().join("report.xlsx").exists());
        assert!(!dir.path().join("report.csv").exists());
    }
}
