/*!
 * # Servisheet
 *
 * Converts a normalized, append-only log of customer service visits into a
 * denormalized spreadsheet report (one row per customer, numbered visit
 * columns) that non-technical users can review and edit in ordinary
 * spreadsheet tools, and performs the inverse transform to re-absorb their
 * edits.
 *
 * ## The transform
 *
 * On export, completed visits are grouped per customer; the chronologically
 * earliest visit becomes the installation event, the rest become routine
 * visits numbered `Visit 1..k`, and every visit's notes are aggregated
 * chronologically. The result is written twice from the identical table: a
 * styled `.xlsx` and a plain `.csv`.
 *
 * On import, the numbered visit columns of an edited report are expanded
 * back into one record per visit, dates are recovered through a fixed,
 * priority-ordered list of textual patterns, and each customer's
 * installation date is resolved from the explicit column or the earliest
 * parsed visit.
 *
 * ## Quick start
 *
 * ```no_run
 * use servisheet::prelude::*;
 * use std::path::Path;
 *
 * # fn main() -> servisheet::Result<()> {
 * let config = SheetConfig::default();
 *
 * // Visit log -> report.xlsx + report.csv
 * let report = run_export(Path::new("visits.json"), Path::new("report"), &config)?;
 * report.print_summary();
 *
 * // Edited report -> customers_to_import.csv + visits_to_import.csv
 * let report = run_import(Path::new("report.xlsx"), Path::new("out"), &config)?;
 * report.print_summary();
 * # Ok(())
 * # }
 * ```
 *
 * ## Engine pieces
 *
 * The pipeline stages are public for callers that want to drive the
 * transform themselves:
 *
 * ```
 * use servisheet::prelude::*;
 *
 * # fn main() -> servisheet::Result<()> {
 * let records = vec![VisitRecord {
 *     customer_key: "C1".to_string(),
 *     name: "Alice".to_string(),
 *     address: String::new(),
 *     phone: String::new(),
 *     city: String::new(),
 *     customer_notes: String::new(),
 *     visit_date: "2023-01-05".to_string(),
 *     notes: "install".to_string(),
 *     status: VisitStatus::Completed,
 * }];
 *
 * let mut report = ExportReport::default();
 * let completed = filter_completed(records)?;
 * let groups = aggregate(&completed, &mut report);
 * let table = pivot(&groups);
 * assert_eq!(table.row_count(), 1);
 * # Ok(())
 * # }
 * ```
 *
 * Error taxonomy: whole-run conditions (empty input, everything filtered
 * out, unreadable input, unwritable output) are fatal and leave no partial
 * output; a single unparseable date or a customer row without a
 * determinable installation date is absorbed locally and counted in the
 * run report.
 */

// Re-export error types from root
pub use error::{Result, ServisheetError};

// Public modules
pub mod aggregate;
pub mod config;
pub mod data_types;
pub mod dates;
pub mod error;
pub mod export;
pub mod import;
pub mod pivot;
pub mod reader;
pub mod report;
pub mod schema;
pub mod unpivot;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```
/// use servisheet::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::{aggregate, filter_completed};
    pub use crate::config::{ConfigBuilder, SheetConfig};
    pub use crate::data_types::*;
    pub use crate::dates::normalize;
    pub use crate::error::{Result, ServisheetError};
    pub use crate::export::{run_export, DelimitedExporter, WideTableExporter, XlsxExporter};
    pub use crate::import::run_import;
    pub use crate::pivot::pivot;
    pub use crate::reader::{load_sheet, load_visit_records, SheetTable};
    pub use crate::report::{ExportReport, ImportReport};
    pub use crate::schema::{BaseColumn, ColumnKey};
    pub use crate::unpivot::{resolve_installation_date, unpivot};
}

/// Engine constants
pub mod constants {
    /// Rendering for absent cells at the text surfaces
    pub const PLACEHOLDER: &str = "-";

    /// Header prefix of the numbered visit columns
    pub const VISIT_COLUMN_PREFIX: &str = "Visit ";

    /// Fixed file name of the deduplicated customer table written on import
    pub const CUSTOMERS_IMPORT_FILE: &str = "customers_to_import.csv";

    /// Fixed file name of the visit table written on import
    pub const VISITS_IMPORT_FILE: &str = "visits_to_import.csv";

    /// Marker printed on stdout by the CLI when a run succeeds
    pub const SUCCESS_MARKER: &str = "SUCCESS";

    /// Marker printed on stderr by the CLI when a run fails
    pub const ERROR_MARKER: &str = "ERROR";
}
