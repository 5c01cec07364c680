/*!
 * Import pipeline
 *
 * Reads an edited wide report back in, unpivots it, and writes the two
 * delimited artifacts the host application re-absorbs: a deduplicated
 * customer table and a visit table, under fixed file names in the output
 * directory. Dates in both are ISO year-month-day. As on export, the
 * artifacts are serialized in memory first and only then written out.
 */

use std::path::{Path, PathBuf};

use crate::config::SheetConfig;
use crate::constants::{CUSTOMERS_IMPORT_FILE, VISITS_IMPORT_FILE};
use crate::data_types::{ImportedCustomer, ImportedVisit};
use crate::dates;
use crate::reader::load_sheet;
use crate::report::ImportReport;
use crate::unpivot::unpivot;
use crate::{Result, ServisheetError};

fn serialize_customers(customers: &[ImportedCustomer]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "address", "phone", "city", "installationDate"])?;
    for customer in customers {
        let installation = dates::format_iso(customer.installation_date);
        writer.write_record([
            customer.name.as_str(),
            customer.address.as_str(),
            customer.phone.as_str(),
            customer.city.as_str(),
            installation.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|e| ServisheetError::Export {
        message: e.to_string(),
        suggestion: None,
    })
}

fn serialize_visits(visits: &[ImportedVisit]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["name", "visitDate"])?;
    for visit in visits {
        let date = dates::format_iso(visit.date);
        writer.write_record([visit.customer_key.as_str(), date.as_str()])?;
    }
    writer.into_inner().map_err(|e| ServisheetError::Export {
        message: e.to_string(),
        suggestion: None,
    })
}

/// Fixed output locations of an import run
pub fn import_artifact_paths(output_dir: &Path) -> (PathBuf, PathBuf) {
    (
        output_dir.join(CUSTOMERS_IMPORT_FILE),
        output_dir.join(VISITS_IMPORT_FILE),
    )
}

/// Run the whole import flow: an edited `.xlsx` or `.csv` report in, the
/// deduplicated customer table and the visit table out.
///
/// Per-cell date faults and per-customer installation-date failures are
/// absorbed into the report; only an unreadable input or unwritable output
/// aborts the run.
pub fn run_import(input: &Path, output_dir: &Path, _config: &SheetConfig) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    let table = load_sheet(input)?;
    let (customers, visits) = unpivot(&table, &mut report)?;

    let customers_bytes = serialize_customers(&customers)?;
    let visits_bytes = serialize_visits(&visits)?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| ServisheetError::io_with_path(e, output_dir))?;
    let (customers_path, visits_path) = import_artifact_paths(output_dir);
    std::fs::write(&customers_path, customers_bytes)
        .map_err(|e| ServisheetError::io_with_path(e, &customers_path))?;
    if let Err(e) = std::fs::write(&visits_path, visits_bytes) {
        // A failing run leaves neither artifact behind.
        let _ = std::fs::remove_file(&customers_path);
        return Err(ServisheetError::io_with_path(e, &visits_path));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_import_writes_fixed_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.csv");
        std::fs::write(
            &input,
            "No,Name,Address,Phone,City,Installation Date,Last Visit,Customer Notes,Service Notes,Visit 1,Visit 2\n\
             1,Alice,First St,555,Springfield,05-01-2023,20-09-2023,,notes,10-06-2023,20-09-2023\n\
             2,Bob,Second St,556,Shelbyville,-,-,,,-,-\n",
        )
        .unwrap();

        let out = dir.path().join("out");
        let report = run_import(&input, &out, &SheetConfig::default()).unwrap();

        assert!(out.join("customers_to_import.csv").exists());
        assert!(out.join("visits_to_import.csv").exists());
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.customers_imported, 1);
        assert_eq!(report.visits_imported, 2);
        // Bob has neither an explicit installation date nor a parsed visit
        assert_eq!(report.customers_skipped.len(), 1);
        assert_eq!(report.customers_skipped[0].0, "Bob");

        let customers = std::fs::read_to_string(out.join("customers_to_import.csv")).unwrap();
        assert!(customers.starts_with("name,address,phone,city,installationDate"));
        assert!(customers.contains("Alice,First St,555,Springfield,2023-01-05"));

        let visits = std::fs::read_to_string(out.join("visits_to_import.csv")).unwrap();
        assert!(visits.contains("Alice,2023-06-10"));
        assert!(visits.contains("Alice,2023-09-20"));
    }

    #[test]
    fn test_failed_visits_write_removes_customers_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.csv");
        std::fs::write(
            &input,
            "Name,Installation Date,Visit 1\nAlice,05-01-2023,10-06-2023\n",
        )
        .unwrap();

        // A directory squatting on the visits path makes only the second
        // write fail.
        let out = dir.path().join("out");
        std::fs::create_dir_all(out.join(VISITS_IMPORT_FILE)).unwrap();

        let err = run_import(&input, &out, &SheetConfig::default()).unwrap_err();
        assert!(matches!(err, ServisheetError::Io { .. }));
        assert!(!out.join(CUSTOMERS_IMPORT_FILE).exists());
    }

    #[test]
    fn test_run_import_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_import(
            &dir.path().join("missing.csv"),
            dir.path(),
            &SheetConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ServisheetError::FileNotFound { .. }));
    }
}
