/*!
 * Long-format unpivoting (import)
 *
 * Inverse of the pivoter: every `Visit {n}` column of an edited wide report
 * expands back into one visit event per (customer row, visit column), and
 * the customer rows themselves are deduplicated into a customer table. Wide
 * rows carry no id column, so the Name cell is the customer identity on the
 * way back in.
 */

use chrono::NaiveDate;
use log::warn;

use std::collections::HashMap;

use crate::data_types::{CustomerKey, ImportedCustomer, ImportedVisit};
use crate::dates;
use crate::reader::SheetTable;
use crate::report::ImportReport;
use crate::schema::{self, BaseColumn};
use crate::{Result, ServisheetError};

/// Indices of the recognized columns in an imported sheet
struct SheetLayout {
    name: Option<usize>,
    address: Option<usize>,
    phone: Option<usize>,
    city: Option<usize>,
    installation_date: Option<usize>,
    /// (sequence number, column index), sorted numerically
    visit_columns: Vec<(u32, usize)>,
}

impl SheetLayout {
    /// Relabel the header row back to internal columns. Unmapped headers are
    /// ignored.
    fn from_headers(headers: &[String]) -> Self {
        let mut layout = SheetLayout {
            name: None,
            address: None,
            phone: None,
            city: None,
            installation_date: None,
            visit_columns: Vec::new(),
        };

        for (index, header) in headers.iter().enumerate() {
            if let Some(n) = schema::parse_visit_label(header) {
                layout.visit_columns.push((n, index));
                continue;
            }
            match BaseColumn::from_label(header) {
                Some(BaseColumn::Name) => layout.name = Some(index),
                Some(BaseColumn::Address) => layout.address = Some(index),
                Some(BaseColumn::Phone) => layout.phone = Some(index),
                Some(BaseColumn::City) => layout.city = Some(index),
                Some(BaseColumn::InstallationDate) => layout.installation_date = Some(index),
                _ => {}
            }
        }

        layout.visit_columns.sort_by_key(|(n, _)| *n);
        layout
    }
}

/// Decide a customer's installation date on import: an explicit field that
/// normalizes wins, else the earliest parsed visit, else the customer row
/// fails with `NoInstallationDate`.
pub fn resolve_installation_date(
    explicit_text: Option<&str>,
    earliest_parsed_visit: Option<NaiveDate>,
    customer: &str,
) -> Result<NaiveDate> {
    if let Some(date) = explicit_text.and_then(dates::normalize) {
        return Ok(date);
    }
    earliest_parsed_visit.ok_or_else(|| ServisheetError::NoInstallationDate {
        customer: customer.to_string(),
    })
}

/// Attribute fields and accumulated visit dates for one customer key,
/// gathered across every row sharing the key
struct PendingCustomer {
    address: String,
    phone: String,
    city: String,
    explicit_installation: String,
    visit_dates: Vec<NaiveDate>,
}

/// Expand a wide report back into a deduplicated customer table and a visit
/// table.
///
/// Visit cells whose date does not normalize are dropped per cell; customer
/// rows without a determinable installation date are excluded per customer;
/// both are recorded in the report and neither aborts the run.
///
/// Attribute fields come from the first row bearing a key, but the
/// installation-date fallback takes the earliest surviving visit across all
/// rows sharing the key, so a duplicate row's dates count.
pub fn unpivot(
    table: &SheetTable,
    report: &mut ImportReport,
) -> Result<(Vec<ImportedCustomer>, Vec<ImportedVisit>)> {
    let layout = SheetLayout::from_headers(&table.headers);
    report.rows_read = table.rows.len();

    let cell = |row: &[String], index: Option<usize>| -> String {
        index
            .and_then(|i| row.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut order: Vec<String> = Vec::new();
    let mut pending: HashMap<String, PendingCustomer> = HashMap::new();
    let mut visits = Vec::new();

    for row in &table.rows {
        let name = cell(row, layout.name);
        if name.is_empty() {
            report.rows_skipped_blank_key += 1;
            continue;
        }

        // One candidate per visit column; absent cells pass silently,
        // unparseable text is dropped and counted.
        let mut row_visit_dates: Vec<NaiveDate> = Vec::new();
        for (_, column) in &layout.visit_columns {
            let raw = row.get(*column).map(|s| s.trim()).unwrap_or_default();
            if raw.is_empty() || raw == crate::constants::PLACEHOLDER {
                continue;
            }
            match dates::normalize(raw) {
                Some(date) => row_visit_dates.push(date),
                None => report.visit_cells_dropped += 1,
            }
        }

        for date in &row_visit_dates {
            visits.push(ImportedVisit {
                customer_key: CustomerKey(name.clone()),
                date: *date,
            });
        }

        // First occurrence wins for the attribute fields; every row sharing
        // the key feeds the accumulated visit dates.
        let entry = pending.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            PendingCustomer {
                address: cell(row, layout.address),
                phone: cell(row, layout.phone),
                city: cell(row, layout.city),
                explicit_installation: cell(row, layout.installation_date),
                visit_dates: Vec::new(),
            }
        });
        entry.visit_dates.append(&mut row_visit_dates);
    }

    let mut customers = Vec::new();
    for name in order {
        let Some(candidate) = pending.remove(&name) else {
            continue;
        };
        let explicit = (!candidate.explicit_installation.is_empty())
            .then_some(candidate.explicit_installation.as_str());
        let earliest = candidate.visit_dates.iter().min().copied();

        match resolve_installation_date(explicit, earliest, &name) {
            Ok(installation_date) => customers.push(ImportedCustomer {
                key: CustomerKey(name.clone()),
                name,
                address: candidate.address,
                phone: candidate.phone,
                city: candidate.city,
                installation_date,
            }),
            Err(err) if err.is_per_customer() => {
                warn!("Excluding customer '{}': {}", name, err);
                report.skip_customer(&name, "no determinable installation date");
            }
            Err(err) => return Err(err),
        }
    }

    report.customers_imported = customers.len();
    report.visits_imported = visits.len();
    Ok((customers, visits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sheet(headers: &[&str], rows: &[&[&str]]) -> SheetTable {
        SheetTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_resolver_prefers_explicit_field() {
        let resolved =
            resolve_installation_date(Some("05-01-2023"), Some(date(2023, 6, 10)), "C1").unwrap();
        assert_eq!(resolved, date(2023, 1, 5));
    }

    #[test]
    fn test_resolver_falls_back_to_earliest_visit() {
        let resolved =
            resolve_installation_date(Some("not a date"), Some(date(2023, 6, 10)), "C1").unwrap();
        assert_eq!(resolved, date(2023, 6, 10));

        let resolved = resolve_installation_date(None, Some(date(2023, 2, 1)), "C1").unwrap();
        assert_eq!(resolved, date(2023, 2, 1));
    }

    #[test]
    fn test_resolver_fails_without_any_date() {
        let err = resolve_installation_date(None, None, "C1").unwrap_err();
        assert!(matches!(err, ServisheetError::NoInstallationDate { .. }));
    }

    #[test]
    fn test_unpivot_expands_visit_columns() {
        let table = sheet(
            &["No", "Name", "Installation Date", "Visit 1", "Visit 2"],
            &[
                &["1", "Alice", "05-01-2023", "10-06-2023", "20-09-2023"],
                &["2", "Bob", "01-02-2023", "-", ""],
            ],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].installation_date, date(2023, 1, 5));
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].customer_key.as_str(), "Alice");
        assert_eq!(visits[0].date, date(2023, 6, 10));
        assert_eq!(visits[1].date, date(2023, 9, 20));
        assert_eq!(report.visit_cells_dropped, 0);
    }

    #[test]
    fn test_unpivot_drops_unparseable_cells() {
        let table = sheet(
            &["Name", "Installation Date", "Visit 1"],
            &[&["Alice", "05-01-2023", "soon"]],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers.len(), 1);
        assert!(visits.is_empty());
        assert_eq!(report.visit_cells_dropped, 1);
    }

    #[test]
    fn test_unpivot_dedupes_customers_first_occurrence_wins() {
        let table = sheet(
            &["Name", "Address", "Installation Date", "Visit 1"],
            &[
                &["Alice", "First St", "05-01-2023", "10-06-2023"],
                &["Alice", "Second St", "06-01-2023", "11-07-2023"],
            ],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].address, "First St");
        assert_eq!(customers[0].installation_date, date(2023, 1, 5));
        // Duplicate rows still contribute visits.
        assert_eq!(visits.len(), 2);
    }

    #[test]
    fn test_duplicate_row_visits_feed_installation_fallback() {
        // The first Alice row has neither an explicit installation date nor
        // a parseable visit; the duplicate row's visit must still resolve
        // her installation date.
        let table = sheet(
            &["Name", "Installation Date", "Visit 1"],
            &[
                &["Alice", "-", "-"],
                &["Alice", "-", "10-06-2023"],
            ],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].installation_date, date(2023, 6, 10));
        assert_eq!(visits.len(), 1);
        assert!(report.customers_skipped.is_empty());
    }

    #[test]
    fn test_duplicate_row_earlier_visit_lowers_installation_fallback() {
        let table = sheet(
            &["Name", "Installation Date", "Visit 1"],
            &[
                &["Alice", "", "10-06-2023"],
                &["Alice", "", "05-01-2023"],
            ],
        );
        let mut report = ImportReport::default();
        let (customers, _) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers[0].installation_date, date(2023, 1, 5));
    }

    #[test]
    fn test_unpivot_excludes_customer_without_installation_date() {
        let table = sheet(
            &["Name", "Installation Date", "Visit 1"],
            &[
                &["Alice", "-", ""],
                &["Bob", "05-01-2023", ""],
            ],
        );
        let mut report = ImportReport::default();
        let (customers, _) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Bob");
        assert_eq!(report.customers_skipped.len(), 1);
        assert_eq!(report.customers_skipped[0].0, "Alice");
    }

    #[test]
    fn test_unpivot_skips_blank_identity_rows() {
        let table = sheet(
            &["Name", "Visit 1"],
            &[&["", "10-06-2023"], &["Alice", "10-06-2023"]],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(visits.len(), 1);
        assert_eq!(report.rows_skipped_blank_key, 1);
    }

    #[test]
    fn test_unpivot_ignores_unknown_columns() {
        let table = sheet(
            &["Name", "Favourite Color", "Visit 1"],
            &[&["Alice", "teal", "10-06-2023"]],
        );
        let mut report = ImportReport::default();
        let (customers, visits) = unpivot(&table, &mut report).unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(visits.len(), 1);
    }
}
