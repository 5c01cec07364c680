/*!
 * Run reports for export and import
 *
 * Per-item faults (an unparseable date, a blank-notes visit) and
 * per-customer faults (no determinable installation date) do not abort a
 * run; they are counted here and the run still reports overall success.
 */

/// Outcome counters for one export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Records present in the input transport
    pub records_read: usize,
    /// Records that survived the completed-status filter
    pub records_completed: usize,
    /// Completed records dropped because their date did not normalize
    pub records_dropped_no_date: usize,
    /// Completed records dropped for a blank customer identity
    pub records_dropped_blank_key: usize,
    /// Customer rows in the wide table
    pub customers_exported: usize,
    /// Number of `Visit {n}` columns in the report
    pub visit_columns: u32,
}

impl ExportReport {
    pub fn print_summary(&self) {
        println!("=== Export Summary ===");
        println!("Records read: {}", self.records_read);
        println!("Completed records: {}", self.records_completed);
        println!("Dropped (unparseable date): {}", self.records_dropped_no_date);
        println!("Dropped (blank identity): {}", self.records_dropped_blank_key);
        println!("Customers exported: {}", self.customers_exported);
        println!("Visit columns: {}", self.visit_columns);
    }
}

/// Outcome counters for one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Data rows in the input spreadsheet
    pub rows_read: usize,
    /// Deduplicated customers written out
    pub customers_imported: usize,
    /// Visit events written out
    pub visits_imported: usize,
    /// Visit cells dropped because their date did not normalize
    pub visit_cells_dropped: usize,
    /// Rows skipped for a blank customer identity
    pub rows_skipped_blank_key: usize,
    /// Customers excluded with the reason, keyed by customer identity
    pub customers_skipped: Vec<(String, String)>,
}

impl ImportReport {
    /// Record a per-customer exclusion
    pub fn skip_customer(&mut self, key: &str, reason: &str) {
        self.customers_skipped.push((key.to_string(), reason.to_string()));
    }

    pub fn print_summary(&self) {
        println!("=== Import Summary ===");
        println!("Rows read: {}", self.rows_read);
        println!("Customers imported: {}", self.customers_imported);
        println!("Visits imported: {}", self.visits_imported);
        println!("Dropped visit cells (unparseable date): {}", self.visit_cells_dropped);
        println!("Rows skipped (blank identity): {}", self.rows_skipped_blank_key);
        if !self.customers_skipped.is_empty() {
            println!("Customers skipped: {}", self.customers_skipped.len());
            for (key, reason) in &self.customers_skipped {
                println!("  {}: {}", key, reason);
            }
        }
    }
}
