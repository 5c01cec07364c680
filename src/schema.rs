/*!
 * Column schema for the wide-format report
 *
 * Fixes the internal-key to display-label mapping and the deterministic
 * column ordering: base columns in a canonical sequence (identity and
 * contact fields, then date fields, then notes fields), visit columns
 * appended afterward sorted numerically by their trailing sequence number.
 * "Visit 2" precedes "Visit 10"; lexicographic ordering is never used.
 */

use crate::constants::VISIT_COLUMN_PREFIX;

/// Base (non-visit) columns of the wide report, in canonical display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseColumn {
    /// 1-based row number
    RowNumber,
    Name,
    Address,
    Phone,
    City,
    InstallationDate,
    LastVisitDate,
    CustomerNotes,
    ServiceNotes,
}

impl BaseColumn {
    /// All base columns in canonical order
    pub const ALL: [BaseColumn; 9] = [
        BaseColumn::RowNumber,
        BaseColumn::Name,
        BaseColumn::Address,
        BaseColumn::Phone,
        BaseColumn::City,
        BaseColumn::InstallationDate,
        BaseColumn::LastVisitDate,
        BaseColumn::CustomerNotes,
        BaseColumn::ServiceNotes,
    ];

    /// Display label used in spreadsheet headers
    pub fn label(&self) -> &'static str {
        match self {
            BaseColumn::RowNumber => "No",
            BaseColumn::Name => "Name",
            BaseColumn::Address => "Address",
            BaseColumn::Phone => "Phone",
            BaseColumn::City => "City",
            BaseColumn::InstallationDate => "Installation Date",
            BaseColumn::LastVisitDate => "Last Visit",
            BaseColumn::CustomerNotes => "Customer Notes",
            BaseColumn::ServiceNotes => "Service Notes",
        }
    }

    /// Look a base column up by its display label (import relabeling)
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label.trim())
    }

    /// Whether the column holds a calendar date
    pub fn is_date(&self) -> bool {
        matches!(self, BaseColumn::InstallationDate | BaseColumn::LastVisitDate)
    }

    /// Whether the column holds free text that wants wrapping in the styled
    /// artifact
    pub fn is_notes(&self) -> bool {
        matches!(self, BaseColumn::CustomerNotes | BaseColumn::ServiceNotes)
    }
}

/// A column of the wide table: a fixed base column or a numbered visit column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Base(BaseColumn),
    /// Routine visit column, 1-based sequence number
    Visit(u32),
}

impl ColumnKey {
    /// Display label used in spreadsheet headers
    pub fn label(&self) -> String {
        match self {
            ColumnKey::Base(base) => base.label().to_string(),
            ColumnKey::Visit(n) => format!("{}{}", VISIT_COLUMN_PREFIX, n),
        }
    }
}

/// Parse a visit column label ("Visit 3") into its sequence number.
/// Returns `None` for anything that is not the prefix plus a bare number.
pub fn parse_visit_label(label: &str) -> Option<u32> {
    let rest = label.trim().strip_prefix(VISIT_COLUMN_PREFIX)?;
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Build the full ordered column list for a report with `max_visits` visit
/// columns: every base column, then Visit 1..=max_visits
pub fn ordered_columns(max_visits: u32) -> Vec<ColumnKey> {
    let mut columns: Vec<ColumnKey> = BaseColumn::ALL.iter().copied().map(ColumnKey::Base).collect();
    columns.extend((1..=max_visits).map(ColumnKey::Visit));
    columns
}

/// Sort visit column labels numerically by trailing sequence number.
/// Non-visit labels are dropped.
pub fn sort_visit_labels(labels: &[String]) -> Vec<String> {
    let mut numbered: Vec<(u32, &String)> = labels
        .iter()
        .filter_map(|l| parse_visit_label(l).map(|n| (n, l)))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);
    numbered.into_iter().map(|(_, l)| l.clone()).collect()
}
