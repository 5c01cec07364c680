/*!
 * Data type definitions for visit logs and wide-format reports
 *
 * The long side of the transform is `VisitRecord` (one service event, as read
 * from the JSON transport). The wide side is `WideTable` (one row per
 * customer, numbered visit columns). Everything between the two is derived on
 * every run and never persisted.
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::ColumnKey;

/// Stable customer identity (an id or a unique name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerKey(pub String);

impl CustomerKey {
    /// Create a new key, rejecting blank identities
    pub fn new(key: String) -> Result<Self, crate::ServisheetError> {
        if key.trim().is_empty() {
            return Err(crate::ServisheetError::Configuration {
                message: "Customer key cannot be blank".to_string(),
                suggestion: Some(
                    "Every visit record needs a customerKey identifying its customer".to_string(),
                ),
            });
        }
        Ok(CustomerKey(key))
    }

    /// Get the key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visit lifecycle status; only `Completed` participates in export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisitStatus {
    Completed,
    Scheduled,
    Cancelled,
    /// Unrecognized status text, carried as data
    Other(String),
}

impl VisitStatus {
    pub fn from_text(text: &str) -> Self {
        match text.trim().to_uppercase().as_str() {
            "COMPLETED" => VisitStatus::Completed,
            "SCHEDULED" => VisitStatus::Scheduled,
            "CANCELLED" | "CANCELED" => VisitStatus::Cancelled,
            _ => VisitStatus::Other(text.to_string()),
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            VisitStatus::Completed => "COMPLETED",
            VisitStatus::Scheduled => "SCHEDULED",
            VisitStatus::Cancelled => "CANCELLED",
            VisitStatus::Other(text) => text,
        }
    }
}

impl Default for VisitStatus {
    fn default() -> Self {
        VisitStatus::Other(String::new())
    }
}

impl From<String> for VisitStatus {
    fn from(text: String) -> Self {
        VisitStatus::from_text(&text)
    }
}

impl From<VisitStatus> for String {
    fn from(status: VisitStatus) -> Self {
        status.as_text().to_string()
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// One service event as handed in over the JSON transport.
/// Immutable once read; the engine only filters and groups these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub customer_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub customer_notes: String,
    /// Raw date text; run through the date normalizer before use
    #[serde(default)]
    pub visit_date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: VisitStatus,
}

impl VisitRecord {
    /// Whether this record's notes contribute an entry to the notes aggregate
    pub fn has_notes(&self) -> bool {
        !self.notes.trim().is_empty()
    }
}

/// One row of the customer table, derived by grouping completed visits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub key: CustomerKey,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub customer_notes: String,
    /// Date of the chronologically earliest visit
    pub installation_date: NaiveDate,
    /// Date of the chronologically latest visit
    pub last_visit_date: NaiveDate,
    /// Chronological, blank-line-joined notes aggregate; empty when no visit
    /// carried notes
    pub service_notes: String,
}

/// One routine visit with its per-customer sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineVisit {
    /// 1-based, contiguous within a customer
    pub sequence_number: u32,
    pub date: NaiveDate,
}

/// Ordered routine visits for one customer (installation excluded), sorted by
/// date ascending
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitSequence {
    pub visits: Vec<RoutineVisit>,
}

impl VisitSequence {
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Highest sequence number in the sequence, 0 when empty
    pub fn max_sequence(&self) -> u32 {
        self.visits.last().map(|v| v.sequence_number).unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoutineVisit> {
        self.visits.iter()
    }
}

/// Aggregation output for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerGroup {
    pub customer: Customer,
    pub visits: VisitSequence,
}

/// A single cell of the wide table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
    Number(u32),
    /// Absent value; rendered as the placeholder dash at text surfaces
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell's date, when it holds one
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(date) => Some(*date),
            _ => None,
        }
    }
}

/// The externally visible wide shape: one row per customer, rectangular
/// (every row has one cell per column, absent cells included)
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<Vec<Cell>>,
}

impl WideTable {
    /// Number of customer rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column key), if the column exists
    pub fn cell(&self, row: usize, key: &ColumnKey) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| c == key)?;
        self.rows.get(row)?.get(col)
    }
}

/// Deduplicated customer row recovered on import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedCustomer {
    pub key: CustomerKey,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub city: String,
    pub installation_date: NaiveDate,
}

/// One visit event recovered from a wide row's visit column
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedVisit {
    pub customer_key: CustomerKey,
    pub date: NaiveDate,
}
