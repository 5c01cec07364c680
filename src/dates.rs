/*!
 * Heterogeneous date text normalization
 *
 * Spreadsheet edits arrive with dates typed by hand in whatever format the
 * editor favored. Parsing tries a fixed, priority-ordered list of chrono
 * patterns and the first match wins. Day-first patterns outrank month-first,
 * so a digit string both could match (two-digit day and month each <= 12) is
 * always read day-first. That ambiguity is resolved by pattern priority
 * alone; there is no contextual disambiguation.
 */

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;

use crate::constants::PLACEHOLDER;

/// Whether a pattern carries a time-of-day component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    DateOnly,
    DateTime,
}

/// The supported date patterns, highest priority first
const DATE_PATTERNS: &[(&str, PatternKind)] = &[
    ("%d-%m-%Y", PatternKind::DateOnly),
    ("%d/%m/%Y", PatternKind::DateOnly),
    ("%Y-%m-%d", PatternKind::DateOnly),
    ("%Y/%m/%d", PatternKind::DateOnly),
    ("%Y-%m-%d %H:%M:%S", PatternKind::DateTime),
    ("%m/%d/%Y", PatternKind::DateOnly),
    ("%m-%d-%Y", PatternKind::DateOnly),
];

/// Parse heterogeneous date text into a canonical calendar date.
///
/// Returns `None` (never an error) for blank input, the placeholder dash,
/// and text matching none of the supported patterns; only the last case logs
/// a warning. Time-of-day in timestamp input is discarded.
pub fn normalize(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return None;
    }

    for (pattern, kind) in DATE_PATTERNS {
        let parsed = match kind {
            PatternKind::DateOnly => NaiveDate::parse_from_str(trimmed, pattern).ok(),
            PatternKind::DateTime => {
                NaiveDateTime::parse_from_str(trimmed, pattern)
                    .ok()
                    .map(|dt| dt.date())
            }
        };
        if let Some(date) = parsed {
            return Some(date);
        }
    }

    warn!("Unparseable date text '{}', treating as absent", trimmed);
    None
}

/// Render a date as day-month-year text (`05-01-2023`)
pub fn format_dmy(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Render a date as ISO year-month-day text (`2023-01-05`)
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Render an optional date, substituting the placeholder dash when absent
pub fn render_or_placeholder(date: Option<NaiveDate>, dmy: bool) -> String {
    match date {
        Some(d) if dmy => format_dmy(d),
        Some(d) => format_iso(d),
        None => PLACEHOLDER.to_string(),
    }
}
