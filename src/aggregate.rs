/*!
 * Visit filtering, grouping and aggregation
 *
 * Turns the flat visit log into one `CustomerGroup` per customer: the
 * chronologically earliest completed visit becomes the installation event,
 * the rest become the numbered routine visits, and every visit with
 * non-blank notes contributes a dated entry to the notes aggregate.
 */

use std::collections::HashMap;

use chrono::NaiveDate;
use log::warn;

use crate::data_types::{
    Customer, CustomerGroup, CustomerKey, RoutineVisit, VisitRecord, VisitSequence, VisitStatus,
};
use crate::dates;
use crate::report::ExportReport;
use crate::{Result, ServisheetError};

/// Keep only completed visits.
///
/// Fatal when the input is empty (`EmptyInput`) or when filtering removes
/// every record (`EmptyResult`): either way there is nothing to report.
pub fn filter_completed(records: Vec<VisitRecord>) -> Result<Vec<VisitRecord>> {
    if records.is_empty() {
        return Err(ServisheetError::EmptyInput);
    }

    let completed: Vec<VisitRecord> = records
        .into_iter()
        .filter(|r| r.status == VisitStatus::Completed)
        .collect();

    if completed.is_empty() {
        return Err(ServisheetError::EmptyResult);
    }

    Ok(completed)
}

/// A record that survived date normalization, with its parsed date and its
/// position in the input (the stable tie-break for equal dates)
struct DatedRecord<'a> {
    input_index: usize,
    date: NaiveDate,
    record: &'a VisitRecord,
}

/// Group completed records by customer key and derive each customer's
/// installation date, last visit date, notes aggregate and routine visit
/// sequence.
///
/// Records whose date text does not normalize are dropped per record and
/// counted in the report. Groups are returned sorted by customer key.
pub fn aggregate(records: &[VisitRecord], report: &mut ExportReport) -> Vec<CustomerGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<DatedRecord<'_>>> = HashMap::new();

    for (input_index, record) in records.iter().enumerate() {
        if record.customer_key.trim().is_empty() {
            warn!("Dropping visit record {} with blank customer key", input_index);
            report.records_dropped_blank_key += 1;
            continue;
        }
        let Some(date) = dates::normalize(&record.visit_date) else {
            warn!(
                "Dropping visit for customer '{}' with unusable date '{}'",
                record.customer_key, record.visit_date
            );
            report.records_dropped_no_date += 1;
            continue;
        };

        let key = record.customer_key.as_str();
        if !groups.contains_key(key) {
            order.push(key);
        }
        groups.entry(key).or_default().push(DatedRecord {
            input_index,
            date,
            record,
        });
    }

    let mut result: Vec<CustomerGroup> = Vec::with_capacity(order.len());
    for key in order {
        let mut group = groups.remove(key).unwrap_or_default();

        // Attribute fields come from the first record seen in input order,
        // which is not necessarily the installation record.
        let Some(first_seen) = group.iter().min_by_key(|r| r.input_index).map(|r| r.record)
        else {
            continue;
        };
        let (name, address, phone, city, customer_notes) = (
            first_seen.name.clone(),
            first_seen.address.clone(),
            first_seen.phone.clone(),
            first_seen.city.clone(),
            first_seen.customer_notes.clone(),
        );

        // Stable sort: equal dates keep input order
        group.sort_by_key(|r| r.date);

        let installation_date = group[0].date;
        let last_visit_date = group[group.len() - 1].date;
        let service_notes = aggregate_notes(&group);

        let visits = VisitSequence {
            visits: group[1..]
                .iter()
                .enumerate()
                .map(|(i, r)| RoutineVisit {
                    sequence_number: (i + 1) as u32,
                    date: r.date,
                })
                .collect(),
        };

        result.push(CustomerGroup {
            customer: Customer {
                key: CustomerKey(key.to_string()),
                name,
                address,
                phone,
                city,
                customer_notes,
                installation_date,
                last_visit_date,
                service_notes,
            },
            visits,
        });
    }

    result.sort_by(|a, b| a.customer.key.as_str().cmp(b.customer.key.as_str()));
    report.customers_exported = result.len();
    result
}

/// Build the chronological notes aggregate for one sorted group: one
/// `"{dd-mm-yyyy}\n{trimmed note}"` entry per visit with non-blank notes
/// (installation included), joined by a blank line. Empty when no visit
/// carried notes.
fn aggregate_notes(sorted_group: &[DatedRecord<'_>]) -> String {
    let entries: Vec<String> = sorted_group
        .iter()
        .filter(|r| r.record.has_notes())
        .map(|r| format!("{}\n{}", dates::format_dmy(r.date), r.record.notes.trim()))
        .collect();
    entries.join("\n\n")
}
