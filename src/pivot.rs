/*!
 * Wide-format pivoting
 *
 * Projects each customer group into one row: base attribute cells, the two
 * derived dates, the notes aggregate, then one dated cell per routine visit
 * at its `Visit {n}` column. The visit column set is the union of sequence
 * numbers across all customers, so the table stays rectangular; customers
 * with fewer visits get absent cells in the higher-numbered columns.
 */

use crate::data_types::{Cell, CustomerGroup, WideTable};
use crate::schema::{self, BaseColumn, ColumnKey};

/// Pivot aggregated customer groups into the wide report table.
///
/// Row order follows the group order handed in. Absent dates stay typed
/// absent here; the placeholder dash belongs to the rendering surfaces.
pub fn pivot(groups: &[CustomerGroup]) -> WideTable {
    let max_visits = groups.iter().map(|g| g.visits.max_sequence()).max().unwrap_or(0);
    let columns = schema::ordered_columns(max_visits);

    let rows = groups
        .iter()
        .enumerate()
        .map(|(index, group)| build_row(index, group, &columns))
        .collect();

    WideTable { columns, rows }
}

fn build_row(index: usize, group: &CustomerGroup, columns: &[ColumnKey]) -> Vec<Cell> {
    let customer = &group.customer;
    columns
        .iter()
        .map(|key| match key {
            ColumnKey::Base(BaseColumn::RowNumber) => Cell::Number((index + 1) as u32),
            ColumnKey::Base(BaseColumn::Name) => Cell::Text(customer.name.clone()),
            ColumnKey::Base(BaseColumn::Address) => Cell::Text(customer.address.clone()),
            ColumnKey::Base(BaseColumn::Phone) => Cell::Text(customer.phone.clone()),
            ColumnKey::Base(BaseColumn::City) => Cell::Text(customer.city.clone()),
            ColumnKey::Base(BaseColumn::InstallationDate) => Cell::Date(customer.installation_date),
            ColumnKey::Base(BaseColumn::LastVisitDate) => Cell::Date(customer.last_visit_date),
            ColumnKey::Base(BaseColumn::CustomerNotes) => Cell::Text(customer.customer_notes.clone()),
            ColumnKey::Base(BaseColumn::ServiceNotes) => Cell::Text(customer.service_notes.clone()),
            ColumnKey::Visit(n) => group
                .visits
                .iter()
                .find(|v| v.sequence_number == *n)
                .map(|v| Cell::Date(v.date))
                .unwrap_or(Cell::Empty),
        })
        .collect()
}
