use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use servisheet::prelude::*;

// Synthetic visit log: `customers` customers with `visits_each` completed
// visits apiece, dates spread over consecutive days
fn synthetic_log(customers: usize, visits_each: usize) -> Vec<VisitRecord> {
    let mut records = Vec::with_capacity(customers * visits_each);
    for c in 0..customers {
        for v in 0..visits_each {
            let day = 1 + ((v * 13) % 28) as u32;
            let month = 1 + (v % 12) as u32;
            records.push(VisitRecord {
                customer_key: format!("C{c:05}"),
                name: format!("Customer {c}"),
                address: format!("{c} Main St"),
                phone: format!("555-{c:05}"),
                city: "Springfield".to_string(),
                customer_notes: String::new(),
                visit_date: format!("{day:02}-{month:02}-2023"),
                notes: if v % 3 == 0 { format!("visit {v}") } else { String::new() },
                status: VisitStatus::Completed,
            });
        }
    }
    records
}

fn benchmark_date_normalizer(c: &mut Criterion) {
    c.bench_function("normalize_day_first", |b| {
        b.iter(|| servisheet::dates::normalize(black_box("05-01-2023")))
    });

    // Worst case: every pattern is tried and none matches
    c.bench_function("normalize_miss", |b| {
        b.iter(|| servisheet::dates::normalize(black_box("next tuesday")))
    });
}

fn benchmark_aggregate_and_pivot(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_pivot");

    for (customers, visits_each) in [(100, 5), (1_000, 10), (5_000, 20)] {
        let records = synthetic_log(customers, visits_each);
        group.bench_with_input(
            BenchmarkId::new("pivot", format!("{customers}x{visits_each}")),
            &records,
            |b, records| {
                b.iter(|| {
                    let mut report = ExportReport::default();
                    let groups = aggregate(black_box(records), &mut report);
                    pivot(&groups)
                })
            },
        );
    }

    group.finish();
}

fn benchmark_unpivot(c: &mut Criterion) {
    // Round-trip the synthetic log into a raw sheet once, then measure the
    // inverse transform alone.
    let records = synthetic_log(1_000, 10);
    let mut report = ExportReport::default();
    let groups = aggregate(&records, &mut report);
    let table = pivot(&groups);

    let headers: Vec<String> = table.columns.iter().map(|k| k.label()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Text(s) => s.clone(),
                    Cell::Number(n) => n.to_string(),
                    Cell::Date(d) => d.format("%d-%m-%Y").to_string(),
                    Cell::Empty => "-".to_string(),
                })
                .collect()
        })
        .collect();
    let sheet = SheetTable { headers, rows };

    c.bench_function("unpivot_1000x10", |b| {
        b.iter(|| {
            let mut report = ImportReport::default();
            unpivot(black_box(&sheet), &mut report).unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_date_normalizer,
    benchmark_aggregate_and_pivot,
    benchmark_unpivot
);
criterion_main!(benches);
