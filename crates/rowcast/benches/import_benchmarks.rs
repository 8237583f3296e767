//! Import pipeline benchmarks.
//!
//! Measures parsing, header resolution and full-run throughput across
//! input sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use rowcast::{ColumnDefinition, Config, Header, ImportRecord, Importer, Reader};

/// A record that accepts everything and persists nothing.
#[derive(Default)]
struct NullRecord {
    email: Option<String>,
    name: Option<String>,
    persisted: bool,
}

impl ImportRecord for NullRecord {
    fn build() -> Self {
        NullRecord::default()
    }
    fn persisted(&self) -> bool {
        self.persisted
    }
    fn save(&mut self) -> bool {
        self.persisted = true;
        true
    }
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "email" => self.email.clone(),
            "name" => self.name.clone(),
            _ => None,
        }
    }
    fn set_attribute(&mut self, name: &str, value: String) {
        match name {
            "email" => self.email = Some(value),
            "name" => self.name = Some(value),
            _ => {}
        }
    }
    fn find_by(_criteria: &[(String, Option<String>)]) -> Option<Self> {
        None
    }
    fn validation_errors(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Generate synthetic CSV data with the specified number of rows.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("email,name,age,city\n");
    for row in 0..rows {
        data.push_str(&format!(
            "user{row}@example.com,User {row},{},City {}\n",
            20 + row % 60,
            row % 10
        ));
    }
    data
}

fn config() -> Config<NullRecord> {
    Config::new()
        .column(ColumnDefinition::new("email").required())
        .column(ColumnDefinition::new("name"))
}

/// Benchmark parsing inputs of various sizes, delimiter auto-detected.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows);
        let bytes = data.len();

        group.throughput(Throughput::Bytes(bytes as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || Reader::from_content(data.clone()),
                |mut reader| {
                    black_box(reader.rows().expect("parses").len());
                },
            );
        });
    }

    group.finish();
}

/// Benchmark resolving a wide header against many definitions.
fn bench_header_resolution(c: &mut Criterion) {
    let definitions: Vec<ColumnDefinition<NullRecord>> = (0..50)
        .map(|i| ColumnDefinition::new(format!("column_{i}")))
        .collect();
    let names: Vec<String> = (0..50).map(|i| format!("Column {i}")).collect();

    c.bench_function("header_resolution", |b| {
        b.iter_with_setup(
            || (definitions.clone(), names.clone()),
            |(definitions, names)| {
                let header = Header::new(definitions, names);
                black_box(header.valid());
            },
        );
    });
}

/// Benchmark a full import run end to end.
fn bench_full_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_import");

    for rows in [100, 1_000].iter() {
        let data = generate_csv_data(*rows);

        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter_with_setup(
                || Importer::from_content(data.clone(), config()),
                |mut import| {
                    black_box(import.run().created_rows().len());
                },
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_header_resolution,
    bench_full_import
);
criterion_main!(benches);
