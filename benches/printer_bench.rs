use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvkit::dialect::default_dialect;
use csvkit::printer::{PrintValue, Printer, StringSink};

fn generate_rows(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| {
            vec![
                format!("{i}"),
                format!("name with, a comma {i}"),
                "plain value".to_string(),
            ]
        })
        .collect()
}

fn bench_printer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("printer_throughput");

    for rows in [1_000, 10_000, 50_000] {
        let data = generate_rows(rows);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("print_records", rows), &data, |b, data| {
            b.iter(|| {
                let mut printer = Printer::new(StringSink::new(), default_dialect()).unwrap();
                printer
                    .print_records(data.iter().map(|row| row.iter().map(|s| PrintValue::Str(s))))
                    .unwrap();
                black_box(printer.close().unwrap().into_inner().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_printer_throughput);
criterion_main!(benches);
