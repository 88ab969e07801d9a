use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvkit::dialect::{default_dialect, mysql};
use csvkit::printer::{IoCharSink, PrintValue, Printer};
use csvkit::{parse_str, Dialect};

fn generate_csv(rows: usize) -> String {
    let mut out = String::new();
    for r in 0..rows {
        out.push_str(&format!(
            "{r},\"note, {r}\",{}\r\n",
            if r % 7 == 0 { "" } else { "value" }
        ));
    }
    out
}

fn bench_parse_then_print(c: &mut Criterion, name: &str, dialect_in: Dialect, dialect_out: Dialect) {
    let mut group = c.benchmark_group(name);

    for rows in [1_000, 10_000, 50_000] {
        let data = generate_csv(rows);
        let size = data.len();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("roundtrip", rows), &data, |b, data| {
            b.iter(|| {
                let parser = parse_str(data, dialect_in.clone()).unwrap();
                let mut sink = Vec::new();
                {
                    let mut printer =
                        Printer::new(IoCharSink::new(&mut sink), dialect_out.clone()).unwrap();
                    for record in parser {
                        let record = record.unwrap();
                        printer
                            .print_record(record.iter().map(PrintValue::Str))
                            .unwrap();
                    }
                    printer.flush().unwrap();
                }
                black_box(sink.len())
            })
        });
    }

    group.finish();
}

fn bench_default_roundtrip(c: &mut Criterion) {
    bench_parse_then_print(c, "roundtrip_default", default_dialect(), default_dialect());
}

fn bench_mysql_roundtrip(c: &mut Criterion) {
    bench_parse_then_print(c, "roundtrip_mysql", mysql(), mysql());
}

criterion_group!(benches, bench_default_roundtrip, bench_mysql_roundtrip);
criterion_main!(benches);
