use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csvkit::dialect::default_dialect;
use csvkit::lexer::Lexer;
use csvkit::reader::StrSource;
use csvkit::token::{Token, TokenType};
use std::sync::Arc;

fn generate_csv(rows: usize, cols: usize) -> String {
    let mut out = String::new();
    for r in 0..rows {
        for c in 0..cols {
            if c > 0 {
                out.push(',');
            }
            if c == 1 {
                out.push_str(&format!("\"row {r}, col {c}\""));
            } else {
                out.push_str(&format!("value_{r}_{c}"));
            }
        }
        out.push_str("\r\n");
    }
    out
}

fn bench_lexer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_throughput");

    for rows in [1_000, 10_000, 50_000] {
        let data = generate_csv(rows, 8);
        let size = data.len();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("next_token", rows), &data, |b, data| {
            b.iter(|| {
                let mut lexer = Lexer::new(StrSource::new(data), Arc::new(default_dialect()));
                let mut token_count = 0;
                loop {
                    let mut token = Token::new();
                    lexer.next_token(&mut token).unwrap();
                    let done = matches!(token.token_type, TokenType::Eof) && !token.ready;
                    token_count += 1;
                    if done {
                        break;
                    }
                }
                black_box(token_count)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lexer_throughput);
criterion_main!(benches);
