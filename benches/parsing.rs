use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use positioned_json::{parse, to_string};

fn sample_document(records: usize) -> String {
    let mut out = String::from("[");
    for i in 0..records {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            r#"{{"id":{i},"name":"user-{i}","active":{},"score":{}.5,"tags":["a","b\nc"],"note":null}}"#,
            i % 2 == 0,
            i % 100
        ));
    }
    out.push(']');
    out
}

fn parse_benchmark(c: &mut Criterion) {
    let json = sample_document(1_000);
    let mut group = c.benchmark_group("Parser");

    group.sample_size(10);
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("parse", |b| {
        b.iter(|| parse(black_box(&json)).unwrap())
    });

    let value = parse(&json).unwrap();
    group.bench_function("write", |b| {
        b.iter(|| to_string(black_box(&value)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, parse_benchmark);
criterion_main!(benches);
