//! Benchmarks for tsv-loader
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_pairs_decode(c: &mut Criterion) {
    use tsv_loader::codec::RowDecoder;
    use tsv_loader::schema::Schema;

    let schema = Schema::parse("id:INTEGER,name:TEXT,score:FLOAT").unwrap();
    let decoder = RowDecoder::pairs(schema, '\t');
    let line = "id\t42\tname\tAlice\tscore\t98.6";

    c.bench_function("decode_pairs", |b| {
        b.iter(|| {
            let row = decoder.decode(black_box(line)).unwrap();
            black_box(row);
        })
    });
}

fn benchmark_header_decode(c: &mut Criterion) {
    use tsv_loader::codec::{HeaderIndex, RowDecoder};
    use tsv_loader::schema::Schema;

    let schema = Schema::parse("id:INTEGER,name:TEXT,score:FLOAT").unwrap();
    let index = HeaderIndex::build("score\tid\tname", &schema, '\t').unwrap();
    let decoder = RowDecoder::positional(schema, '\t', index);
    let line = "98.6\t42\tAlice";

    c.bench_function("decode_header", |b| {
        b.iter(|| {
            let row = decoder.decode(black_box(line)).unwrap();
            black_box(row);
        })
    });
}

fn benchmark_batch_write(c: &mut Criterion) {
    use std::path::Path;
    use tsv_loader::codec::RowDecoder;
    use tsv_loader::db::TableWriter;
    use tsv_loader::schema::Schema;

    let schema = Schema::parse("id:INTEGER,name:TEXT,score:FLOAT").unwrap();
    let decoder = RowDecoder::pairs(schema.clone(), '\t');
    let rows: Vec<_> = (0..100)
        .map(|i| {
            let line = format!("id\t{}\tname\tuser{}\tscore\t{}.5", i, i, i);
            decoder.decode(&line).unwrap()
        })
        .collect();

    let mut writer = TableWriter::open(Path::new(":memory:"), "people").unwrap();
    writer.create_table(&schema).unwrap();

    c.bench_function("write_batch_100", |b| {
        b.iter(|| {
            let written = writer.write_batch(black_box(&rows)).unwrap();
            black_box(written);
        })
    });
}

criterion_group!(
    benches,
    benchmark_pairs_decode,
    benchmark_header_decode,
    benchmark_batch_write
);
criterion_main!(benches);
