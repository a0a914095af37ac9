//! Benchmarks for line parsing
//!
//! Target: <500ns per line parse

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tick_ingest::core::FieldSplitter;
use tick_ingest::parsing::{DelimitedRecordParser, RecordParser};

// Test data - one line per record category
const QUOTE: &str = "Q,1672304484973,AAPL,B,150.25,300";
const TRADE: &str = "T,1672304484972,AAPL,150.26,25";
const OPEN_INTEREST: &str = "OI,1672304484000,ESZ4,2500130";
const OTHER: &str = "O,1672304484001,AAPL,halt,reason=news";
const MALFORMED: &str = "T,1672304484972,AAPL,not-a-price,25";

fn bench_parse_by_kind(c: &mut Criterion) {
    let mut parser = DelimitedRecordParser::default();
    let mut group = c.benchmark_group("delimited_parse");

    for (name, line) in [
        ("quote", QUOTE),
        ("trade", TRADE),
        ("open_interest", OPEN_INTEREST),
        ("other", OTHER),
        ("malformed", MALFORMED),
    ] {
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let result = parser.parse(1, black_box(line));
                black_box(result).ok();
            })
        });
    }

    group.finish();
}

fn bench_field_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_split");
    group.throughput(Throughput::Bytes(QUOTE.len() as u64));

    group.bench_function("count_fields", |b| {
        b.iter(|| black_box(FieldSplitter::COMMA.split(black_box(QUOTE)).count()))
    });

    group.bench_function("owned_fields", |b| {
        b.iter(|| black_box(FieldSplitter::COMMA.fields(black_box(QUOTE))))
    });

    group.finish();
}

fn bench_batch_parse(c: &mut Criterion) {
    let lines: Vec<String> = (0..1000)
        .map(|i| match i % 3 {
            0 => format!("Q,{i},AAPL,A,150.{i},{i}"),
            1 => format!("T,{i},MSFT,320.5,{i}"),
            _ => format!("OI,{i},ESZ4,{i}"),
        })
        .collect();
    let bytes: usize = lines.iter().map(String::len).sum();

    let mut parser = DelimitedRecordParser::default();
    let mut group = c.benchmark_group("batch_parse");
    group.throughput(Throughput::Bytes(bytes as u64));

    group.bench_function("mixed_1000", |b| {
        b.iter(|| {
            for (n, line) in lines.iter().enumerate() {
                black_box(parser.parse(n as u64 + 1, line)).ok();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse_by_kind, bench_field_split, bench_batch_parse);
criterion_main!(benches);
