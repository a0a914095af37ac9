//! Benchmarks for line and record filters

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tick_ingest::parsing::{DelimitedRecordParser, RecordParser};
use tick_ingest::pipeline::{
    FieldInList, Inverted, LineFilter, RecordFilter, RegexLineFilter, SubstringLineFilter,
};

const LINES: [&str; 4] = [
    "HEADER,type,timestamp,id,price,qty",
    "Q,1672304484973,AAPL,B,150.25,300",
    "T,1672304484972,MSFT,320.10,25",
    "OI,1672304484000,ESZ4,2500130",
];

fn bench_line_filters(c: &mut Criterion) {
    let regex = RegexLineFilter::new(r"^(Q|T),\d+,(AAPL|MSFT),").unwrap();
    let substring = SubstringLineFilter::new(["AAPL", "MSFT", "GOOG", "AMZN"]);
    let exclude_header = Inverted(SubstringLineFilter::new(["HEADER"]));
    let bytes: usize = LINES.iter().map(|l| l.len()).sum();

    let mut group = c.benchmark_group("line_filter");
    group.throughput(Throughput::Bytes(bytes as u64));

    group.bench_function("regex", |b| {
        b.iter(|| LINES.iter().filter(|l| regex.matches(black_box(l))).count())
    });
    group.bench_function("substring_4", |b| {
        b.iter(|| LINES.iter().filter(|l| substring.matches(black_box(l))).count())
    });
    group.bench_function("inverted_header", |b| {
        b.iter(|| LINES.iter().filter(|l| exclude_header.matches(black_box(l))).count())
    });

    group.finish();
}

fn bench_field_in_list(c: &mut Criterion) {
    let mut parser = DelimitedRecordParser::default();
    let records: Vec<_> = LINES[1..]
        .iter()
        .enumerate()
        .filter_map(|(n, l)| parser.parse(n as u64 + 1, l).ok())
        .collect();
    let universe: Vec<String> = (0..500).map(|i| format!("SYM{i}")).chain(["AAPL".into()]).collect();
    let filter = FieldInList::new(2, universe);

    let mut group = c.benchmark_group("record_filter");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("field_in_list_501", |b| {
        b.iter(|| records.iter().filter(|r| filter.accept(black_box(r))).count())
    });
    group.finish();
}

criterion_group!(benches, bench_line_filters, bench_field_in_list);
criterion_main!(benches);
