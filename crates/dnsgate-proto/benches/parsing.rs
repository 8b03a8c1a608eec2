//! DNS query parsing and response building benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dnsgate_proto::{response, QueryView};
use std::net::Ipv4Addr;

const SIMPLE_QUERY: [u8; 33] = [
    0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77, 0x77,
    0x77, 0x07, 0x65, 0x78, 0x61, 0x6D, 0x70, 0x6C, 0x65, 0x03, 0x63, 0x6F, 0x6D, 0x00, 0x00,
    0x01, 0x00, 0x01,
];

fn parsing_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    group.bench_function("query_view", |b| {
        b.iter(|| QueryView::parse(black_box(&SIMPLE_QUERY)).unwrap());
    });

    group.bench_function("decode_domain", |b| {
        let view = QueryView::parse(&SIMPLE_QUERY).unwrap();
        let mut buf = [0u8; 256];
        b.iter(|| view.decode_domain_into(black_box(&mut buf)).unwrap());
    });

    group.finish();

    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(1));

    group.bench_function("nxdomain", |b| {
        let view = QueryView::parse(&SIMPLE_QUERY).unwrap();
        let mut out = [0u8; 512];
        b.iter(|| response::build_nxdomain(black_box(&view), &mut out).unwrap());
    });

    group.bench_function("a_record", |b| {
        let view = QueryView::parse(&SIMPLE_QUERY).unwrap();
        let mut out = [0u8; 512];
        b.iter(|| {
            response::build_a(black_box(&view), Ipv4Addr::new(10, 0, 0, 1), 300, &mut out)
                .unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, parsing_benchmarks);
criterion_main!(benches);
