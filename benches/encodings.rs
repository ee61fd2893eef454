//! Benchmarks for type encoding parsing and layout computation.
//!
//! Covers the hot paths of a runtime that decodes method and ivar encodings:
//! - Primitive and nested aggregate parsing
//! - Method signature walking
//! - Struct layout on different data models
//! - Parallel batch layout

extern crate objscope;

use criterion::{criterion_group, criterion_main, Criterion};
use objscope::{
    encoding::{encode, parse, parse_method},
    layout::{layout, layout_many, next_size_and_alignment, AbiModel},
};
use std::hint::black_box;

const CGRECT: &str = "{CGRect={CGPoint=dd}{CGSize=dd}}";
const NESTED: &str = "{Outer=^{Inner=[16c](Value=iqd)b3b5}@\"NSString\"@?[4{P=^vQ}]}";

fn bench_parse_primitive(c: &mut Criterion) {
    c.bench_function("encoding_parse_primitive", |b| {
        b.iter(|| black_box(parse(black_box("Q")).unwrap()));
    });
}

fn bench_parse_cgrect(c: &mut Criterion) {
    c.bench_function("encoding_parse_cgrect", |b| {
        b.iter(|| black_box(parse(black_box(CGRECT)).unwrap()));
    });
}

fn bench_parse_nested(c: &mut Criterion) {
    c.bench_function("encoding_parse_nested", |b| {
        b.iter(|| black_box(parse(black_box(NESTED)).unwrap()));
    });
}

fn bench_encode_nested(c: &mut Criterion) {
    let node = parse(NESTED).unwrap();

    c.bench_function("encoding_encode_nested", |b| {
        b.iter(|| black_box(encode(black_box(&node))));
    });
}

fn bench_parse_method(c: &mut Criterion) {
    let signature = "v48@0:8{CGRect={CGPoint=dd}{CGSize=dd}}16";

    c.bench_function("encoding_parse_method", |b| {
        b.iter(|| black_box(parse_method(black_box(signature)).unwrap()));
    });
}

/// Walk a method encoding the way `NSGetSizeAndAlignment` callers do
fn bench_walk_method(c: &mut Criterion) {
    let model = AbiModel::lp64();
    let signature = "@40@0:8q16^{_NSZone=}24@?32";

    c.bench_function("layout_walk_method", |b| {
        b.iter(|| {
            let mut rest = black_box(signature);
            let mut total = 0;
            while !rest.is_empty() {
                let (layout, next) = next_size_and_alignment(rest, &model).unwrap();
                total += layout.size;
                rest = next;
            }
            black_box(total)
        });
    });
}

fn bench_layout_models(c: &mut Criterion) {
    let node = parse(NESTED).unwrap();
    let mut group = c.benchmark_group("layout_nested");

    for (name, model) in [
        ("lp64", AbiModel::lp64()),
        ("ilp32", AbiModel::ilp32()),
        ("i386", AbiModel::i386()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(layout(black_box(&node), &model)));
        });
    }

    group.finish();
}

fn bench_layout_many(c: &mut Criterion) {
    let model = AbiModel::lp64();
    let encodings: Vec<&str> = [CGRECT, NESTED, "q", "{_NSRange=QQ}"]
        .iter()
        .copied()
        .cycle()
        .take(1024)
        .collect();

    c.bench_function("layout_many_1024", |b| {
        b.iter(|| black_box(layout_many(black_box(&encodings), &model)));
    });
}

criterion_group!(
    benches,
    bench_parse_primitive,
    bench_parse_cgrect,
    bench_parse_nested,
    bench_encode_nested,
    bench_parse_method,
    bench_walk_method,
    bench_layout_models,
    bench_layout_many,
);
criterion_main!(benches);
