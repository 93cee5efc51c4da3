//! Benchmarks for vedispatch catalog validation and generation

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vedispatch::catalog::{builtin, Catalog, OpcodeDecl, TypeDecl};
use vedispatch::config::CatalogFile;
use vedispatch::emit::emit_dispatch;
use vedispatch::generator::Generator;
use vedispatch::render::{Emit, RenderOptions, Target};

/// Synthetic catalog with `opcodes` binary opcodes over `types` element types
fn create_catalog(opcodes: usize, types: usize) -> Catalog {
    let base = (types as u32 + 1).next_power_of_two().max(100);
    Catalog::builder()
        .name(format!("synthetic-{}x{}", opcodes, types))
        .base(base)
        .types((0..types).map(|i| TypeDecl::new(format!("T{}", i))))
        .control(["NONE", "SYNC"])
        .group(2, (0..opcodes).map(|i| OpcodeDecl::new(format!("OP{}", i))))
        .build()
        .unwrap()
}

/// Benchmark arm emission for growing catalogs
fn bench_emit_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_dispatch");

    for &(opcodes, types) in &[(8, 4), (32, 14), (128, 32), (512, 64)] {
        let catalog = create_catalog(opcodes, types);
        group.throughput(Throughput::Elements(catalog.pair_count() as u64));

        group.bench_function(format!("{}x{}", opcodes, types), |b| {
            b.iter(|| black_box(emit_dispatch(&catalog)))
        });
    }

    group.finish();
}

/// Benchmark full rendering of the built-in catalog per target
fn bench_render_builtin(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_builtin");
    let catalog = builtin::catalog().unwrap();
    group.throughput(Throughput::Elements(catalog.pair_count() as u64));

    for target in [Target::Cpp, Target::Rust] {
        let generator = Generator::new(&catalog).with_options(RenderOptions::for_target(target));
        group.bench_function(target.to_string(), |b| {
            b.iter(|| {
                let artifact = generator.generate(Emit::All).unwrap();
                black_box(artifact.source())
            })
        });
    }

    group.finish();
}

/// Benchmark catalog loading and validation from TOML
fn bench_load_catalog(c: &mut Criterion) {
    let text = CatalogFile::builtin().to_toml().unwrap();

    c.bench_function("parse_and_validate_builtin", |b| {
        b.iter(|| {
            let file = CatalogFile::parse(black_box(&text)).unwrap();
            black_box(file.into_catalog().unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_emit_dispatch,
    bench_render_builtin,
    bench_load_catalog,
);
criterion_main!(benches);
