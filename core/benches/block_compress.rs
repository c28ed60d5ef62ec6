use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use blocz_core::block::{compress, decompress};
use blocz_core::compression::registry;
use blocz_core::config::{BlockSize, CompressionContext};
use blocz_core::filters::{apply_with, ByteOrder, FilterKind, Kernel};

fn dataset() -> Vec<u8> {
    // 8 MiB of slowly varying f64 values
    let values: Vec<f64> = (0..1 << 20).map(|i| (i as f64 * 0.001).sin() * 1000.0).collect();
    bytemuck::cast_slice(&values).to_vec()
}

fn bench_codecs(c: &mut Criterion) {
    let data = dataset();
    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    for codec in registry::enabled_codecs() {
        for threads in [1usize, 4] {
            let ctx = CompressionContext::builder()
                .codec(codec)
                .typesize(8)
                .block_size(BlockSize::Auto)
                .threads(threads)
                .build()
                .unwrap();
            group.bench_with_input(BenchmarkId::new(codec.name(), threads), &ctx, |b, ctx| {
                b.iter(|| compress(black_box(&data), ctx).unwrap())
            });
        }
    }
    group.finish();

    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    for codec in registry::enabled_codecs() {
        let ctx = CompressionContext::builder().codec(codec).typesize(8).build().unwrap();
        let frame = compress(&data, &ctx).unwrap();
        for threads in [1usize, 4] {
            group.bench_with_input(BenchmarkId::new(codec.name(), threads), &frame, |b, frame| {
                b.iter(|| decompress(black_box(frame), threads).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let data = dataset();
    let mut group = c.benchmark_group("filters");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for kind in [FilterKind::Shuffle, FilterKind::BitShuffle] {
        for kernel in [Kernel::Scalar, Kernel::Wide] {
            let id = BenchmarkId::new(kind.name(), format!("{kernel:?}"));
            group.bench_function(id, |b| {
                b.iter(|| apply_with(kernel, kind, black_box(&data), 8, ByteOrder::Little).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_codecs, bench_filters);
criterion_main!(benches);
