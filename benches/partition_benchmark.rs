use criterion::{black_box, criterion_group, criterion_main, Criterion};
use msbfs::partition::{
    block_aligned_partitioning, degree_partition_with_batch_size, lazy_degree_partitions,
    number_aligned_partitioning, range_partition, total_degree,
};

const NODES: usize = 1_000_000;

/// Skewed degrees: most nodes are small, every 1000th is a hub.
fn degree_of(node: usize) -> usize {
    if node % 1_000 == 0 {
        5_000
    } else {
        node % 17
    }
}

fn bench_range(c: &mut Criterion) {
    c.bench_function("range_partition", |b| {
        b.iter(|| black_box(range_partition(black_box(16), NODES, Some(10_000))));
    });

    c.bench_function("number_aligned_partitioning", |b| {
        b.iter(|| black_box(number_aligned_partitioning(black_box(16), NODES, 64).unwrap()));
    });
}

fn bench_degree(c: &mut Criterion) {
    let relationships = total_degree(NODES, &degree_of);

    c.bench_function("degree_partition_eager", |b| {
        b.iter(|| {
            black_box(
                degree_partition_with_batch_size(NODES, &degree_of, relationships / 64).unwrap(),
            )
        });
    });

    c.bench_function("degree_partition_lazy", |b| {
        b.iter(|| {
            let partitions = lazy_degree_partitions(NODES, relationships, 16, &degree_of);
            black_box(partitions.count())
        });
    });
}

fn bench_block_aligned(c: &mut Criterion) {
    let ids: Vec<u64> = (0..NODES as u64).map(|i| i * 3).collect();

    c.bench_function("block_aligned_partitioning", |b| {
        b.iter(|| black_box(block_aligned_partitioning(&ids, 12).count()));
    });
}

criterion_group!(benches, bench_range, bench_degree, bench_block_aligned);
criterion_main!(benches);
