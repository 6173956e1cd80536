use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use msbfs::{CsrGraph, MsBfs, SourceNodes, WorkerPool};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Ring with a few deterministic chords so traversals have some depth and some fan-out.
fn chorded_ring(nodes: usize, chords: usize) -> CsrGraph {
    let mut edges = Vec::with_capacity(nodes * (chords + 1));
    for i in 0..nodes {
        edges.push((i, (i + 1) % nodes));
        for j in 1..=chords {
            edges.push((i, (i * 31 + j * 97) % nodes));
        }
    }
    CsrGraph::from_edges(nodes, &edges, true)
}

fn bench_anp(c: &mut Criterion) {
    let pool = WorkerPool::new(4);
    let mut group = c.benchmark_group("msbfs_anp");
    group.sample_size(10);

    for nodes in [1_024, 8_192] {
        let graph = chorded_ring(nodes, 3);
        group.throughput(Throughput::Elements(graph.relationship_count() as u64));

        for concurrency in [1, 4] {
            group.bench_with_input(
                BenchmarkId::new(format!("c{concurrency}"), nodes),
                &graph,
                |b, graph| {
                    b.iter(|| {
                        let reached = AtomicUsize::new(0);
                        let bfs = MsBfs::aggregated_neighbor_processing(
                            nodes,
                            graph,
                            |_: usize, _: u32, sources: &mut SourceNodes<'_>| {
                                reached.fetch_add(sources.size(), Ordering::Relaxed);
                            },
                            Some((0..256).collect()),
                        )
                        .unwrap();
                        bfs.run(concurrency, Some(&pool)).unwrap();
                        black_box(reached.into_inner())
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_predecessor(c: &mut Criterion) {
    let graph = chorded_ring(4_096, 2);
    let pool = WorkerPool::new(4);

    c.bench_function("msbfs_predecessor_4096", |b| {
        b.iter(|| {
            let edges = AtomicUsize::new(0);
            let bfs = MsBfs::predecessor_processing(
                4_096,
                &graph,
                |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
                |_: usize, _: usize, _: u32, sources: &mut SourceNodes<'_>| {
                    edges.fetch_add(sources.size(), Ordering::Relaxed);
                },
                Some((0..128).collect()),
            )
            .unwrap();
            bfs.run(4, Some(&pool)).unwrap();
            black_box(edges.into_inner())
        });
    });
}

fn bench_single_batch(c: &mut Criterion) {
    let graph = chorded_ring(16_384, 1);

    c.bench_function("msbfs_single_batch_16384", |b| {
        b.iter(|| {
            let bfs = MsBfs::aggregated_neighbor_processing(
                16_384,
                &graph,
                |_: usize, _: u32, _: &mut SourceNodes<'_>| {},
                Some((0..64).map(|i| i * 256).collect()),
            )
            .unwrap();
            black_box(bfs.run_single_batch().unwrap())
        });
    });
}

criterion_group!(benches, bench_anp, bench_predecessor, bench_single_batch);
criterion_main!(benches);
