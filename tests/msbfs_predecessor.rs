use msbfs::{CsrGraph, MsBfs, MsBfsError, SourceNodes, WorkerPool};
use std::sync::Mutex;

type NodeReport = (usize, u32, Vec<usize>);
type EdgeReport = (usize, usize, u32, Vec<usize>);

/// a - c, a - d, b - c, b - d, c - e, d - f (undirected)
fn sample_graph() -> CsrGraph {
    CsrGraph::from_edges(6, &[(0, 2), (0, 3), (1, 2), (1, 3), (2, 4), (3, 5)], true)
}

fn collect(sources: &mut SourceNodes<'_>) -> Vec<usize> {
    let mut ids: Vec<usize> = sources.collect();
    ids.sort_unstable();
    ids
}

fn run_predecessor(
    graph: &CsrGraph,
    sources: Option<Vec<usize>>,
    concurrency: usize,
) -> (Vec<NodeReport>, Vec<EdgeReport>) {
    let nodes = Mutex::new(Vec::new());
    let edges = Mutex::new(Vec::new());
    let bfs = MsBfs::predecessor_processing(
        graph.node_count(),
        graph,
        |node: usize, depth: u32, sources: &mut SourceNodes<'_>| {
            nodes.lock().unwrap().push((node, depth, collect(sources)));
        },
        |target: usize, predecessor: usize, depth: u32, sources: &mut SourceNodes<'_>| {
            edges
                .lock()
                .unwrap()
                .push((target, predecessor, depth, collect(sources)));
        },
        sources,
    )
    .unwrap();

    let pool = WorkerPool::new(4);
    bfs.run(concurrency, Some(&pool)).unwrap();

    let mut nodes = nodes.into_inner().unwrap();
    let mut edges = edges.into_inner().unwrap();
    nodes.sort();
    edges.sort();
    (nodes, edges)
}

#[test]
fn predecessor_with_two_sources() {
    let graph = sample_graph();
    let (nodes, edges) = run_predecessor(&graph, Some(vec![0, 1]), 4);

    assert_eq!(
        nodes,
        vec![
            (0, 0, vec![0]),
            (0, 2, vec![1]),
            (1, 0, vec![1]),
            (1, 2, vec![0]),
            (2, 1, vec![0, 1]),
            (3, 1, vec![0, 1]),
            (4, 2, vec![0, 1]),
            (5, 2, vec![0, 1]),
        ]
    );
    assert_eq!(
        edges,
        vec![
            (0, 2, 2, vec![1]),
            (0, 3, 2, vec![1]),
            (1, 2, 2, vec![0]),
            (1, 3, 2, vec![0]),
            (2, 0, 1, vec![0]),
            (2, 1, 1, vec![1]),
            (3, 0, 1, vec![0]),
            (3, 1, 1, vec![1]),
            (4, 2, 2, vec![0, 1]),
            (5, 3, 2, vec![0, 1]),
        ]
    );
}

#[test]
fn predecessor_with_all_sources() {
    let graph = sample_graph();
    let (_, edges) = run_predecessor(&graph, None, 4);

    let mut expected = vec![
        (0, 2, 1, vec![2]),
        (0, 3, 1, vec![3]),
        (1, 2, 1, vec![2]),
        (1, 3, 1, vec![3]),
        (2, 0, 1, vec![0]),
        (2, 1, 1, vec![1]),
        (2, 4, 1, vec![4]),
        (3, 0, 1, vec![0]),
        (3, 1, 1, vec![1]),
        (3, 5, 1, vec![5]),
        (4, 2, 1, vec![2]),
        (5, 3, 1, vec![3]),
        (0, 2, 2, vec![1, 4]),
        (0, 3, 2, vec![1, 5]),
        (1, 2, 2, vec![0, 4]),
        (1, 3, 2, vec![0, 5]),
        (2, 0, 2, vec![3]),
        (2, 1, 2, vec![3]),
        (3, 0, 2, vec![2]),
        (3, 1, 2, vec![2]),
        (4, 2, 2, vec![0, 1]),
        (5, 3, 2, vec![0, 1]),
        (2, 0, 3, vec![5]),
        (2, 1, 3, vec![5]),
        (3, 0, 3, vec![4]),
        (3, 1, 3, vec![4]),
        (4, 2, 3, vec![3]),
        (5, 3, 3, vec![2]),
        (4, 2, 4, vec![5]),
        (5, 3, 4, vec![4]),
    ];
    expected.sort();
    assert_eq!(edges, expected);
}

#[test]
fn sequential_and_parallel_runs_agree() {
    let edges: Vec<_> = (0..300).map(|i| (i, (i * 7 + 3) % 300)).collect();
    let graph = CsrGraph::from_edges(300, &edges, false);
    assert_eq!(
        run_predecessor(&graph, None, 1),
        run_predecessor(&graph, None, 4)
    );
}

#[test]
fn single_batch_reports_sources_at_depth_zero() {
    let graph = CsrGraph::from_edges(3, &[(0, 1), (1, 2)], false);
    let nodes = Mutex::new(Vec::new());
    let bfs = MsBfs::predecessor_processing(
        3,
        &graph,
        |node: usize, depth: u32, _: &mut SourceNodes<'_>| nodes.lock().unwrap().push((node, depth)),
        |_: usize, _: usize, _: u32, _: &mut SourceNodes<'_>| {},
        Some(vec![0]),
    )
    .unwrap();

    assert_eq!(bfs.run_single_batch().unwrap(), 2);
    assert_eq!(nodes.into_inner().unwrap(), vec![(0, 0), (1, 1), (2, 2)]);
}

#[test]
fn unsorted_sources_are_sorted_by_the_coordinator() {
    let graph = sample_graph();
    let (sorted_nodes, sorted_edges) = run_predecessor(&graph, Some(vec![0, 1]), 1);
    let (nodes, edges) = run_predecessor(&graph, Some(vec![1, 0]), 1);
    assert_eq!(nodes, sorted_nodes);
    assert_eq!(edges, sorted_edges);
}

#[test]
#[cfg(target_pointer_width = "64")]
fn capacity_exceeded_before_any_work() {
    let graph = CsrGraph::from_edges(1, &[], false);
    let bfs = MsBfs::predecessor_processing(
        usize::MAX,
        &graph,
        |_: usize, _: u32, _: &mut SourceNodes<'_>| panic!("must not traverse"),
        |_: usize, _: usize, _: u32, _: &mut SourceNodes<'_>| panic!("must not traverse"),
        None,
    )
    .unwrap();
    assert!(matches!(
        bfs.run(4, None),
        Err(MsBfsError::CapacityExceeded { sources: usize::MAX, .. })
    ));
}
