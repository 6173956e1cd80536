use crate::graph::RelationshipIterator;
use crate::msbfs::buffers::ScratchBuffers;
use crate::msbfs::source_nodes::SourceNodes;

pub(super) fn run<R, N>(
    relationships: &R,
    buffers: &mut ScratchBuffers,
    sources: &mut SourceNodes<'_>,
    per_node: &N,
) -> u32
where
    R: RelationshipIterator,
    N: Fn(usize, u32, &mut SourceNodes<'_>),
{
    let ScratchBuffers {
        visit,
        visit_next,
        seen,
        ..
    } = buffers;
    let node_count = visit.len();
    let mut depth = 0u32;

    loop {
        for node in 0..node_count {
            let frontier = visit.get(node);
            if frontier != 0 {
                relationships.for_each_relationship(node, |_, target| {
                    visit_next.or(target, frontier);
                });
            }
        }

        let mut has_next = false;
        for node in 0..node_count {
            let reached = visit_next.get(node);
            if reached == 0 {
                continue;
            }
            let next = reached & !seen.get(node);
            visit_next.set(node, next);
            if next != 0 {
                seen.or(node, next);
                has_next = true;
                sources.reset(next);
                per_node(node, depth + 1, sources);
            }
        }

        if !has_next {
            return depth;
        }

        visit.copy_from(visit_next);
        visit_next.fill(0);
        depth += 1;
    }
}
