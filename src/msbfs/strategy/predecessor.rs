use crate::graph::RelationshipIterator;
use crate::msbfs::buffers::ScratchBuffers;
use crate::msbfs::source_nodes::SourceNodes;

pub(super) fn run<R, N, P>(
    relationships: &R,
    buffers: &mut ScratchBuffers,
    sources: &mut SourceNodes<'_>,
    per_node: &N,
    per_neighbor: &P,
) -> u32
where
    R: RelationshipIterator,
    N: Fn(usize, u32, &mut SourceNodes<'_>),
    P: Fn(usize, usize, u32, &mut SourceNodes<'_>),
{
    let ScratchBuffers {
        visit,
        visit_next,
        seen,
        seen_next,
    } = buffers;
    let Some(seen_next) = seen_next.as_mut() else {
        panic!("predecessor processing requires a seen_next buffer");
    };
    let node_count = visit.len();
    let mut depth = 0u32;

    loop {
        let mut has_next = false;

        for node in 0..node_count {
            let frontier = visit.get(node);
            if frontier == 0 {
                continue;
            }

            sources.reset(frontier);
            per_node(node, depth, sources);

            // seen only grows between depths, so every predecessor of this depth sees the same state
            relationships.for_each_relationship(node, |_, target| {
                let delta = frontier & !seen.get(target);
                if delta != 0 {
                    visit_next.or(target, delta);
                    seen_next.or(target, delta);
                    has_next = true;
                    sources.reset(delta);
                    per_neighbor(target, node, depth + 1, sources);
                }
            });
        }

        if !has_next {
            return depth;
        }

        seen.or_assign(seen_next);
        visit.copy_from(visit_next);
        visit_next.fill(0);
        depth += 1;
    }
}
