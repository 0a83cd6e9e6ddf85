//! 2-way conditional structuring.
//!
//! ref: Cifuentes, Cristina. "Structuring decompiled graphs." Compiler
//! Construction, Springer 1996, §3.4.
//!
//! Walks the nodes in descending reverse-postorder (innermost conditionals
//! first) and assigns each 2-way node the node both its arms reconverge at:
//! the deepest node whose immediate dominator is the conditional and which
//! joins at least two incoming edges. Conditionals with no such node are
//! kept unresolved and inherit the follow of the enclosing conditional
//! that resolves next.

use petgraph::algo::dominators::{self, Dominators};
use rustc_hash::FxHashSet;

use ravel_cfg::{sort_by_post, sort_by_rev_post, Cfg, NodeIndex};

use crate::error::StructureError;

/// Assign follow nodes to the 2-way conditionals of `g`.
///
/// Requires current DFS numbering. Loop headers and latches are left to
/// the loop structuring pass. Nodes still unresolved afterwards have no
/// follow; the code generator treats them as unstructured.
pub fn structure_two_way(g: &mut Cfg) -> Result<(), StructureError> {
    let entry = g.entry().map_err(StructureError::from)?;
    let doms = dominators::simple_fast(g.graph(), entry);
    let mut unresolved: FxHashSet<NodeIndex> = FxHashSet::default();

    // Descending reverse-postorder is ascending postorder.
    for m in sort_by_post(g) {
        if g.out_degree(m) != 2 {
            continue;
        }
        if g.node(m).loop_head == Some(m) {
            continue;
        }
        if g.node(m).is_latch {
            continue;
        }
        match find_follow(g, m, &doms) {
            Some(n) => {
                log::debug!("follow of {}: {}", g.name(m), g.name(n));
                g.node_mut(m).if_follow = Some(n);
                for x in unresolved.drain() {
                    g.node_mut(x).if_follow = Some(n);
                }
            }
            None => {
                // Possibly a conditional nested in another conditional
                // structure; it resolves with the enclosing one.
                unresolved.insert(m);
            }
        }
    }
    Ok(())
}

/// The deepest node dominated directly by `m` that merges two or more
/// incoming edges.
fn find_follow(g: &Cfg, m: NodeIndex, doms: &Dominators<NodeIndex>) -> Option<NodeIndex> {
    let mut follow: Option<NodeIndex> = None;
    for i in sort_by_rev_post(g) {
        if doms.immediate_dominator(i) != Some(m) || g.in_degree(i) < 2 {
            continue;
        }
        follow = match follow {
            Some(n) if g.node(n).rev_post >= g.node(i).rev_post => Some(n),
            _ => Some(i),
        };
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure_loops;
    use crate::testdata::SAMPLE_DOT;
    use ravel_cfg::{init_dfs_order, parse};

    #[test]
    fn test_sample_follows() {
        let mut g = parse(SAMPLE_DOT).unwrap();
        structure_loops(&mut g).unwrap();
        structure_two_way(&mut g).unwrap();

        let ix = |name: &str| g.node_by_name(name).unwrap();
        // B1 and the nested B2 both reconverge at B5.
        assert_eq!(g.node(ix("B1")).if_follow, Some(ix("B5")));
        assert_eq!(g.node(ix("B2")).if_follow, Some(ix("B5")));
        // B6 is dominator of the join B7 (entered from B6 and B10).
        assert_eq!(g.node(ix("B6")).if_follow, Some(ix("B7")));
        // Latches keep no follow.
        assert_eq!(g.node(ix("B10")).if_follow, None);
        assert_eq!(g.node(ix("B14")).if_follow, None);
    }

    #[test]
    fn test_nested_unresolved_inherits_outer_follow() {
        // B has no private join node; its arms fall through to E, the
        // follow of the enclosing conditional A.
        let mut g = parse(
            "digraph g {\n\tA [label=\"entry\"]\n\tA -> B [label=\"true\"]\n\tA -> E [label=\"false\"]\n\tB -> C [label=\"true\"]\n\tB -> D [label=\"false\"]\n\tC -> E\n\tD -> E\n}",
        )
        .unwrap();
        init_dfs_order(&mut g);
        structure_two_way(&mut g).unwrap();
        let ix = |name: &str| g.node_by_name(name).unwrap();
        assert_eq!(g.node(ix("A")).if_follow, Some(ix("E")));
        assert_eq!(g.node(ix("B")).if_follow, Some(ix("E")));
    }

    #[test]
    fn test_branch_without_join_stays_unresolved() {
        let mut g = parse(
            "digraph g {\n\tA [label=\"entry\"]\n\tA -> B [label=\"true\"]\n\tA -> C [label=\"false\"]\n}",
        )
        .unwrap();
        init_dfs_order(&mut g);
        structure_two_way(&mut g).unwrap();
        let a = g.node_by_name("A").unwrap();
        assert_eq!(g.node(a).if_follow, None);
    }

    #[test]
    fn test_follow_is_dominated_join() {
        let mut g = parse(
            "digraph g {\n\tA [label=\"entry\"]\n\tA -> B [label=\"true\"]\n\tA -> C [label=\"false\"]\n\tB -> D\n\tC -> D\n\tD -> E\n}",
        )
        .unwrap();
        init_dfs_order(&mut g);
        structure_two_way(&mut g).unwrap();
        let a = g.node_by_name("A").unwrap();
        let d = g.node_by_name("D").unwrap();
        assert_eq!(g.node(a).if_follow, Some(d));
        assert!(g.in_degree(d) >= 2);
    }
}
