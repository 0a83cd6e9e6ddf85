//! Depth-first numbering and the deterministic orderings derived from it.
//!
//! Structuring decisions downstream depend on reverse postorder, which in
//! turn depends on the order successors are visited. Every order-sensitive
//! neighbour enumeration uses the same rule: natural order on the node name,
//! with maximal digit runs compared numerically (`B2` before `B10`).

use std::cmp::Ordering;

use petgraph::stable_graph::NodeIndex;
use rustc_hash::FxHashSet;

use crate::graph::Cfg;

/// Compare two names in natural order: digit runs numerically, everything
/// else byte-wise.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ab = a.as_bytes();
    let bb = b.as_bytes();
    let mut i = 0;
    let mut j = 0;
    while i < ab.len() && j < bb.len() {
        if ab[i].is_ascii_digit() && bb[j].is_ascii_digit() {
            let si = i;
            while i < ab.len() && ab[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < bb.len() && bb[j].is_ascii_digit() {
                j += 1;
            }
            let da = a[si..i].trim_start_matches('0');
            let db = b[sj..j].trim_start_matches('0');
            let ord = da
                .len()
                .cmp(&db.len())
                .then_with(|| da.cmp(db))
                .then_with(|| (i - si).cmp(&(j - sj)));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = ab[i].cmp(&bb[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }
    (ab.len() - i).cmp(&(bb.len() - j))
}

/// Initialize the pre- and post depth-first visit order of every node.
///
/// One walk from the entry, successors in natural name order; any node not
/// reached by the main walk (malformed graphs) is walked afterwards in name
/// order. `rev_post` is derived as `node_count - post`.
pub fn init_dfs_order(g: &mut Cfg) {
    let mut visited = FxHashSet::default();
    let mut pre = 0usize;
    let mut post = 0usize;
    if let Ok(entry) = g.entry() {
        walk(g, entry, &mut visited, &mut pre, &mut post);
    }
    for ix in g.nodes_by_name() {
        if !visited.contains(&ix) {
            walk(g, ix, &mut visited, &mut pre, &mut post);
        }
    }
    let n = g.node_count();
    for ix in g.nodes_by_name() {
        g.node_mut(ix).rev_post = n - g.node(ix).post;
    }
}

fn walk(
    g: &mut Cfg,
    ix: NodeIndex,
    visited: &mut FxHashSet<NodeIndex>,
    pre: &mut usize,
    post: &mut usize,
) {
    visited.insert(ix);
    g.node_mut(ix).pre = *pre;
    *pre += 1;
    for succ in g.succs(ix) {
        if !visited.contains(&succ) {
            walk(g, succ, visited, pre, post);
        }
    }
    g.node_mut(ix).post = *post;
    *post += 1;
}

/// All nodes in ascending reverse-postorder (entry first).
pub fn sort_by_rev_post(g: &Cfg) -> Vec<NodeIndex> {
    let mut ixs: Vec<NodeIndex> = g.graph().node_indices().collect();
    ixs.sort_by_key(|&ix| g.node(ix).rev_post);
    ixs
}

/// All nodes in ascending postorder (deepest finishers first).
pub fn sort_by_post(g: &Cfg) -> Vec<NodeIndex> {
    let mut ixs: Vec<NodeIndex> = g.graph().node_indices().collect();
    ixs.sort_by_key(|&ix| g.node(ix).post);
    ixs
}
