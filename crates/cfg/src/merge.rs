use rustc_hash::FxHashSet;

use crate::error::CfgError;
use crate::graph::{Cfg, Edge};
use crate::NodeIndex;

/// Return a new graph where the named nodes have been collapsed into a
/// single node called `new_name`.
///
/// External predecessors of any collapsed node gain an edge to the new
/// node, external successors gain an edge from it, and edges internal to
/// the set are dropped. New edges carry no attributes; callers that need
/// branch labels re-stamp them. The entry is preserved, or moves to the
/// new node when the old entry is collapsed. DFS numbers and structural
/// annotations do not carry over to the result.
pub fn merge(src: &Cfg, del: &FxHashSet<String>, new_name: &str) -> Result<Cfg, CfgError> {
    let mut dst = src.clone();
    dst.clear_derived();

    let entry_deleted = match src.entry() {
        Ok(e) => del.contains(src.name(e)),
        Err(_) => false,
    };

    let new_ix = dst.add_node(new_name)?;
    let mut preds: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut succs: FxHashSet<NodeIndex> = FxHashSet::default();
    for name in del {
        let ix = dst
            .node_by_name(name)
            .ok_or_else(|| CfgError::UnknownNode(name.clone()))?;
        for p in dst.preds(ix) {
            if !del.contains(dst.name(p)) {
                preds.insert(p);
            }
        }
        for s in dst.succs(ix) {
            if !del.contains(dst.name(s)) {
                succs.insert(s);
            }
        }
        dst.remove_node(ix);
    }
    for p in preds {
        dst.set_edge(p, new_ix, Edge::new());
    }
    for s in succs {
        dst.set_edge(new_ix, s, Edge::new());
    }
    if entry_deleted {
        dst.set_entry(new_ix)?;
    }
    Ok(dst)
}
