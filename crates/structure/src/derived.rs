//! The derived sequence of graphs G¹..Gⁿ.
//!
//! G¹ is the input; each following level collapses every interval of the
//! previous level into a single node. A reducible graph ends in a single
//! node; an irreducible one stops reducing and the sequence is left at its
//! fixed point.

use rustc_hash::FxHashSet;

use ravel_cfg::{init_dfs_order, merge, Cfg};

use crate::error::StructureError;
use crate::interval::intervals;

/// The derived sequence. Level 0 holds a copy of the source graph renamed
/// `G1`; collapsed nodes are named `I<k>` with `k` counting across the
/// whole sequence.
#[derive(Debug)]
pub struct DerivedSeq {
    pub levels: Vec<Cfg>,
}

impl DerivedSeq {
    /// The limit flow graph Gⁿ.
    pub fn limit(&self) -> &Cfg {
        self.levels.last().expect("sequence has at least one level")
    }
}

/// Compute the derived sequence of the given graph.
pub fn derived_sequence(src: &Cfg) -> Result<DerivedSeq, StructureError> {
    let mut first = src.clone();
    first.set_id("G1");
    init_dfs_order(&mut first);
    let mut levels = vec![first];
    let mut interval_counter = 1usize;
    let mut level = 2usize;
    loop {
        let cur = levels.last().expect("at least one level");
        if cur.node_count() <= 1 {
            break;
        }
        let ivs = intervals(cur)?;
        if ivs.len() == cur.node_count() {
            // Every interval is a singleton: no reduction, the graph is
            // irreducible.
            log::debug!("{} is irreducible with {} nodes", cur.id(), cur.node_count());
            break;
        }
        let member_sets: Vec<FxHashSet<String>> =
            ivs.iter().map(|iv| iv.member_names()).collect();
        let mut next = cur.clone();
        for set in &member_sets {
            let name = format!("I{}", interval_counter);
            interval_counter += 1;
            next = merge(&next, set, &name)?;
        }
        next.set_id(format!("G{}", level));
        init_dfs_order(&mut next);
        levels.push(next);
        level += 1;
    }
    Ok(DerivedSeq { levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::SAMPLE_DOT;
    use ravel_cfg::parse;

    #[test]
    fn test_sample_reduces_in_four_levels() {
        let g = parse(SAMPLE_DOT).unwrap();
        let seq = derived_sequence(&g).unwrap();
        let ids: Vec<&str> = seq.levels.iter().map(|g| g.id()).collect();
        assert_eq!(ids, ["G1", "G2", "G3", "G4"]);
        let sizes: Vec<usize> = seq.levels.iter().map(|g| g.node_count()).collect();
        assert_eq!(sizes, [15, 4, 2, 1]);
    }

    #[test]
    fn test_collapsed_node_names() {
        let g = parse(SAMPLE_DOT).unwrap();
        let seq = derived_sequence(&g).unwrap();
        let g2 = &seq.levels[1];
        let names: Vec<&str> = g2.nodes_by_name().into_iter().map(|ix| g2.name(ix)).collect();
        assert_eq!(names, ["I1", "I2", "I3", "I4"]);
        assert_eq!(g2.name(g2.entry().unwrap()), "I1");
        let limit = seq.limit();
        assert_eq!(limit.name(limit.entry().unwrap()), "I7");
    }

    #[test]
    fn test_second_level_shape() {
        let g = parse(SAMPLE_DOT).unwrap();
        let seq = derived_sequence(&g).unwrap();
        let g2 = &seq.levels[1];
        let succs_of = |name: &str| -> Vec<String> {
            let ix = g2.node_by_name(name).unwrap();
            g2.succs(ix).into_iter().map(|s| g2.name(s).to_owned()).collect()
        };
        assert_eq!(succs_of("I1"), ["I2"]);
        assert_eq!(succs_of("I2"), ["I3", "I4"]);
        assert_eq!(succs_of("I3"), ["I2"]);
        assert!(succs_of("I4").is_empty());
    }

    #[test]
    fn test_irreducible_graph_stops() {
        // The classic irreducible triangle: two mutually-reaching nodes
        // entered from both sides.
        let g = parse(
            "digraph g {\n\tE [label=\"entry\"]\n\tE -> A [label=\"true\"]\n\tE -> B [label=\"false\"]\n\tA -> B\n\tB -> A\n}",
        )
        .unwrap();
        let seq = derived_sequence(&g).unwrap();
        assert_eq!(seq.levels.len(), 1);
        assert_eq!(seq.limit().node_count(), 3);
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let g = parse(SAMPLE_DOT).unwrap();
        let seq = derived_sequence(&g).unwrap();
        for pair in seq.levels.windows(2) {
            assert!(pair[1].node_count() <= pair[0].node_count());
        }
    }
}
