//! Loop structuring.
//!
//! ref: Cifuentes, Cristina. "Structuring decompiled graphs." Compiler
//! Construction, Springer 1996, §3.2.
//!
//! For every level of the derived sequence and every interval of that
//! level: find the latch (the deepest back-edge tail into the header),
//! mark the loop body, classify the loop from the out-degrees of header
//! and latch within the interval, and record the follow node the loop
//! exits to.

use petgraph::algo::dominators::{self, Dominators};
use petgraph::visit::NodeFiltered;
use rustc_hash::FxHashSet;

use ravel_cfg::{init_dfs_order, Cfg, LoopType, NodeIndex};

use crate::derived::{derived_sequence, DerivedSeq};
use crate::error::StructureError;
use crate::interval::{intervals, Interval};

/// Annotate the loops of `g` and of every graph in its derived sequence.
///
/// The input graph is level 1; the returned sequence holds the annotated
/// copies of the higher levels (their nodes are collapsed intervals, so
/// their loop marks describe nesting, not basic blocks).
pub fn structure_loops(g: &mut Cfg) -> Result<DerivedSeq, StructureError> {
    init_dfs_order(g);
    annotate_level(g)?;
    let mut seq = derived_sequence(g)?;
    for level in seq.levels.iter_mut().skip(1) {
        annotate_level(level)?;
    }
    Ok(seq)
}

/// Loop facts for one interval, collected before any node is written to.
struct LoopPlan {
    head: NodeIndex,
    latch: NodeIndex,
    body: Vec<NodeIndex>,
    loop_type: LoopType,
    follow: Option<NodeIndex>,
}

fn annotate_level(g: &mut Cfg) -> Result<(), StructureError> {
    init_dfs_order(g);
    let plans = {
        let ivs = intervals(g)?;
        let mut plans = Vec::new();
        for iv in &ivs {
            if let Some(plan) = plan_loop(g, iv)? {
                plans.push(plan);
            }
        }
        plans
    };
    for plan in plans {
        apply_plan(g, plan);
    }
    Ok(())
}

fn plan_loop(g: &Cfg, iv: &Interval<'_>) -> Result<Option<LoopPlan>, StructureError> {
    let head = iv.head();
    let Some(latch) = find_latch(g, iv) else {
        return Ok(None);
    };
    log::debug!("latch of {}: {}", g.name(head), g.name(latch));

    // Loop body: nodes strictly between header and latch in reverse
    // postorder whose immediate dominator (within the interval) is already
    // part of the body.
    let doms = interval_dominators(g, iv);
    let mut body: FxHashSet<NodeIndex> = FxHashSet::default();
    body.insert(head);
    let mut members = Vec::new();
    for n in iv.nodes_by_rev_post() {
        let rp = g.node(n).rev_post;
        if rp <= g.node(head).rev_post {
            continue;
        }
        if rp >= g.node(latch).rev_post {
            break;
        }
        let Some(idom) = doms.immediate_dominator(n) else {
            continue;
        };
        if body.contains(&idom) {
            body.insert(n);
            members.push(n);
        }
    }
    body.insert(latch);

    let latch_deg = iv.succs_within(latch).len();
    let head_deg = iv.succs_within(head).len();
    let loop_type = match (latch_deg, head_deg) {
        (2, 1) => LoopType::PostTest,
        (2, _) => {
            return Err(StructureError::TwoWayHeadLatch {
                head: g.name(head).to_owned(),
                latch: g.name(latch).to_owned(),
            })
        }
        (_, 2) => LoopType::PreTest,
        _ => LoopType::Endless,
    };
    let follow = match loop_type {
        LoopType::PreTest => iv
            .succs_within(head)
            .into_iter()
            .find(|s| !body.contains(s)),
        LoopType::PostTest => iv
            .succs_within(latch)
            .into_iter()
            .find(|s| !body.contains(s)),
        LoopType::Endless => None,
    };
    log::debug!(
        "loop at {}: {:?}, follow {:?}",
        g.name(head),
        loop_type,
        follow.map(|f| g.name(f))
    );
    Ok(Some(LoopPlan {
        head,
        latch,
        body: members,
        loop_type,
        follow,
    }))
}

/// The latching node of I(h): the back-edge tail with the greatest
/// reverse-postorder number. A predecessor is a back-edge tail when the
/// header was visited first in the depth-first walk (self-loops count).
fn find_latch(g: &Cfg, iv: &Interval<'_>) -> Option<NodeIndex> {
    let head = iv.head();
    let mut latch: Option<NodeIndex> = None;
    for p in iv.preds(head) {
        if !iv.contains(p) {
            continue;
        }
        if g.node(head).pre > g.node(p).pre {
            continue;
        }
        latch = match latch {
            Some(l) if g.node(l).rev_post >= g.node(p).rev_post => Some(l),
            _ => Some(p),
        };
    }
    latch
}

fn interval_dominators(g: &Cfg, iv: &Interval<'_>) -> Dominators<NodeIndex> {
    let filtered = NodeFiltered::from_fn(g.graph(), |ix| iv.contains(ix));
    dominators::simple_fast(&filtered, iv.head())
}

fn apply_plan(g: &mut Cfg, plan: LoopPlan) {
    g.node_mut(plan.head).loop_head = Some(plan.head);
    g.node_mut(plan.head).latch = Some(plan.latch);
    for n in plan.body {
        // Outer loops do not override an inner loop's membership.
        if g.node(n).loop_head.is_none() {
            g.node_mut(n).loop_head = Some(plan.head);
        }
    }
    g.node_mut(plan.latch).loop_head = Some(plan.head);
    g.node_mut(plan.latch).is_latch = true;
    g.node_mut(plan.head).loop_type = Some(plan.loop_type);
    g.node_mut(plan.head).loop_follow = plan.follow;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::SAMPLE_DOT;
    use ravel_cfg::parse;

    #[test]
    fn test_sample_post_test_loops() {
        let mut g = parse(SAMPLE_DOT).unwrap();
        structure_loops(&mut g).unwrap();

        let b7 = g.node_by_name("B7").unwrap();
        let b10 = g.node_by_name("B10").unwrap();
        let b11 = g.node_by_name("B11").unwrap();
        assert_eq!(g.node(b7).loop_type, Some(LoopType::PostTest));
        assert_eq!(g.node(b7).latch, Some(b10));
        assert_eq!(g.node(b7).loop_follow, Some(b11));
        assert!(g.node(b10).is_latch);
        assert_eq!(g.node(b10).loop_head, Some(b7));

        let b13 = g.node_by_name("B13").unwrap();
        let b14 = g.node_by_name("B14").unwrap();
        let b15 = g.node_by_name("B15").unwrap();
        assert_eq!(g.node(b13).loop_type, Some(LoopType::PostTest));
        assert_eq!(g.node(b13).latch, Some(b14));
        assert_eq!(g.node(b13).loop_follow, Some(b15));
        assert!(g.node(b14).is_latch);

        // Loop body membership.
        for name in ["B8", "B9"] {
            let ix = g.node_by_name(name).unwrap();
            assert_eq!(g.node(ix).loop_head, Some(b7), "loop head of {}", name);
        }
        // Nodes outside any loop stay unmarked.
        let b6 = g.node_by_name("B6").unwrap();
        assert_eq!(g.node(b6).loop_head, None);
    }

    #[test]
    fn test_sample_outer_loop_on_derived_level() {
        let mut g = parse(SAMPLE_DOT).unwrap();
        let seq = structure_loops(&mut g).unwrap();
        // On G2 the region {B6..B15} shows up as the pre-test loop
        // I2 -> {I3, I4} latched by I3.
        let g2 = &seq.levels[1];
        let i2 = g2.node_by_name("I2").unwrap();
        let i3 = g2.node_by_name("I3").unwrap();
        assert_eq!(g2.node(i2).loop_type, Some(LoopType::PreTest));
        assert_eq!(g2.node(i2).latch, Some(i3));
        assert!(g2.node(i3).is_latch);
        // Both header successors sit inside the loop body, so there is no
        // node the loop exits to.
        assert_eq!(g2.node(i2).loop_follow, None);
    }

    #[test]
    fn test_pre_test_loop() {
        let mut g = parse(
            "digraph g {\n\tE [label=\"entry\"]\n\tE -> H\n\tH -> B [label=\"true\"]\n\tH -> A [label=\"false\"]\n\tB -> H\n}",
        )
        .unwrap();
        structure_loops(&mut g).unwrap();
        let h = g.node_by_name("H").unwrap();
        let a = g.node_by_name("A").unwrap();
        let b = g.node_by_name("B").unwrap();
        assert_eq!(g.node(h).loop_type, Some(LoopType::PreTest));
        assert_eq!(g.node(h).latch, Some(b));
        assert_eq!(g.node(h).loop_follow, Some(a));
        assert!(g.node(b).is_latch);
    }

    #[test]
    fn test_endless_loop() {
        let mut g =
            parse("digraph g {\n\tE [label=\"entry\"]\n\tE -> H\n\tH -> B\n\tB -> H\n}").unwrap();
        structure_loops(&mut g).unwrap();
        let h = g.node_by_name("H").unwrap();
        let b = g.node_by_name("B").unwrap();
        assert_eq!(g.node(h).loop_type, Some(LoopType::Endless));
        assert_eq!(g.node(h).loop_follow, None);
        assert!(g.node(b).is_latch);
    }

    #[test]
    fn test_self_loop_is_its_own_latch() {
        let mut g =
            parse("digraph g {\n\tE [label=\"entry\"]\n\tE -> H\n\tH -> H\n}").unwrap();
        structure_loops(&mut g).unwrap();
        let h = g.node_by_name("H").unwrap();
        assert!(g.node(h).is_latch);
        assert_eq!(g.node(h).latch, Some(h));
        assert_eq!(g.node(h).loop_type, Some(LoopType::Endless));
    }

    #[test]
    fn test_two_way_head_and_latch_unsupported() {
        let mut g = parse(
            "digraph g {\n\tE [label=\"entry\"]\n\tE -> H\n\tH -> A [label=\"true\"]\n\tH -> X [label=\"false\"]\n\tA -> L\n\tL -> H [label=\"true\"]\n\tL -> Y [label=\"false\"]\n}",
        )
        .unwrap();
        let err = structure_loops(&mut g).unwrap_err();
        assert!(matches!(
            err,
            StructureError::TwoWayHeadLatch { ref head, ref latch } if head == "H" && latch == "L"
        ));
    }
}
