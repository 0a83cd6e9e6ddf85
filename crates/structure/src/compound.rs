//! Compound (short-circuit) condition folding.
//!
//! ref: Cifuentes, Cristina. "Structuring decompiled graphs." Compiler
//! Construction, Springer 1996, §3.3.
//!
//! A short-circuit evaluation of `x && y` / `x || y` leaves two adjacent
//! 2-way nodes that share one leaf. Four layouts occur, depending on which
//! arm of `x` reaches `y` and which leaf the pair shares:
//!
//! ```text
//!   x AND y       x OR y        !x AND y      !x OR y
//!   x             x             x             x
//!   ↓ ↘         ↙ ↓             ↘ ↓           ↓ ↘
//!   ↓   y       y  ↓             y ↓           ↓  y
//!   ↓ ↙  ↘    ↙ ↘ ↓            ↙ ↘↓           ↓↙  ↘
//!   e      t  e    t           e   t           e    t
//! ```
//!
//! Each match fuses `{x, y}` into a single 2-way node whose true edge goes
//! to `t` and whose false edge goes to `e`. Folding repeats until no idiom
//! is left, so chains of conditions collapse pairwise.

use rustc_hash::FxHashSet;

use ravel_cfg::{init_dfs_order, merge, sort_by_rev_post, unquote, Cfg};

use crate::error::StructureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompoundKind {
    And,
    Or,
    Nand,
    Nor,
}

impl CompoundKind {
    fn suffix(self) -> &'static str {
        match self {
            CompoundKind::And => "AND",
            CompoundKind::Or => "OR",
            CompoundKind::Nand => "NAND",
            CompoundKind::Nor => "NOR",
        }
    }
}

/// One detected idiom, captured by name so it survives the merge.
struct CompoundSite {
    kind: CompoundKind,
    x: String,
    y: String,
    t: String,
    e: String,
    /// Labels of external predecessor edges into `x`, re-stamped onto the
    /// fused node afterwards so enclosing branches keep a legal
    /// true/false pair.
    pred_labels: Vec<(String, String)>,
}

/// Fold the compound conditions of `g` to a fixed point.
///
/// Every fold produces a fresh graph (node identity changes), so the scan
/// restarts from the top after each one. The result carries no DFS
/// numbers or structural annotations.
pub fn fold_compound_conds(mut g: Cfg) -> Result<Cfg, StructureError> {
    loop {
        init_dfs_order(&mut g);
        let Some(site) = find_site(&g)? else {
            return Ok(g);
        };
        log::debug!(
            "{} located at {}: {} {} -> t {}, e {}",
            site.kind.suffix(),
            site.x,
            site.x,
            site.y,
            site.t,
            site.e
        );
        g = fold_site(&g, &site)?;
    }
}

/// Scan in reverse-postorder so the header of a compound condition is
/// analyzed before its second conditional.
fn find_site(g: &Cfg) -> Result<Option<CompoundSite>, StructureError> {
    for x in sort_by_rev_post(g) {
        if g.out_degree(x) != 2 {
            continue;
        }
        let (xt, xf) = g.branch_targets(x)?;
        for (kind, y, shared) in [
            (CompoundKind::And, xt, xf),
            (CompoundKind::Or, xf, xt),
            (CompoundKind::Nand, xf, xt),
            (CompoundKind::Nor, xt, xf),
        ] {
            if y == x {
                continue;
            }
            if g.in_degree(y) != 1 || g.out_degree(y) != 2 {
                continue;
            }
            let (yt, yf) = g.branch_targets(y)?;
            let (t, e, leaf_matches) = match kind {
                // x AND y: both false arms land on the shared else leaf.
                CompoundKind::And => (yt, shared, yf == shared),
                // x OR y: both true arms land on the shared then leaf.
                CompoundKind::Or => (shared, yf, yt == shared),
                // !x AND y: x's true arm is y's false arm.
                CompoundKind::Nand => (yt, shared, yf == shared),
                // !x OR y: x's false arm is y's true arm.
                CompoundKind::Nor => (shared, yf, yt == shared),
            };
            if !leaf_matches {
                continue;
            }
            let pred_labels = g
                .preds(x)
                .into_iter()
                .filter(|&p| p != x && p != y)
                .filter_map(|p| {
                    g.edge(p, x)
                        .and_then(|edge| edge.label())
                        .map(|l| (g.name(p).to_owned(), l.to_owned()))
                })
                .collect();
            return Ok(Some(CompoundSite {
                kind,
                x: g.name(x).to_owned(),
                y: g.name(y).to_owned(),
                t: g.name(t).to_owned(),
                e: g.name(e).to_owned(),
                pred_labels,
            }));
        }
    }
    Ok(None)
}

fn fold_site(g: &Cfg, site: &CompoundSite) -> Result<Cfg, StructureError> {
    let new_name = format!("{}_Cond{}", unquote(&site.x), site.kind.suffix());
    let del: FxHashSet<String> = [site.x.clone(), site.y.clone()].into_iter().collect();
    let mut out = merge(g, &del, &new_name)?;

    let n = out.node_by_name(&new_name).expect("fused node after merge");
    let t = out
        .node_by_name(&site.t)
        .expect("then leaf survives the merge");
    let e = out
        .node_by_name(&site.e)
        .expect("else leaf survives the merge");
    out.edge_mut(n, t).expect("edge to then leaf").set_label("true");
    out.edge_mut(n, e).expect("edge to else leaf").set_label("false");
    for (pred, label) in &site.pred_labels {
        let p = out.node_by_name(pred).expect("external predecessor survives");
        out.edge_mut(p, n)
            .expect("edge from external predecessor")
            .set_label(label.clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ravel_cfg::parse;

    #[test]
    fn test_fold_and() {
        let mut g = parse(
            "digraph g {\n\th [label=\"entry\"]\n\th -> y [label=\"true\"]\n\th -> e [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        assert_eq!(g.node_count(), 3);
        let n = g.node_by_name("h_CondAND").unwrap();
        assert!(g.node(n).is_entry());
        assert_eq!(g.name(g.true_target(n).unwrap()), "t");
        assert_eq!(g.name(g.false_target(n).unwrap()), "e");
    }

    #[test]
    fn test_fold_or() {
        let mut g = parse(
            "digraph g {\n\th [label=\"entry\"]\n\th -> t [label=\"true\"]\n\th -> y [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        let n = g.node_by_name("h_CondOR").unwrap();
        assert_eq!(g.name(g.true_target(n).unwrap()), "t");
        assert_eq!(g.name(g.false_target(n).unwrap()), "e");
    }

    #[test]
    fn test_fold_nand() {
        let mut g = parse(
            "digraph g {\n\th [label=\"entry\"]\n\th -> e [label=\"true\"]\n\th -> y [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        let n = g.node_by_name("h_CondNAND").unwrap();
        assert_eq!(g.name(g.true_target(n).unwrap()), "t");
        assert_eq!(g.name(g.false_target(n).unwrap()), "e");
    }

    #[test]
    fn test_fold_nor() {
        let mut g = parse(
            "digraph g {\n\th [label=\"entry\"]\n\th -> y [label=\"true\"]\n\th -> t [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        let n = g.node_by_name("h_CondNOR").unwrap();
        assert_eq!(g.name(g.true_target(n).unwrap()), "t");
        assert_eq!(g.name(g.false_target(n).unwrap()), "e");
    }

    #[test]
    fn test_fold_chain_collapses_pairwise() {
        // (a && b) && c over the same leaves.
        let mut g = parse(
            "digraph g {\n\ta [label=\"entry\"]\n\ta -> b [label=\"true\"]\n\ta -> e [label=\"false\"]\n\tb -> c [label=\"true\"]\n\tb -> e [label=\"false\"]\n\tc -> t [label=\"true\"]\n\tc -> e [label=\"false\"]\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        assert_eq!(g.node_count(), 3);
        let n = g.node_by_name("a_CondAND_CondAND").unwrap();
        assert_eq!(g.name(g.true_target(n).unwrap()), "t");
        assert_eq!(g.name(g.false_target(n).unwrap()), "e");
    }

    #[test]
    fn test_fold_restamps_predecessor_labels() {
        // An enclosing conditional p branches into the compound pair; its
        // edge keeps the true polarity across the fold.
        let mut g = parse(
            "digraph g {\n\tp [label=\"entry\"]\n\tp -> x [label=\"true\"]\n\tp -> q [label=\"false\"]\n\tx -> y [label=\"true\"]\n\tx -> e [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n\tq -> e\n}",
        )
        .unwrap();
        g = fold_compound_conds(g).unwrap();
        let p = g.node_by_name("p").unwrap();
        assert_eq!(g.name(g.true_target(p).unwrap()), "x_CondAND");
        assert_eq!(g.name(g.false_target(p).unwrap()), "q");
    }

    #[test]
    fn test_fold_is_idempotent() {
        let g = parse(
            "digraph g {\n\th [label=\"entry\"]\n\th -> y [label=\"true\"]\n\th -> e [label=\"false\"]\n\ty -> t [label=\"true\"]\n\ty -> e [label=\"false\"]\n}",
        )
        .unwrap();
        let once = fold_compound_conds(g).unwrap();
        let twice = fold_compound_conds(once.clone()).unwrap();
        assert_eq!(twice.render(), once.render());
    }

    #[test]
    fn test_plain_diamond_is_untouched() {
        let g = parse(
            "digraph g {\n\ta [label=\"entry\"]\n\ta -> b [label=\"true\"]\n\ta -> c [label=\"false\"]\n\tb -> d\n\tc -> d\n}",
        )
        .unwrap();
        let want = g.render();
        let out = fold_compound_conds(g).unwrap();
        assert_eq!(out.render(), want);
    }
}
