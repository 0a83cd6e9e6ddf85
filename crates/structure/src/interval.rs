//! Allen–Cocke interval analysis.
//!
//! ref: Allen, Frances E., and John Cocke. "A program data flow analysis
//! procedure." Communications of the ACM 19.3 (1976): 137.

use rustc_hash::FxHashSet;

use ravel_cfg::{sort_by_rev_post, Cfg, NodeIndex};

use crate::error::StructureError;

/// An interval I(h): the maximal single-entry subgraph in which `h` is the
/// only entry node and in which all closed paths contain `h`.
///
/// Borrows its host graph; neighbour queries delegate to it.
#[derive(Debug)]
pub struct Interval<'g> {
    cfg: &'g Cfg,
    head: NodeIndex,
    set: FxHashSet<NodeIndex>,
}

impl<'g> Interval<'g> {
    fn new(cfg: &'g Cfg, head: NodeIndex) -> Self {
        let mut set = FxHashSet::default();
        set.insert(head);
        Self { cfg, head, set }
    }

    fn add(&mut self, ix: NodeIndex) {
        self.set.insert(ix);
    }

    /// The header node of the interval.
    pub fn head(&self) -> NodeIndex {
        self.head
    }

    pub fn contains(&self, ix: NodeIndex) -> bool {
        self.set.contains(&ix)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Member nodes in ascending reverse-postorder.
    pub fn nodes_by_rev_post(&self) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.set.iter().copied().collect();
        out.sort_by_key(|&ix| self.cfg.node(ix).rev_post);
        out
    }

    /// Member names, for collapsing the interval with [`ravel_cfg::merge`].
    pub fn member_names(&self) -> FxHashSet<String> {
        self.set.iter().map(|&ix| self.cfg.name(ix).to_owned()).collect()
    }

    /// Predecessors in the host graph, members or not.
    pub fn preds(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        self.cfg.preds(ix)
    }

    /// Successors in the host graph, members or not.
    pub fn succs(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        self.cfg.succs(ix)
    }

    /// Successors of a member that are themselves members.
    pub fn succs_within(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        self.cfg
            .succs(ix)
            .into_iter()
            .filter(|s| self.contains(*s))
            .collect()
    }
}

/// Partition the graph into its intervals, starting from the entry node.
///
/// Header discovery is a FIFO worklist: a node joins the worklist the
/// first time any (but not all) of its immediate predecessors land in an
/// interval. Candidate scans run in reverse-postorder, which fixes both
/// interval membership and enumeration order. A predecessor-less non-entry
/// node is a contract violation.
pub fn intervals(g: &Cfg) -> Result<Vec<Interval<'_>>, StructureError> {
    let entry = g.entry().map_err(StructureError::from)?;
    let order = sort_by_rev_post(g);
    let mut out: Vec<Interval<'_>> = Vec::new();
    // Headers ever enqueued stay in the list; membership checks cover the
    // consumed prefix too.
    let mut heads: Vec<NodeIndex> = vec![entry];
    let mut next = 0;
    while next < heads.len() {
        let head = heads[next];
        next += 1;
        let mut iv = Interval::new(g, head);
        // Grow: take any node all of whose immediate predecessors are
        // already inside, until nothing changes.
        loop {
            let mut added = false;
            for &n in &order {
                if n == entry || iv.contains(n) {
                    continue;
                }
                let preds = g.preds(n);
                if preds.is_empty() {
                    return Err(StructureError::MissingPredecessors(g.name(n).to_owned()));
                }
                if preds.iter().all(|p| iv.contains(*p)) {
                    iv.add(n);
                    added = true;
                }
            }
            if !added {
                break;
            }
        }
        // Enqueue new headers: nodes outside with at least one predecessor
        // inside.
        for &n in &order {
            if heads.contains(&n) || iv.contains(n) {
                continue;
            }
            let preds = g.preds(n);
            if preds.is_empty() {
                return Err(StructureError::MissingPredecessors(g.name(n).to_owned()));
            }
            if preds.iter().any(|p| iv.contains(*p)) {
                heads.push(n);
            }
        }
        log::debug!(
            "interval I({}) with {} nodes",
            g.name(iv.head()),
            iv.len()
        );
        out.push(iv);
    }
    Ok(out)
}
