use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rustc_hash::FxHashMap;

use crate::error::CfgError;
use crate::order::natural_cmp;

/// Loop classification of a loop header node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopType {
    /// Condition tested before the body (while).
    PreTest,
    /// Condition tested after the body (do-while).
    PostTest,
    /// No exit condition on header or latch.
    Endless,
}

/// A basic block in the control flow graph.
///
/// The block content is opaque to the structuring passes; what matters is
/// the name, the entry flag, the DOT attributes kept for round-trip
/// rendering, and the derived state written by DFS numbering and the
/// structuring passes.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    entry: bool,
    attrs: FxHashMap<String, String>,

    /// DFS visit order. Meaningful only after [`crate::init_dfs_order`].
    pub pre: usize,
    /// DFS finish order. Meaningful only after [`crate::init_dfs_order`].
    pub post: usize,
    /// Reverse postorder index, `node_count - post`.
    pub rev_post: usize,

    /// Set when this node is the latch of a loop.
    pub is_latch: bool,
    /// Loop classification. Set only on loop headers.
    pub loop_type: Option<LoopType>,
    /// Header of the innermost loop containing this node (may be self).
    pub loop_head: Option<NodeIndex>,
    /// On a header, the latch node of its loop.
    pub latch: Option<NodeIndex>,
    /// On a header, the node the loop exits to (none for endless loops).
    pub loop_follow: Option<NodeIndex>,
    /// On a 2-way conditional, the node at which both arms reconverge.
    pub if_follow: Option<NodeIndex>,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            entry: false,
            attrs: FxHashMap::default(),
            pre: 0,
            post: 0,
            rev_post: 0,
            is_latch: false,
            loop_type: None,
            loop_head: None,
            latch: None,
            loop_follow: None,
            if_follow: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_entry(&self) -> bool {
        self.entry
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attrs.remove(key);
    }

    pub fn attrs(&self) -> &FxHashMap<String, String> {
        &self.attrs
    }

    fn reset_derived(&mut self) {
        self.pre = 0;
        self.post = 0;
        self.rev_post = 0;
        self.is_latch = false;
        self.loop_type = None;
        self.loop_head = None;
        self.latch = None;
        self.loop_follow = None;
        self.if_follow = None;
    }
}

/// An edge in the control flow graph.
///
/// The reserved attribute `label` with value `"true"` or `"false"` marks
/// branch polarity on the outgoing edges of a 2-way node.
#[derive(Debug, Clone, Default)]
pub struct Edge {
    attrs: FxHashMap<String, String>,
}

impl Edge {
    pub fn new() -> Self {
        Self::default()
    }

    /// An edge carrying only a `label` attribute.
    pub fn labelled(label: impl Into<String>) -> Self {
        let mut e = Self::default();
        e.set_label(label);
        e
    }

    pub fn label(&self) -> Option<&str> {
        self.attr("label")
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.set_attr("label", label);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn attrs(&self) -> &FxHashMap<String, String> {
        &self.attrs
    }
}

/// A control flow graph: named nodes, directed labelled edges, one entry.
///
/// Node identity is the name; indices are looked up through the name table
/// and stay valid until the node is removed. Structural rewrites (merge,
/// compound folding) produce a fresh graph, so callers must not retain
/// indices across them.
#[derive(Debug, Clone)]
pub struct Cfg {
    id: String,
    graph: StableDiGraph<Node, Edge>,
    by_name: FxHashMap<String, NodeIndex>,
    entry: Option<NodeIndex>,
}

impl Cfg {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            graph: StableDiGraph::default(),
            by_name: FxHashMap::default(),
            entry: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// The underlying petgraph storage, for graph algorithms.
    pub fn graph(&self) -> &StableDiGraph<Node, Edge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> Result<NodeIndex, CfgError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(CfgError::DuplicateNode(name));
        }
        let ix = self.graph.add_node(Node::new(name.clone()));
        self.by_name.insert(name, ix);
        Ok(ix)
    }

    /// Look up a node by name, adding a bare node if absent.
    pub fn ensure_node(&mut self, name: &str) -> NodeIndex {
        match self.by_name.get(name) {
            Some(&ix) => ix,
            None => {
                let ix = self.graph.add_node(Node::new(name.to_owned()));
                self.by_name.insert(name.to_owned(), ix);
                ix
            }
        }
    }

    pub fn remove_node(&mut self, ix: NodeIndex) {
        if let Some(node) = self.graph.remove_node(ix) {
            self.by_name.remove(&node.name);
            if self.entry == Some(ix) {
                self.entry = None;
            }
        }
    }

    pub fn node(&self, ix: NodeIndex) -> &Node {
        &self.graph[ix]
    }

    pub fn node_mut(&mut self, ix: NodeIndex) -> &mut Node {
        &mut self.graph[ix]
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, ix: NodeIndex) -> &str {
        self.graph[ix].name()
    }

    /// All node indices, in natural name order.
    pub fn nodes_by_name(&self) -> Vec<NodeIndex> {
        let mut ixs: Vec<NodeIndex> = self.graph.node_indices().collect();
        ixs.sort_by(|&a, &b| natural_cmp(self.name(a), self.name(b)));
        ixs
    }

    pub fn entry(&self) -> Result<NodeIndex, CfgError> {
        self.entry.ok_or(CfgError::MissingEntry)
    }

    pub fn set_entry(&mut self, ix: NodeIndex) -> Result<(), CfgError> {
        match self.entry {
            Some(prev) if prev != ix => Err(CfgError::MultipleEntries {
                prev: self.name(prev).to_owned(),
                new: self.name(ix).to_owned(),
            }),
            _ => {
                self.graph[ix].entry = true;
                self.entry = Some(ix);
                Ok(())
            }
        }
    }

    /// Add an edge, replacing any existing edge between the same endpoints.
    pub fn set_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: Edge) {
        match self.graph.find_edge(from, to) {
            Some(eix) => self.graph[eix] = edge,
            None => {
                self.graph.add_edge(from, to, edge);
            }
        }
    }

    /// Add an edge by node name, auto-adding missing endpoints.
    pub fn set_edge_named(&mut self, from: &str, to: &str, edge: Edge) {
        let f = self.ensure_node(from);
        let t = self.ensure_node(to);
        self.set_edge(f, t, edge);
    }

    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&Edge> {
        self.graph.find_edge(from, to).map(|eix| &self.graph[eix])
    }

    pub fn edge_mut(&mut self, from: NodeIndex, to: NodeIndex) -> Option<&mut Edge> {
        self.graph
            .find_edge(from, to)
            .map(|eix| &mut self.graph[eix])
    }

    /// Successors, in natural name order.
    pub fn succs(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(ix).collect();
        out.sort_by(|&a, &b| natural_cmp(self.name(a), self.name(b)));
        out
    }

    /// Predecessors, in natural name order.
    pub fn preds(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(ix, Direction::Incoming)
            .collect();
        out.sort_by(|&a, &b| natural_cmp(self.name(a), self.name(b)));
        out
    }

    pub fn out_degree(&self, ix: NodeIndex) -> usize {
        self.graph.edges(ix).count()
    }

    pub fn in_degree(&self, ix: NodeIndex) -> usize {
        self.graph.edges_directed(ix, Direction::Incoming).count()
    }

    /// The successor reached when the condition at `ix` is true.
    pub fn true_target(&self, ix: NodeIndex) -> Result<NodeIndex, CfgError> {
        Ok(self.branch_targets(ix)?.0)
    }

    /// The successor reached when the condition at `ix` is false.
    pub fn false_target(&self, ix: NodeIndex) -> Result<NodeIndex, CfgError> {
        Ok(self.branch_targets(ix)?.1)
    }

    /// Both branch targets of a 2-way node, as `(true, false)`.
    ///
    /// Requires out-degree exactly 2 with distinct `"true"`/`"false"` edge
    /// labels.
    pub fn branch_targets(&self, ix: NodeIndex) -> Result<(NodeIndex, NodeIndex), CfgError> {
        let out: Vec<(NodeIndex, Option<String>)> = self
            .graph
            .edges(ix)
            .map(|e| (e.target(), e.weight().label().map(str::to_owned)))
            .collect();
        if out.len() != 2 {
            return Err(CfgError::BranchDegree {
                node: self.name(ix).to_owned(),
                found: out.len(),
            });
        }
        let mut t = None;
        let mut f = None;
        for (target, label) in out {
            match label.as_deref() {
                Some("true") if t.is_none() => t = Some(target),
                Some("false") if f.is_none() => f = Some(target),
                _ => {
                    return Err(CfgError::BranchLabels {
                        node: self.name(ix).to_owned(),
                    })
                }
            }
        }
        match (t, f) {
            (Some(t), Some(f)) => Ok((t, f)),
            _ => Err(CfgError::BranchLabels {
                node: self.name(ix).to_owned(),
            }),
        }
    }

    /// Reset DFS numbers and structural annotations on every node.
    ///
    /// Called after rewrites that change node identity; the annotations of
    /// the old graph do not carry over.
    pub fn clear_derived(&mut self) {
        for ix in self.graph.node_indices().collect::<Vec<_>>() {
            self.graph[ix].reset_derived();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Cfg {
        let mut g = Cfg::new("t");
        g.set_edge_named("A", "B", Edge::labelled("true"));
        g.set_edge_named("A", "C", Edge::labelled("false"));
        g.set_edge_named("B", "D", Edge::new());
        g.set_edge_named("C", "D", Edge::new());
        let a = g.node_by_name("A").unwrap();
        g.set_entry(a).unwrap();
        g
    }

    #[test]
    fn test_edge_auto_adds_endpoints() {
        let g = diamond();
        assert_eq!(g.node_count(), 4);
        let a = g.node_by_name("A").unwrap();
        let d = g.node_by_name("D").unwrap();
        assert_eq!(g.out_degree(a), 2);
        assert_eq!(g.in_degree(d), 2);
        assert_eq!(g.entry().unwrap(), a);
    }

    #[test]
    fn test_branch_targets() {
        let g = diamond();
        let a = g.node_by_name("A").unwrap();
        assert_eq!(g.true_target(a).unwrap(), g.node_by_name("B").unwrap());
        assert_eq!(g.false_target(a).unwrap(), g.node_by_name("C").unwrap());
    }

    #[test]
    fn test_branch_lookup_requires_two_successors() {
        let g = diamond();
        let b = g.node_by_name("B").unwrap();
        assert!(matches!(
            g.true_target(b),
            Err(CfgError::BranchDegree { found: 1, .. })
        ));
    }

    #[test]
    fn test_branch_lookup_requires_labels() {
        let mut g = Cfg::new("t");
        g.set_edge_named("A", "B", Edge::labelled("true"));
        g.set_edge_named("A", "C", Edge::new());
        let a = g.node_by_name("A").unwrap();
        assert!(matches!(
            g.true_target(a),
            Err(CfgError::BranchLabels { .. })
        ));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut g = Cfg::new("t");
        g.add_node("A").unwrap();
        assert!(matches!(g.add_node("A"), Err(CfgError::DuplicateNode(_))));
    }

    #[test]
    fn test_set_edge_replaces() {
        let mut g = Cfg::new("t");
        g.set_edge_named("A", "B", Edge::labelled("true"));
        g.set_edge_named("A", "B", Edge::labelled("false"));
        let a = g.node_by_name("A").unwrap();
        let b = g.node_by_name("B").unwrap();
        assert_eq!(g.out_degree(a), 1);
        assert_eq!(g.edge(a, b).unwrap().label(), Some("false"));
    }

    #[test]
    fn test_second_entry_rejected() {
        let mut g = diamond();
        let b = g.node_by_name("B").unwrap();
        assert!(matches!(
            g.set_entry(b),
            Err(CfgError::MultipleEntries { .. })
        ));
    }
}
