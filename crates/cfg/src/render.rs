//! Canonical DOT rendering.
//!
//! Nodes first in natural name order, then edges in natural (from, to)
//! order, attributes sorted by key, values quoted, tab indentation. The
//! entry flag is re-injected as `label="entry"`.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::graph::Cfg;

fn fmt_attrs(out: &mut String, attrs: &FxHashMap<String, String>, extra_label: Option<&str>) {
    let mut pairs: Vec<(&str, &str)> = attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    if let Some(label) = extra_label {
        if !attrs.contains_key("label") {
            pairs.push(("label", label));
        }
    }
    if pairs.is_empty() {
        return;
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    out.push_str(" [");
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}=\"{}\"", k, v);
    }
    out.push(']');
}

impl Cfg {
    /// Render the graph in canonical DOT form, without a trailing newline.
    ///
    /// Panics if an entry node carries a conflicting `label` attribute;
    /// the parser rejects that state, so hitting it means the graph was
    /// mutated past its contract.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", self.id());
        for ix in self.nodes_by_name() {
            let node = self.node(ix);
            let extra = if node.is_entry() {
                if let Some(prev) = node.attr("label") {
                    if prev != "entry" {
                        panic!(
                            "invalid label of entry node {}; expected \"entry\", got {:?}",
                            node.name(),
                            prev
                        );
                    }
                }
                Some("entry")
            } else {
                None
            };
            out.push('\t');
            out.push_str(node.name());
            fmt_attrs(&mut out, node.attrs(), extra);
            out.push('\n');
        }
        for from in self.nodes_by_name() {
            for to in self.succs(from) {
                let edge = self.edge(from, to).expect("successor without edge");
                out.push('\t');
                let _ = write!(out, "{} -> {}", self.name(from), self.name(to));
                fmt_attrs(&mut out, edge.attrs(), None);
                out.push('\n');
            }
        }
        out.push('}');
        out
    }
}
