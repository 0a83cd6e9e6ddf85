use thiserror::Error;

/// Errors raised by the graph core.
///
/// Parse errors come from malformed input and are recoverable per file;
/// the remaining variants are violations of the graph contract and abort
/// the pass that detects them.
#[derive(Debug, Error)]
pub enum CfgError {
    /// Input text is not a well-formed graph description.
    #[error("malformed graph: {0}")]
    Parse(String),

    /// No node carries `label="entry"`.
    #[error("unable to locate entry node; missing node with label attribute \"entry\"")]
    MissingEntry,

    /// More than one node carries `label="entry"`.
    #[error("entry node already set; prev entry node {prev}, new entry node {new}")]
    MultipleEntries { prev: String, new: String },

    /// An entry node whose stored `label` attribute holds something other
    /// than `"entry"`.
    #[error("invalid label of entry node {node}; expected \"entry\", got {got:?}")]
    EntryLabelClash { node: String, got: String },

    /// A node was added twice under the same name.
    #[error("node {0} already present in graph")]
    DuplicateNode(String),

    /// Branch lookup on a node whose out-degree is not exactly 2.
    #[error("branch lookup on node {node} requires exactly 2 successors, found {found}")]
    BranchDegree { node: String, found: usize },

    /// Branch lookup on a 2-way node whose outgoing edges do not carry the
    /// labels `"true"` and `"false"`.
    #[error("outgoing edges of node {node} must be labelled \"true\" and \"false\"")]
    BranchLabels { node: String },

    /// A name was looked up that no node in the graph carries.
    #[error("unable to locate node {0}")]
    UnknownNode(String),
}
