use thiserror::Error;

use ravel_cfg::CfgError;

/// Errors raised during code generation.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Cfg(#[from] CfgError),

    /// A 2-way conditional reached with no resolved follow node.
    #[error("unresolved 2-way conditional; no follow node for {0}")]
    UnresolvedBranch(String),

    /// Both arms of a conditional lead straight to its follow node.
    #[error("both arms of {0} lead straight to the follow node")]
    VanishingArms(String),

    /// n-way branches are not recovered.
    #[error("node {node} has {count} successors; more than 2 are not supported")]
    TooManySuccessors { node: String, count: usize },
}
