use thiserror::Error;

use ravel_cfg::CfgError;

/// Errors raised by the structuring passes.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error(transparent)]
    Cfg(#[from] CfgError),

    /// A non-entry node with no predecessors; the graph breaks the
    /// everything-reachable-from-entry contract.
    #[error("invalid node {0}; missing predecessors")]
    MissingPredecessors(String),

    /// Loop whose header and latch are both 2-way; picking the loop type
    /// needs a heuristic that is not implemented.
    #[error("loop with 2-way header {head} and 2-way latch {latch} is not supported")]
    TwoWayHeadLatch { head: String, latch: String },
}
