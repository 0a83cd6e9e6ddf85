//! Ravel, a control flow graph restructurer.
//!
//! This crate provides the public API for recovering structured control
//! flow (if/if-else, loops, short-circuit conditions) from a flat graph
//! of basic blocks, as a compiler front end flattened it into jumps.

use thiserror::Error;

use ravel_cfg::{init_dfs_order, Cfg, CfgError};
use ravel_emit::{generate, EmitError, FuncDecl};
use ravel_structure::{
    fold_compound_conds, structure_loops, structure_two_way, StructureError,
};

/// Any failure along the restructuring pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cfg(#[from] CfgError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Recover the structured function body of a control flow graph.
///
/// Runs the full pipeline: DFS numbering, loop structuring over the
/// derived sequence, 2-way follow discovery, compound-condition folding,
/// then a re-structuring of the folded graph (folding changes node
/// identity, which discards the earlier annotations) and code generation.
pub fn restructure(mut g: Cfg) -> Result<FuncDecl, Error> {
    init_dfs_order(&mut g);
    structure_loops(&mut g)?;
    structure_two_way(&mut g)?;
    let mut g = fold_compound_conds(g)?;
    structure_loops(&mut g)?;
    structure_two_way(&mut g)?;
    Ok(generate(&g)?)
}
