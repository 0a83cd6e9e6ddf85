//! Structural analysis of control flow graphs.
//!
//! The passes here recover high-level control flow from a flat graph of
//! basic blocks, following Cifuentes' "Structuring decompiled graphs"
//! (CC'96) on top of Allen–Cocke interval analysis:
//!
//! - [`intervals`] partitions a graph into its intervals;
//! - [`derived_sequence`] collapses intervals level by level until the
//!   graph reduces to a point (or stops reducing);
//! - [`structure_loops`] finds latches and classifies loops per interval
//!   per level;
//! - [`structure_two_way`] assigns every 2-way conditional its follow
//!   node via immediate dominators;
//! - [`fold_compound_conds`] fuses short-circuit conditional idioms
//!   (AND/OR/NAND/NOR) into single 2-way nodes.

mod compound;
mod derived;
mod error;
mod interval;
mod loops;
mod two_way;

#[cfg(test)]
pub(crate) mod testdata;

pub use compound::fold_compound_conds;
pub use derived::{derived_sequence, DerivedSeq};
pub use error::StructureError;
pub use interval::{intervals, Interval};
pub use loops::structure_loops;
pub use two_way::structure_two_way;
