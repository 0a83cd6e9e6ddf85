//! Shared DOT fixtures for the crate's tests.
//!
//! `SAMPLE_DOT` is the control flow graph of Fig. 2 in C. Cifuentes'
//! "Structuring decompiled graphs" (CC'96): two post-test loops
//! (B7..B10 latched by B10, B13..B14 latched by B14) nested in an outer
//! region, plus an if/if-else ladder at the top.

pub(crate) const SAMPLE_DOT: &str = r#"digraph sample {
	B1 [label="entry"]
	B2
	B3
	B4
	B5
	B6
	B7
	B8
	B9
	B10
	B11
	B12
	B13
	B14
	B15
	B1 -> B2 [label="true"]
	B1 -> B5 [label="false"]
	B2 -> B3 [label="true"]
	B2 -> B4 [label="false"]
	B3 -> B5
	B4 -> B5
	B5 -> B6
	B6 -> B7 [label="true"]
	B6 -> B12 [label="false"]
	B7 -> B8
	B8 -> B9
	B9 -> B10
	B10 -> B7 [label="true"]
	B10 -> B11 [label="false"]
	B12 -> B13
	B13 -> B14
	B14 -> B13 [label="true"]
	B14 -> B15 [label="false"]
	B15 -> B6
}"#;

/// `SAMPLE_DOT` with the first interval {B1..B5} collapsed into `I1`.
pub(crate) const SAMPLE_I1_GOLDEN: &str = r#"digraph sample {
	B6
	B7
	B8
	B9
	B10
	B11
	B12
	B13
	B14
	B15
	I1 [label="entry"]
	B6 -> B7 [label="true"]
	B6 -> B12 [label="false"]
	B7 -> B8
	B8 -> B9
	B9 -> B10
	B10 -> B7 [label="true"]
	B10 -> B11 [label="false"]
	B12 -> B13
	B13 -> B14
	B14 -> B13 [label="true"]
	B14 -> B15 [label="false"]
	B15 -> B6
	I1 -> B6
}"#;

/// `SAMPLE_DOT` with the third interval {B13,B14,B15} collapsed into `I3`.
pub(crate) const SAMPLE_I3_GOLDEN: &str = r#"digraph sample {
	B1 [label="entry"]
	B2
	B3
	B4
	B5
	B6
	B7
	B8
	B9
	B10
	B11
	B12
	I3
	B1 -> B2 [label="true"]
	B1 -> B5 [label="false"]
	B2 -> B3 [label="true"]
	B2 -> B4 [label="false"]
	B3 -> B5
	B4 -> B5
	B5 -> B6
	B6 -> B7 [label="true"]
	B6 -> B12 [label="false"]
	B7 -> B8
	B8 -> B9
	B9 -> B10
	B10 -> B7 [label="true"]
	B10 -> B11 [label="false"]
	B12 -> I3
	I3 -> B6
}"#;

/// A small graph in canonical form, for round-trip tests.
pub(crate) const A_DOT: &str = r#"digraph a {
	A [label="entry"]
	B [color="red", shape="box"]
	A -> B
}"#;
