//! Shared DOT fixtures for the crate's tests.
//!
//! `SAMPLE_DOT` is the control flow graph of Fig. 2 in C. Cifuentes'
//! "Structuring decompiled graphs" (CC'96).

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
