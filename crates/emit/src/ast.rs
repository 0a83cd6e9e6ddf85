//! The abstract statement tree the generator emits.
//!
//! Statement kinds: labelled statement, if with then-block and optional
//! else-block, unconditional jump, return, and the empty statement.
//! Conditions are opaque placeholder identifiers; expression recovery is
//! someone else's job. The `Display` impls render a deterministic text
//! form for drivers and tests.

use std::fmt;

/// An opaque identifier standing in for a recovered expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident(pub String);

impl Ident {
    /// The placeholder condition of a 2-way branch.
    pub fn cond() -> Self {
        Ident("cond".to_owned())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A generated function: a name and a single body block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub body: Block,
}

/// A sequence of statements in one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// A statement carrying a block label.
    Labeled { label: String, stmt: Box<Stmt> },
    /// Conditional with a then-block and an optional else-block.
    If {
        cond: Ident,
        then_body: Block,
        else_body: Option<Block>,
    },
    /// Unconditional jump to a label.
    Goto(String),
    Return,
    Empty,
}

impl fmt::Display for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "func {}() {{", self.name)?;
        self.body.fmt_indent(f, 1)?;
        f.write_str("}")
    }
}

impl Block {
    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        for stmt in &self.stmts {
            stmt.fmt_indent(f, level)?;
        }
        Ok(())
    }
}

impl Stmt {
    fn fmt_indent(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        let pad = "\t".repeat(level);
        match self {
            Stmt::Labeled { label, stmt } => {
                writeln!(f, "{pad}{label}:")?;
                stmt.fmt_indent(f, level)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                writeln!(f, "{pad}if {cond} {{")?;
                then_body.fmt_indent(f, level + 1)?;
                if let Some(else_body) = else_body {
                    writeln!(f, "{pad}}} else {{")?;
                    else_body.fmt_indent(f, level + 1)?;
                }
                writeln!(f, "{pad}}}")
            }
            Stmt::Goto(label) => writeln!(f, "{pad}goto {label}"),
            Stmt::Return => writeln!(f, "{pad}return"),
            Stmt::Empty => writeln!(f, "{pad};"),
        }
    }
}
