//! The syntax-directed generator.
//!
//! Depth-first walk over the annotated graph. A node whose follow matches
//! the inherited one closes the current arm; a node visited twice becomes
//! a `goto` to its label. 2-way nodes require a resolved follow and emit
//! if / if-else, with the code after both arms placed in the enclosing
//! scope. Loops are not given dedicated statement forms here; re-entry
//! into a visited node falls back to the labelled jump.

use rustc_hash::FxHashSet;

use ravel_cfg::{unquote, Cfg, NodeIndex};

use crate::ast::{Block, FuncDecl, Ident, Stmt};
use crate::error::EmitError;

/// Generate the function tree for the graph.
///
/// Requires the follow annotations of the final, fully rewritten graph.
pub fn generate(g: &Cfg) -> Result<FuncDecl, EmitError> {
    let entry = g.entry().map_err(EmitError::from)?;
    log::debug!(
        "generating f_{} from entry {}",
        unquote(g.id()),
        g.name(entry)
    );
    let mut gen = Generator {
        g,
        done: FxHashSet::default(),
    };
    let mut body = Block::default();
    gen.emit(&mut body, entry, g.node(entry).if_follow)?;
    Ok(FuncDecl {
        name: format!("f_{}", unquote(g.id())),
        body,
    })
}

struct Generator<'g> {
    g: &'g Cfg,
    done: FxHashSet<NodeIndex>,
}

impl Generator<'_> {
    fn emit(
        &mut self,
        block: &mut Block,
        n: NodeIndex,
        if_follow: Option<NodeIndex>,
    ) -> Result<(), EmitError> {
        // Reaching the follow node closes the current then/else arm.
        if if_follow == Some(n) {
            return Ok(());
        }

        let label = format!("l_{}", unquote(self.g.name(n)));
        if self.done.contains(&n) {
            block.stmts.push(Stmt::Goto(label));
            return Ok(());
        }
        self.done.insert(n);

        match self.g.out_degree(n) {
            0 => {
                block.stmts.push(Stmt::Labeled {
                    label,
                    stmt: Box::new(Stmt::Return),
                });
                Ok(())
            }
            1 => {
                block.stmts.push(Stmt::Labeled {
                    label,
                    stmt: Box::new(Stmt::Empty),
                });
                let succ = self.g.succs(n)[0];
                self.emit(block, succ, if_follow)
            }
            2 => {
                let follow = self
                    .g
                    .node(n)
                    .if_follow
                    .ok_or_else(|| EmitError::UnresolvedBranch(self.g.name(n).to_owned()))?;
                let t = self.g.true_target(n)?;
                let f = self.g.false_target(n)?;
                let stmt = if t == follow && f == follow {
                    return Err(EmitError::VanishingArms(self.g.name(n).to_owned()));
                } else if t == follow {
                    // Only the false arm has a body.
                    let mut then_body = Block::default();
                    self.emit(&mut then_body, f, Some(follow))?;
                    Stmt::If {
                        cond: Ident::cond(),
                        then_body,
                        else_body: None,
                    }
                } else if f == follow {
                    // Only the true arm has a body.
                    let mut then_body = Block::default();
                    self.emit(&mut then_body, t, Some(follow))?;
                    Stmt::If {
                        cond: Ident::cond(),
                        then_body,
                        else_body: None,
                    }
                } else {
                    let mut then_body = Block::default();
                    self.emit(&mut then_body, t, Some(follow))?;
                    let mut else_body = Block::default();
                    self.emit(&mut else_body, f, Some(follow))?;
                    Stmt::If {
                        cond: Ident::cond(),
                        then_body,
                        else_body: Some(else_body),
                    }
                };
                block.stmts.push(Stmt::Labeled {
                    label,
                    stmt: Box::new(stmt),
                });
                // Code after both arms belongs to the enclosing scope.
                self.emit(block, follow, self.g.node(follow).if_follow)
            }
            count => Err(EmitError::TooManySuccessors {
                node: self.g.name(n).to_owned(),
                count,
            }),
        }
    }
}
