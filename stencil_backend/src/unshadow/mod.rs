//! Renames variable declarations so that no name is declared twice
//! in a tree. References are rewritten to follow the declaration they
//! resolve to.

mod renames;

use stencil_log::{debug, trace};

use self::renames::RenameTable;
use crate::{
    errors::{Span, TransformError},
    tree::{Arg, List, Node, NodeKind, Pipe, Template, ROOT_VARIABLE},
};

/// Gives every variable declaration in `template` a unique name.
/// Sub-templates called through `{{template}}` are not followed;
/// they are separate trees with their own variables.
pub fn unshadow(template: &mut Template) -> Result<(), TransformError> {
    debug!("unshadowing `{}`", template.name);

    let mut state = UnshadowState {
        renames: RenameTable::new(),
    };

    state.visit_list(&mut template.root)
}

struct UnshadowState {
    renames: RenameTable,
}

impl UnshadowState {
    fn visit_list(&mut self, list: &mut List) -> Result<(), TransformError> {
        for node in &mut list.nodes {
            self.visit_node(node)?;
        }

        Ok(())
    }

    fn visit_node(&mut self, node: &mut Node) -> Result<(), TransformError> {
        let span = node.span;

        match &mut node.kind {
            NodeKind::Text(_) => {},
            NodeKind::Action(pipe) => self.visit_pipe(pipe, span)?,

            NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
                // Declarations in the pipe live until `end`
                self.renames.push_scope();
                self.visit_pipe(&mut branch.pipe, span)?;

                self.renames.push_scope();
                self.visit_list(&mut branch.list)?;
                self.renames.pop_scope();

                if let Some(else_list) = &mut branch.else_list {
                    self.renames.push_scope();
                    self.visit_list(else_list)?;
                    self.renames.pop_scope();
                }

                self.renames.pop_scope();
            },

            NodeKind::Template(call) => {
                if let Some(pipe) = &mut call.pipe {
                    self.visit_pipe(pipe, span)?;
                }
            },
        }

        Ok(())
    }

    /// Commands are visited before declarations, so in `$x := $x`
    /// the right hand side still refers to the previous `$x`.
    fn visit_pipe(&mut self, pipe: &mut Pipe, span: Span) -> Result<(), TransformError> {
        for cmd in &mut pipe.cmds {
            for arg in &mut cmd.args {
                self.visit_arg(arg, span)?;
            }
        }

        for name in &mut pipe.decl {
            check_declared_name(name, span)?;

            let new_name = if pipe.is_assign {
                self.renames.resolve(name)
            } else {
                self.renames.declare(name)
            };

            if *name != new_name {
                trace!("renaming {} to {}", name, new_name);
                *name = new_name;
            }
        }

        Ok(())
    }

    fn visit_arg(&mut self, arg: &mut Arg, span: Span) -> Result<(), TransformError> {
        match arg {
            Arg::Pipe(pipe) => self.visit_pipe(pipe, span)?,

            Arg::Variable(var) => {
                if !var.is_root() {
                    var.name = self.renames.resolve(&var.name);
                }
            },

            Arg::Field(_) | Arg::Identifier(_) | Arg::Literal(_) | Arg::Dot => {},
        }

        Ok(())
    }
}

fn check_declared_name(name: &str, span: Span) -> Result<(), TransformError> {
    if name == ROOT_VARIABLE {
        Err(TransformError::structural(
            span,
            "the root variable `$` can't be declared",
        ))
    } else if !name.starts_with('$') || name.len() < 2 || name.contains('.') {
        Err(TransformError::structural(
            span,
            format!("`{}` is not a valid variable name", name),
        ))
    } else {
        Ok(())
    }
}
