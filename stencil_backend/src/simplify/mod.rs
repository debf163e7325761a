//! Breaks nested expressions apart until every action and control node
//! applies at most one function, with each intermediate value bound to
//! its own variable.
//!
//! The driver is a fixpoint: scan the tree from the top, apply the first
//! rule that matches, start over. A rule that needs a new node next to
//! the one it is rewriting hands it back as a [`Rewrite`], and the list
//! holding that node splices it in by index.

mod naming;
mod rules;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

use stencil_log::debug;

use self::rules::Control;
use crate::{
    errors::{Span, TransformError},
    options::PipelineOptions,
    tree::{Arg, Branch, List, Node, NodeKind, Pipe, Template},
};

/// What a rule did to the node it was looking at.
#[derive(Debug)]
enum Rewrite {
    /// Only the node itself changed.
    InPlace,
    /// This node must go right before the current one.
    InsertBefore(Node),
    /// This node must go right after the current one.
    InsertAfter(Node),
}

/// Per-invocation state: the synthetic name counter.
struct Simplifier {
    next_var: usize,
    /// Names already used in the tree, which the counter must skip.
    taken: HashSet<String>,
}

impl Simplifier {
    fn fresh_var(&mut self) -> String {
        loop {
            let name = naming::synthetic_name(self.next_var);
            self.next_var += 1;

            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }

    /// Applies the first matching rule somewhere in `list`.
    /// Returns whether anything changed.
    fn simplify_list(&mut self, list: &mut List) -> Result<bool, TransformError> {
        for i in 0..list.nodes.len() {
            let rewrite = match self.simplify_node(&mut list.nodes[i])? {
                Some(res) => res,
                None => continue,
            };

            match rewrite {
                Rewrite::InPlace => {},
                Rewrite::InsertBefore(node) => list.nodes.insert(i, node),
                Rewrite::InsertAfter(node) => list.nodes.insert(i + 1, node),
            }

            return Ok(true);
        }

        Ok(false)
    }

    fn simplify_node(&mut self, node: &mut Node) -> Result<Option<Rewrite>, TransformError> {
        let span = node.span;

        match &mut node.kind {
            NodeKind::Text(_) => Ok(None),
            NodeKind::Action(pipe) => self.simplify_action(pipe, span),
            NodeKind::If(branch) => self.simplify_branch(branch, span, Control::If),
            NodeKind::Range(branch) => self.simplify_branch(branch, span, Control::Range),
            NodeKind::With(branch) => self.simplify_branch(branch, span, Control::With),

            NodeKind::Template(call) => match &mut call.pipe {
                Some(pipe) => self.simplify_control_pipe(pipe, span, Control::Template),
                None => Ok(None),
            },
        }
    }

    fn simplify_action(
        &mut self,
        pipe: &mut Pipe,
        span: Span,
    ) -> Result<Option<Rewrite>, TransformError> {
        let rules: [fn(&mut Self, &mut Pipe, Span) -> Result<Option<Rewrite>, TransformError>; 6] = [
            rules::hoist_leading_pipe,
            rules::hoist_nested_pipe,
            rules::bind_bare_path,
            rules::hoist_path_argument,
            rules::bind_call,
            Self::simplify_pipe,
        ];

        for rule in &rules {
            if let Some(res) = rule(self, pipe, span)? {
                return Ok(Some(res));
            }
        }

        Ok(None)
    }

    /// Rules shared by every pipe.
    fn simplify_pipe(
        &mut self,
        pipe: &mut Pipe,
        span: Span,
    ) -> Result<Option<Rewrite>, TransformError> {
        if let Some(res) = rules::unwrap_pipe(pipe)? {
            return Ok(Some(res));
        }

        if let Some(res) = rules::reorder_operand(pipe)? {
            return Ok(Some(res));
        }

        rules::hoist_chained_command(self, pipe, span)
    }

    fn simplify_control_pipe(
        &mut self,
        pipe: &mut Pipe,
        span: Span,
        control: Control,
    ) -> Result<Option<Rewrite>, TransformError> {
        if let Some(res) = rules::hoist_control_operand(self, pipe, span, control)? {
            return Ok(Some(res));
        }

        if let Some(res) = rules::unwrap_pipe(pipe)? {
            return Ok(Some(res));
        }

        if let Some(res) = rules::reorder_operand(pipe)? {
            return Ok(Some(res));
        }

        if let Some(res) = rules::hoist_control_call(self, pipe, span)? {
            return Ok(Some(res));
        }

        if let Some(res) = rules::hoist_chained_command(self, pipe, span)? {
            return Ok(Some(res));
        }

        rules::hoist_nested_pipe(self, pipe, span)
    }

    fn simplify_branch(
        &mut self,
        branch: &mut Branch,
        span: Span,
        control: Control,
    ) -> Result<Option<Rewrite>, TransformError> {
        if let Some(res) = self.simplify_control_pipe(&mut branch.pipe, span, control)? {
            return Ok(Some(res));
        }

        // Nested lists splice their own insertions
        if self.simplify_list(&mut branch.list)? {
            return Ok(Some(Rewrite::InPlace));
        }

        if let Some(else_list) = &mut branch.else_list {
            if self.simplify_list(else_list)? {
                return Ok(Some(Rewrite::InPlace));
            }
        }

        Ok(None)
    }
}

/// Rewrites `template` until no rule applies. Running it again on its
/// own output changes nothing.
pub fn simplify(template: &mut Template, options: &PipelineOptions) -> Result<(), TransformError> {
    debug!("simplifying `{}`", template.name);
    check_structure(&template.root)?;

    if options.rename_variables {
        naming::canonicalize_variables(&mut template.root);
    }

    let mut simplifier = Simplifier {
        next_var: 0,
        taken: naming::variable_names(&mut template.root),
    };

    let mut rewrites = 0usize;
    while simplifier.simplify_list(&mut template.root)? {
        rewrites += 1;
    }

    debug!(
        "simplified `{}` in {} rewrites",
        template.name, rewrites
    );

    Ok(())
}

/// Rejects trees the rules can't make sense of.
fn check_structure(list: &List) -> Result<(), TransformError> {
    for node in &list.nodes {
        let span = node.span;

        let max_decls = match &node.kind {
            NodeKind::Text(_) => continue,
            NodeKind::Range(_) => 2,
            _ => 1,
        };

        if let Some(pipe) = node.pipe() {
            if pipe.decl.len() > max_decls {
                return Err(TransformError::structural(
                    span,
                    format!(
                        "too many variables declared in `{}` (at most {} allowed)",
                        pipe, max_decls
                    ),
                ));
            }

            check_pipe(pipe, span)?;
        }

        match &node.kind {
            NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
                if branch.pipe.cmds.is_empty() {
                    return Err(TransformError::structural(span, "missing condition"));
                }

                check_structure(&branch.list)?;

                if let Some(else_list) = &branch.else_list {
                    check_structure(else_list)?;
                }
            },

            NodeKind::Action(pipe) if pipe.cmds.is_empty() => {
                return Err(TransformError::structural(span, "empty action"));
            },

            _ => {},
        }
    }

    Ok(())
}

fn check_pipe(pipe: &Pipe, span: Span) -> Result<(), TransformError> {
    for cmd in &pipe.cmds {
        if cmd.args.is_empty() {
            return Err(TransformError::structural(span, "empty command"));
        }

        for arg in &cmd.args {
            if let Arg::Pipe(inner) = arg {
                if !inner.decl.is_empty() {
                    return Err(TransformError::structural(
                        span,
                        format!("parenthesized pipeline `({})` declares variables", inner),
                    ));
                }

                check_pipe(inner, span)?;
            }
        }
    }

    Ok(())
}
