//! Rewrites bindings whose path runs through a dynamically typed value.
//!
//! `{{$x := .Some.Method}}`, where `.Some` has no static type, can't be
//! resolved ahead of time. It becomes a call to the runtime lookup
//! function: `{{$x := browsePropertyPath . "Some.Method"}}`. Any part of
//! the path before the dynamic value stays static.

#[cfg(test)]
mod tests;

use std::mem;

use stencil_log::{debug, trace};

use crate::{
    errors::{Span, TransformError},
    options::PipelineOptions,
    tree::{Arg, List, Node, NodeKind, Pipe, Template, Variable},
    typecheck::ScopeStack,
    types::TypeId,
    Environment,
};

/// Replays `scopes` over `template`, which must be the tree they were
/// computed from, and routes dynamic path accesses through
/// [`PipelineOptions::lookup_function`].
pub fn unhole(
    template: &mut Template,
    scopes: &mut ScopeStack,
    env: &Environment,
    options: &PipelineOptions,
) -> Result<(), TransformError> {
    debug!("unholing `{}`", template.name);
    scopes.rewind();

    let mut state = UnholeState {
        scopes: &mut *scopes,
        env,
        lookup_function: &options.lookup_function,
    };

    let res = state.visit_list(&mut template.root);
    scopes.rewind();
    res
}

struct UnholeState<'a> {
    scopes: &'a mut ScopeStack,
    env: &'a Environment,
    lookup_function: &'a str,
}

/// Where a path starts: the cursor, or a variable.
enum PathBase {
    Cursor,
    Variable(String),
}

impl PathBase {
    /// The base followed by `fields`, as an argument.
    fn to_arg(&self, fields: &[String]) -> Arg {
        match (self, fields) {
            (PathBase::Cursor, []) => Arg::Dot,
            (PathBase::Cursor, _) => Arg::Field(fields.to_vec()),

            (PathBase::Variable(name), _) => Arg::Variable(Variable {
                name: name.clone(),
                fields: fields.to_vec(),
            }),
        }
    }
}

impl<'a> UnholeState<'a> {
    fn visit_list(&mut self, list: &mut List) -> Result<(), TransformError> {
        for node in &mut list.nodes {
            self.visit_node(node)?;
        }

        Ok(())
    }

    fn visit_node(&mut self, node: &mut Node) -> Result<(), TransformError> {
        let span = node.span;

        match &mut node.kind {
            NodeKind::Text(_) | NodeKind::Template(_) => {},
            NodeKind::Action(pipe) => self.visit_action(pipe, span)?,

            NodeKind::If(branch) => {
                self.visit_list(&mut branch.list)?;

                if let Some(else_list) = &mut branch.else_list {
                    self.visit_list(else_list)?;
                }
            },

            // Same frames, same order as type checking
            NodeKind::Range(branch) | NodeKind::With(branch) => {
                self.enter(span)?;
                self.visit_list(&mut branch.list)?;
                self.scopes.leave();

                if let Some(else_list) = &mut branch.else_list {
                    self.enter(span)?;
                    self.visit_list(else_list)?;
                    self.scopes.leave();
                }
            },
        }

        Ok(())
    }

    fn enter(&mut self, span: Span) -> Result<(), TransformError> {
        if self.scopes.enter() {
            Ok(())
        } else {
            Err(TransformError::invariant(
                span,
                "ran out of scope frames; the tree changed after type checking",
            ))
        }
    }

    fn visit_action(&mut self, pipe: &mut Pipe, span: Span) -> Result<(), TransformError> {
        let name = match (pipe.decl.as_slice(), pipe.cmds.len()) {
            ([name], 1) => name,
            _ => return Ok(()),
        };

        let declared = self.scopes.find_variable(name).ok_or_else(|| {
            TransformError::invariant(span, format!("`{}` was never type checked", name))
        })?;

        if !self.env.types.is_dynamic(declared) {
            return Ok(());
        }

        let cmd = &mut pipe.cmds[0];

        let (base, base_ty, segments) = match cmd.args.first() {
            // A lone field on the cursor is already looked up at runtime
            Some(Arg::Field(segments)) if segments.len() > 1 => {
                (PathBase::Cursor, self.scopes.cursor(), segments.clone())
            },

            Some(Arg::Variable(var)) if !var.fields.is_empty() => {
                let ty = self.variable_type(&var.name, span)?;
                (PathBase::Variable(var.name.clone()), ty, var.fields.clone())
            },

            _ => return Ok(()),
        };

        let hole = match self
            .env
            .types
            .walk_path(base_ty, &segments)
            .map_err(|message| TransformError::type_resolution(span, message))?
            .hole
        {
            Some(res) => res,
            // Statically resolvable, even if the result is dynamic
            None => return Ok(()),
        };

        // The segment that produced the dynamic value starts the lookup
        let split = hole.saturating_sub(1);
        let (prefix, suffix) = segments.split_at(split);

        let mut args = vec![
            Arg::Identifier(self.lookup_function.to_owned()),
            base.to_arg(prefix),
            Arg::string(suffix.join(".")),
        ];

        let old_args = mem::take(&mut cmd.args);
        args.extend(old_args.into_iter().skip(1));
        cmd.args = args;

        trace!("routed {} through {}", pipe, self.lookup_function);
        Ok(())
    }

    fn variable_type(&self, name: &str, span: Span) -> Result<TypeId, TransformError> {
        self.scopes.find_variable(name).ok_or_else(|| {
            TransformError::type_resolution(span, format!("undefined variable `{}`", name))
        })
    }
}
