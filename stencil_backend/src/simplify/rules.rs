//! The individual rewrites. Each rule looks at one pipe and either
//! leaves it alone (`Ok(None)`) or changes it and reports how the
//! enclosing list has to change.

use std::mem;

use stencil_log::trace;

use super::{Rewrite, Simplifier};
use crate::{
    errors::{Span, TransformError},
    tree::{Arg, Command, Node, NodeKind, Pipe, Variable},
};

type RuleResult = Result<Option<Rewrite>, TransformError>;

/// Which kind of node a controlling pipe belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Control {
    If,
    Range,
    With,
    Template,
}

impl Control {
    /// `range` and `with` rebind the cursor,
    /// so a bare `.` has to be captured before them.
    fn captures_dot(self) -> bool {
        matches!(self, Control::Range | Control::With)
    }
}

fn var_arg(name: &str) -> Arg {
    Arg::Variable(Variable::new(name))
}

/// `{{name := cmds}}`
fn binding(name: &str, cmds: Vec<Command>, span: Span) -> Node {
    Node::new(NodeKind::Action(Pipe::binding(name, cmds)), span)
}

/// `{{name}}`
fn print(name: &str, span: Span) -> Node {
    Node::new(
        NodeKind::Action(Pipe::new(vec![Command::new(vec![var_arg(name)])])),
        span,
    )
}

/// Swaps the parenthesized pipeline at `args[index]` for a reference to
/// `name` and returns the pipeline.
fn take_pipe_arg(
    args: &mut Vec<Arg>,
    index: usize,
    name: &str,
    span: Span,
) -> Result<Pipe, TransformError> {
    let slot = args.get_mut(index).ok_or_else(|| {
        TransformError::invariant(span, format!("no argument at position {}", index))
    })?;

    match mem::replace(slot, var_arg(name)) {
        Arg::Pipe(pipe) => Ok(pipe),

        other => {
            *slot = other;
            Err(TransformError::invariant(
                span,
                format!("argument at position {} is not a pipeline", index),
            ))
        },
    }
}

/// Turns a parenthesized pipeline into a binding of its result.
fn hoisted_pipe(name: &str, pipe: Pipe, span: Span) -> Result<Node, TransformError> {
    if !pipe.decl.is_empty() {
        return Err(TransformError::structural(
            span,
            "a parenthesized pipeline can't declare variables",
        ));
    }

    Ok(binding(name, pipe.cmds, span))
}

/// `{{(X) | f}}` becomes `{{$v := X}}{{$v | f}}`.
pub(super) fn hoist_leading_pipe(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    let applies = pipe.cmds.len() > 1
        && pipe.cmds[1].is_call()
        && matches!(pipe.cmds[0].args.as_slice(), [Arg::Pipe(_)]);

    if !applies {
        return Ok(None);
    }

    let name = s.fresh_var();
    let inner = take_pipe_arg(&mut pipe.cmds[0].args, 0, &name, span)?;
    trace!("hoisting leading pipeline ({}) into {}", inner, name);
    Ok(Some(Rewrite::InsertBefore(hoisted_pipe(&name, inner, span)?)))
}

/// `{{f (X) y}}` becomes `{{$v := X}}{{f $v y}}`.
pub(super) fn hoist_nested_pipe(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    let position = pipe.cmds.iter().enumerate().find_map(|(i, cmd)| {
        cmd.args
            .iter()
            .skip(1)
            .position(|arg| matches!(arg, Arg::Pipe(_)))
            .map(|j| (i, j + 1))
    });

    let (cmd_index, arg_index) = match position {
        Some(res) => res,
        None => return Ok(None),
    };

    let name = s.fresh_var();
    let inner = take_pipe_arg(&mut pipe.cmds[cmd_index].args, arg_index, &name, span)?;
    trace!("hoisting nested pipeline ({}) into {}", inner, name);
    Ok(Some(Rewrite::InsertBefore(hoisted_pipe(&name, inner, span)?)))
}

/// `{{.A.B}}` becomes `{{$v := .A.B}}{{$v}}`. A path followed by more
/// commands is left to the other rules, so it ends up as an argument.
pub(super) fn bind_bare_path(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    let applies =
        pipe.decl.is_empty() && pipe.cmds.len() == 1 && pipe.head().map_or(false, Arg::is_path);

    if !applies {
        return Ok(None);
    }

    let name = s.fresh_var();
    trace!("binding path {} to {}", pipe, name);
    pipe.decl.push(name.clone());
    Ok(Some(Rewrite::InsertAfter(print(&name, span))))
}

/// `{{f .A}}` becomes `{{$v := .A}}{{f $v}}`, whether or not the call
/// is already bound to a variable.
pub(super) fn hoist_path_argument(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    let cmd = match pipe.cmds.first_mut() {
        Some(cmd) if cmd.is_call() && cmd.args.len() > 1 => cmd,
        _ => return Ok(None),
    };

    let index = match cmd.args.iter().skip(1).position(Arg::is_path) {
        Some(i) => i + 1,
        None => return Ok(None),
    };

    let name = s.fresh_var();
    let path = mem::replace(&mut cmd.args[index], var_arg(&name));
    trace!("hoisting argument {} into {}", path, name);
    Ok(Some(Rewrite::InsertBefore(binding(
        &name,
        vec![Command::new(vec![path])],
        span,
    ))))
}

/// `{{f x}}` becomes `{{$v := f x}}{{$v}}`.
pub(super) fn bind_call(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    if !pipe.decl.is_empty() || !pipe.cmds.first().map_or(false, Command::is_call) {
        return Ok(None);
    }

    let name = s.fresh_var();
    trace!("binding call {} to {}", pipe, name);
    pipe.decl.push(name.clone());
    Ok(Some(Rewrite::InsertAfter(print(&name, span))))
}

/// `{{((X))}}` becomes `{{X}}`.
pub(super) fn unwrap_pipe(pipe: &mut Pipe) -> RuleResult {
    let inner = match pipe.cmds.as_mut_slice() {
        [cmd] => match cmd.args.as_mut_slice() {
            [Arg::Pipe(inner)] if inner.decl.is_empty() => mem::take(&mut inner.cmds),
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };

    pipe.cmds = inner;
    trace!("unwrapped pipeline into {}", pipe);
    Ok(Some(Rewrite::InPlace))
}

/// `{{"x" | f "y"}}` becomes `{{f "y" "x"}}`. Only the first command can
/// move: later commands already receive the previous result.
pub(super) fn reorder_operand(pipe: &mut Pipe) -> RuleResult {
    let applies =
        pipe.cmds.len() > 1 && pipe.cmds[0].is_single_operand() && pipe.cmds[1].is_call();

    if !applies {
        return Ok(None);
    }

    let operand = pipe.cmds.remove(0);
    pipe.cmds[0].args.extend(operand.args);
    trace!("reordered pipeline into {}", pipe);
    Ok(Some(Rewrite::InPlace))
}

/// `{{f x | g}}` becomes `{{$v := f x}}{{$v | g}}`.
pub(super) fn hoist_chained_command(
    s: &mut Simplifier,
    pipe: &mut Pipe,
    span: Span,
) -> RuleResult {
    let applies =
        pipe.cmds.len() > 1 && pipe.cmds[1].is_call() && !pipe.cmds[0].is_single_operand();

    if !applies {
        return Ok(None);
    }

    let name = s.fresh_var();
    let first = mem::replace(&mut pipe.cmds[0], Command::new(vec![var_arg(&name)]));
    trace!("hoisting chained command {} into {}", first, name);
    Ok(Some(Rewrite::InsertBefore(binding(&name, vec![first], span))))
}

/// `{{range .A}}` becomes `{{$v := .A}}{{range $v}}`.
pub(super) fn hoist_control_operand(
    s: &mut Simplifier,
    pipe: &mut Pipe,
    span: Span,
    control: Control,
) -> RuleResult {
    let cmd = match pipe.cmds.first_mut() {
        Some(cmd) => cmd,
        None => return Ok(None),
    };

    let applies = match cmd.args.as_slice() {
        [arg] => arg.is_path() || (control.captures_dot() && matches!(arg, Arg::Dot)),
        _ => false,
    };

    if !applies {
        return Ok(None);
    }

    let name = s.fresh_var();
    let operand = mem::replace(&mut cmd.args[0], var_arg(&name));
    trace!("hoisting {:?} operand {} into {}", control, operand, name);
    Ok(Some(Rewrite::InsertBefore(binding(
        &name,
        vec![Command::new(vec![operand])],
        span,
    ))))
}

/// `{{if f x}}` becomes `{{$v := f x}}{{if $v}}`. Declarations stay.
pub(super) fn hoist_control_call(s: &mut Simplifier, pipe: &mut Pipe, span: Span) -> RuleResult {
    if !pipe.cmds.first().map_or(false, Command::is_call) {
        return Ok(None);
    }

    let name = s.fresh_var();
    let cmds = mem::replace(&mut pipe.cmds, vec![Command::new(vec![var_arg(&name)])]);
    let hoisted = binding(&name, cmds, span);
    trace!("hoisting control pipeline into {}", hoisted);
    Ok(Some(Rewrite::InsertBefore(hoisted)))
}
