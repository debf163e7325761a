//! Read-only questions about a tree.

use crate::tree::{Arg, List, NodeKind, Pipe, Template};

/// Whether executing `template` can produce any output: it has literal
/// text, or an action that prints rather than declares.
pub fn prints_anything(template: &Template) -> bool {
    list_prints(&template.root)
}

fn list_prints(list: &List) -> bool {
    list.nodes.iter().any(|node| match &node.kind {
        NodeKind::Text(_) => true,
        NodeKind::Action(pipe) => pipe.decl.is_empty() && !pipe.cmds.is_empty(),

        NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
            list_prints(&branch.list) || branch.else_list.as_ref().map_or(false, list_prints)
        },

        // Whatever the sub-template prints is its own business
        NodeKind::Template(_) => false,
    })
}

/// Whether `template` reads the data it is executed with, through `.`,
/// a field path, or `$`.
pub fn uses_dot(template: &Template) -> bool {
    list_uses_dot(&template.root, false)
}

/// `rebound` is set inside `range` and `with` bodies, where `.` is no
/// longer the template's data. `$` still is.
fn list_uses_dot(list: &List, rebound: bool) -> bool {
    list.nodes.iter().any(|node| match &node.kind {
        NodeKind::Text(_) => false,
        NodeKind::Action(pipe) => pipe_uses_dot(pipe, rebound),

        NodeKind::If(branch) => {
            pipe_uses_dot(&branch.pipe, rebound)
                || list_uses_dot(&branch.list, rebound)
                || branch
                    .else_list
                    .as_ref()
                    .map_or(false, |list| list_uses_dot(list, rebound))
        },

        NodeKind::Range(branch) | NodeKind::With(branch) => {
            // The else branch keeps the outer cursor
            pipe_uses_dot(&branch.pipe, rebound)
                || list_uses_dot(&branch.list, true)
                || branch
                    .else_list
                    .as_ref()
                    .map_or(false, |list| list_uses_dot(list, rebound))
        },

        NodeKind::Template(call) => call
            .pipe
            .as_ref()
            .map_or(false, |pipe| pipe_uses_dot(pipe, rebound)),
    })
}

fn pipe_uses_dot(pipe: &Pipe, rebound: bool) -> bool {
    pipe.cmds.iter().flat_map(|cmd| &cmd.args).any(|arg| match arg {
        Arg::Dot | Arg::Field(_) => !rebound,
        Arg::Variable(var) => var.is_root(),
        Arg::Pipe(inner) => pipe_uses_dot(inner, rebound),
        Arg::Identifier(_) | Arg::Literal(_) => false,
    })
}
