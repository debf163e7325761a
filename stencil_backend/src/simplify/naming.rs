//! Canonical variable names. User variables become `$tplName`, which can
//! never clash with the `$varN` names the rewrites introduce.

use std::collections::{HashMap, HashSet};

use stencil_log::trace;

use crate::tree::{Arg, List, NodeKind, Pipe, ROOT_VARIABLE};

const USER_PREFIX: &str = "$tpl";
const SYNTHETIC_PREFIX: &str = "$var";
const UNCASED_MARKER: char = 'V';

/// The `n`th synthetic variable name.
pub(super) fn synthetic_name(n: usize) -> String {
    format!("{}{}", SYNTHETIC_PREFIX, n)
}

/// Whether `name` is already in one of the two canonical forms.
pub(super) fn is_canonical(name: &str) -> bool {
    if let Some(rest) = name.strip_prefix(SYNTHETIC_PREFIX) {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }

    match name.strip_prefix(USER_PREFIX) {
        Some(rest) => rest.chars().next().map_or(false, char::is_uppercase),
        None => false,
    }
}

/// `$some_name` to `$tplSomeName`. Names that don't start with a cased
/// letter get a `V` in front, so the result always passes [`is_canonical`].
pub(super) fn canonical_name(name: &str) -> String {
    let bare = name.trim_start_matches('$');
    let mut suffix = String::new();

    for part in bare.split('_').filter(|part| !part.is_empty()) {
        let mut chars = part.chars();

        if let Some(first) = chars.next() {
            suffix.extend(first.to_uppercase());
            suffix.push_str(chars.as_str());
        }
    }

    if !suffix.chars().next().map_or(false, char::is_uppercase) {
        suffix.insert(0, UNCASED_MARKER);
    }

    format!("{}{}", USER_PREFIX, suffix)
}

/// Calls `f` on every variable name in `list`: declarations,
/// assignments and references. `$` is skipped.
pub(super) fn visit_variables(list: &mut List, f: &mut dyn FnMut(&mut String)) {
    for node in &mut list.nodes {
        match &mut node.kind {
            NodeKind::Text(_) => {},
            NodeKind::Action(pipe) => visit_pipe_variables(pipe, f),

            NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
                visit_pipe_variables(&mut branch.pipe, f);
                visit_variables(&mut branch.list, f);

                if let Some(else_list) = &mut branch.else_list {
                    visit_variables(else_list, f);
                }
            },

            NodeKind::Template(call) => {
                if let Some(pipe) = &mut call.pipe {
                    visit_pipe_variables(pipe, f);
                }
            },
        }
    }
}

fn visit_pipe_variables(pipe: &mut Pipe, f: &mut dyn FnMut(&mut String)) {
    for name in &mut pipe.decl {
        f(name);
    }

    for cmd in &mut pipe.cmds {
        for arg in &mut cmd.args {
            match arg {
                Arg::Pipe(pipe) => visit_pipe_variables(pipe, f),
                Arg::Variable(var) if !var.is_root() => f(&mut var.name),
                _ => {},
            }
        }
    }
}

/// Every variable name used anywhere in `list`.
pub(super) fn variable_names(list: &mut List) -> HashSet<String> {
    let mut res = HashSet::new();
    visit_variables(list, &mut |name| {
        res.insert(name.clone());
    });
    res
}

/// Renames every non-canonical variable in `list` to its canonical form.
/// Two names with the same canonical form get numbered apart.
pub(super) fn canonicalize_variables(list: &mut List) {
    let mut order = Vec::new();
    let mut taken = HashSet::new();

    visit_variables(list, &mut |name| {
        if is_canonical(name) {
            taken.insert(name.clone());
        } else if !order.contains(name) {
            order.push(name.clone());
        }
    });

    let mut renames = HashMap::new();

    for name in order {
        let base = canonical_name(&name);
        let mut target = base.clone();
        let mut n = 0;

        while taken.contains(&target) {
            target = format!("{}{}", base, n);
            n += 1;
        }

        trace!("canonical name for {} is {}", name, target);
        taken.insert(target.clone());
        renames.insert(name, target);
    }

    visit_variables(list, &mut |name| {
        if name != ROOT_VARIABLE {
            if let Some(target) = renames.get(name.as_str()) {
                *name = target.clone();
            }
        }
    });
}
