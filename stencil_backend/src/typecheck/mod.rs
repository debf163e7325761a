//! Infers a static type for every variable binding and for the cursor
//! in every block. Expects a simplified tree: each binding holds a
//! single command.

mod scopes;

use stencil_log::{debug, trace};

pub use self::scopes::{ScopeFrame, ScopeStack, CURSOR};
use crate::{
    errors::{Span, TransformError},
    options::PipelineOptions,
    tree::{Arg, Branch, Command, List, Literal, Node, NodeKind, Pipe, Template, Variable},
    types::{TypeId, BOOL, DYNAMIC, FLOAT, INT, STRING},
    Environment,
};

/// Type checks `template` against `env`. The returned scopes are rewound,
/// ready to be replayed over the same tree.
pub fn typecheck(
    template: &Template,
    env: &Environment,
    options: &PipelineOptions,
) -> Result<ScopeStack, TransformError> {
    debug!("type checking `{}`", template.name);

    let mut checker = TypeChecker {
        env,
        lookup_function: &options.lookup_function,
        scopes: ScopeStack::new(env.root),
    };

    checker.check_list(&template.root)?;

    let mut scopes = checker.scopes;
    scopes.rewind();
    Ok(scopes)
}

struct TypeChecker<'env> {
    env: &'env Environment,
    lookup_function: &'env str,
    scopes: ScopeStack,
}

impl<'env> TypeChecker<'env> {
    fn check_list(&mut self, list: &List) -> Result<(), TransformError> {
        for node in &list.nodes {
            self.check_node(node)?;
        }

        Ok(())
    }

    fn check_node(&mut self, node: &Node) -> Result<(), TransformError> {
        let span = node.span;

        match &node.kind {
            NodeKind::Text(_) | NodeKind::Template(_) => Ok(()),
            NodeKind::Action(pipe) => self.check_action(pipe, span),

            NodeKind::If(branch) => {
                if !branch.pipe.decl.is_empty() {
                    self.check_action(&branch.pipe, span)?;
                }

                self.check_list(&branch.list)?;

                if let Some(else_list) = &branch.else_list {
                    self.check_list(else_list)?;
                }

                Ok(())
            },

            NodeKind::Range(branch) => self.check_range(branch, span),
            NodeKind::With(branch) => self.check_with(branch, span),
        }
    }

    /// Binds the declared variable, if any, to the type of the pipe.
    fn check_action(&mut self, pipe: &Pipe, span: Span) -> Result<(), TransformError> {
        match pipe.decl.as_slice() {
            [] => Ok(()),

            [name] => {
                let ty = self.pipe_type(pipe, span)?;

                if pipe.is_assign {
                    self.check_assignment(name, ty, span)
                } else {
                    trace!("{} is {}", name, self.env.types.type_name(ty));
                    self.scopes.add_variable(name, ty);
                    Ok(())
                }
            },

            _ => Err(TransformError::structural(
                span,
                format!("`{}` declares more than one variable", pipe),
            )),
        }
    }

    fn check_assignment(&self, name: &str, ty: TypeId, span: Span) -> Result<(), TransformError> {
        let types = &self.env.types;

        match self.scopes.find_variable(name) {
            None => Err(TransformError::type_resolution(
                span,
                format!("assignment to undeclared variable `{}`", name),
            )),

            Some(existing) if existing != ty && !types.is_dynamic(existing) => {
                Err(TransformError::type_resolution(
                    span,
                    format!(
                        "can't assign a value of type `{}` to `{}`, which has type `{}`",
                        types.type_name(ty),
                        name,
                        types.type_name(existing)
                    ),
                ))
            },

            Some(_) => Ok(()),
        }
    }

    fn check_range(&mut self, branch: &Branch, span: Span) -> Result<(), TransformError> {
        let operand = self.range_operand(&branch.pipe, span)?;
        let outer_cursor = self.scopes.cursor();
        let types = &self.env.types;

        let (key, element) = types.range_types(operand).ok_or_else(|| {
            TransformError::type_resolution(
                span,
                format!(
                    "can't range over a value of type `{}`",
                    types.type_name(operand)
                ),
            )
        })?;

        if branch.pipe.is_assign {
            return Err(TransformError::structural(
                span,
                "assigning to variables from `range` is not supported",
            ));
        }

        self.scopes.push(element);

        match branch.pipe.decl.as_slice() {
            [] => {},
            [value] => self.scopes.add_variable(value, element),

            [index, value] => {
                self.scopes.add_variable(index, key);
                self.scopes.add_variable(value, element);
            },

            _ => {
                return Err(TransformError::structural(
                    span,
                    "`range` declares at most two variables",
                ))
            },
        }

        self.check_list(&branch.list)?;
        self.scopes.leave();

        // The else branch runs with the outer cursor
        if let Some(else_list) = &branch.else_list {
            self.scopes.push(outer_cursor);
            self.check_list(else_list)?;
            self.scopes.leave();
        }

        Ok(())
    }

    fn check_with(&mut self, branch: &Branch, span: Span) -> Result<(), TransformError> {
        let operand = self.pipe_type(&branch.pipe, span)?;
        let outer_cursor = self.scopes.cursor();

        if branch.pipe.is_assign || branch.pipe.decl.len() > 1 {
            return Err(TransformError::structural(
                span,
                "`with` declares at most one variable",
            ));
        }

        let declared = branch.pipe.decl.first();

        self.scopes.push(operand);
        if let Some(name) = declared {
            self.scopes.add_variable(name, operand);
        }

        self.check_list(&branch.list)?;
        self.scopes.leave();

        if let Some(else_list) = &branch.else_list {
            self.scopes.push(outer_cursor);
            if let Some(name) = declared {
                self.scopes.add_variable(name, operand);
            }

            self.check_list(else_list)?;
            self.scopes.leave();
        }

        Ok(())
    }

    fn range_operand(&self, pipe: &Pipe, span: Span) -> Result<TypeId, TransformError> {
        let operand = match pipe.cmds.as_slice() {
            [cmd] => match cmd.args.as_slice() {
                [arg @ Arg::Variable(_)] | [arg @ Arg::Dot] => Some(arg),
                _ => None,
            },
            _ => None,
        };

        match operand {
            Some(Arg::Variable(var)) => self.variable_path_type(var, span),
            Some(_) => Ok(self.scopes.cursor()),

            None => Err(TransformError::type_resolution(
                span,
                format!("`range` expects a variable or `.`, found `{}`", pipe),
            )),
        }
    }

    fn pipe_type(&self, pipe: &Pipe, span: Span) -> Result<TypeId, TransformError> {
        match pipe.cmds.as_slice() {
            [cmd] => self.command_type(cmd, span),

            _ => Err(TransformError::structural(
                span,
                format!(
                    "expected a single command in `{}`; simplify the tree first",
                    pipe
                ),
            )),
        }
    }

    /// The type a command evaluates to. Arguments after the head are
    /// passed to a method or function and don't change the result type.
    fn command_type(&self, cmd: &Command, span: Span) -> Result<TypeId, TransformError> {
        match cmd.head() {
            Some(Arg::Field(segments)) => self.path_type(self.scopes.cursor(), segments, span),
            Some(Arg::Variable(var)) => self.variable_path_type(var, span),
            Some(Arg::Dot) => Ok(self.scopes.cursor()),
            Some(Arg::Identifier(name)) => self.function_type(name, span),
            Some(Arg::Literal(literal)) => literal_type(literal, span),
            Some(Arg::Pipe(inner)) => self.pipe_type(inner, span),
            None => Err(TransformError::structural(span, "empty command")),
        }
    }

    fn variable_path_type(&self, var: &Variable, span: Span) -> Result<TypeId, TransformError> {
        let base = self.scopes.find_variable(&var.name).ok_or_else(|| {
            TransformError::type_resolution(span, format!("undefined variable `{}`", var.name))
        })?;

        self.path_type(base, &var.fields, span)
    }

    fn path_type(
        &self,
        base: TypeId,
        segments: &[String],
        span: Span,
    ) -> Result<TypeId, TransformError> {
        self.env
            .types
            .walk_path(base, segments)
            .map(|res| res.ty)
            .map_err(|message| TransformError::type_resolution(span, message))
    }

    fn function_type(&self, name: &str, span: Span) -> Result<TypeId, TransformError> {
        match self.env.functions.get(name) {
            Some(signature) => signature.output(&self.env.types).map_err(|message| {
                TransformError::type_resolution(span, format!("function `{}` {}", name, message))
            }),

            None if name == self.lookup_function => Ok(DYNAMIC),

            None => Err(TransformError::type_resolution(
                span,
                format!("unknown function `{}`", name),
            )),
        }
    }
}

fn literal_type(literal: &Literal, span: Span) -> Result<TypeId, TransformError> {
    match literal {
        Literal::String(_) => Ok(STRING),
        Literal::Bool(_) => Ok(BOOL),
        Literal::Number(text) => number_type(text, span),

        Literal::Nil => Err(TransformError::type_resolution(
            span,
            "`nil` has no type and can't be bound to a variable",
        )),
    }
}

/// Integer or float, following the template language's number syntax.
fn number_type(text: &str, span: Span) -> Result<TypeId, TransformError> {
    let unsigned = text.trim_start_matches(|c| c == '+' || c == '-');
    let lower = unsigned.to_ascii_lowercase();

    if lower.ends_with('i') {
        return Err(TransformError::type_resolution(
            span,
            format!("complex number `{}` is not supported", text),
        ));
    }

    // Hex floats need a `p` exponent, which `f64::from_str` doesn't accept
    let is_hex = lower.starts_with("0x");
    let is_hex_float = is_hex && lower.contains('p');

    let is_int = unsigned.starts_with('\'')
        || (is_hex && !is_hex_float)
        || lower.starts_with("0o")
        || lower.starts_with("0b")
        || (!unsigned.is_empty() && unsigned.chars().all(|c| c.is_ascii_digit() || c == '_'));

    if is_int {
        Ok(INT)
    } else if is_hex_float || lower.replace('_', "").parse::<f64>().is_ok() {
        Ok(FLOAT)
    } else {
        Err(TransformError::type_resolution(
            span,
            format!("`{}` is not a number", text),
        ))
    }
}
