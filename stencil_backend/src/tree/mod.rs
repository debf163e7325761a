//! The parsed template tree the passes operate on.
//!
//! List-level nodes ([`Node`]) carry the [`Span`] they were parsed from;
//! expressions ([`Pipe`], [`Command`], [`Arg`]) don't. The [`Display`]
//! implementations print the tree back in template syntax, so a
//! transformed tree can be compared against the text it should read as.
//!
//! [`Display`]: std::fmt::Display

#[cfg(test)]
mod tests;

use std::fmt;

use crate::errors::Span;

/// The name of the root cursor variable. It can't be declared or renamed.
pub const ROOT_VARIABLE: &str = "$";

/// One parsed template: either the main tree or a `define`d sub-template.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub name: String,
    pub root: List,
}

impl Template {
    pub fn new(name: impl ToString, nodes: Vec<Node>) -> Self {
        Self {
            name: name.to_string(),
            root: List::new(nodes),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// A contiguous body of nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub nodes: Vec<Node>,
}

impl List {
    pub const fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{}", node)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Text(String),
    /// `{{pipe}}`. Prints its value unless the pipe declares or assigns.
    Action(Pipe),
    If(Branch),
    Range(Branch),
    With(Branch),
    /// `{{template "name" pipe}}`
    Template(TemplateCall),
}

/// The shared shape of `if`, `range` and `with`.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub pipe: Pipe,
    pub list: List,
    pub else_list: Option<List>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TemplateCall {
    pub name: String,
    pub pipe: Option<Pipe>,
}

impl Node {
    pub const fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn text(text: impl ToString) -> Self {
        Self::new(NodeKind::Text(text.to_string()), Span::empty())
    }

    pub fn action(pipe: Pipe) -> Self {
        Self::new(NodeKind::Action(pipe), Span::empty())
    }

    pub fn if_(pipe: Pipe, list: Vec<Node>, else_list: Option<Vec<Node>>) -> Self {
        Self::new(NodeKind::If(Branch::new(pipe, list, else_list)), Span::empty())
    }

    pub fn range(pipe: Pipe, list: Vec<Node>, else_list: Option<Vec<Node>>) -> Self {
        Self::new(
            NodeKind::Range(Branch::new(pipe, list, else_list)),
            Span::empty(),
        )
    }

    pub fn with(pipe: Pipe, list: Vec<Node>, else_list: Option<Vec<Node>>) -> Self {
        Self::new(
            NodeKind::With(Branch::new(pipe, list, else_list)),
            Span::empty(),
        )
    }

    pub fn template(name: impl ToString, pipe: Option<Pipe>) -> Self {
        Self::new(
            NodeKind::Template(TemplateCall {
                name: name.to_string(),
                pipe,
            }),
            Span::empty(),
        )
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The pipe controlling this node, if it has one.
    pub fn pipe(&self) -> Option<&Pipe> {
        match &self.kind {
            NodeKind::Text(_) => None,
            NodeKind::Action(pipe) => Some(pipe),
            NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
                Some(&branch.pipe)
            },
            NodeKind::Template(call) => call.pipe.as_ref(),
        }
    }

    pub fn pipe_mut(&mut self) -> Option<&mut Pipe> {
        match &mut self.kind {
            NodeKind::Text(_) => None,
            NodeKind::Action(pipe) => Some(pipe),
            NodeKind::If(branch) | NodeKind::Range(branch) | NodeKind::With(branch) => {
                Some(&mut branch.pipe)
            },
            NodeKind::Template(call) => call.pipe.as_mut(),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Text(text) => write!(f, "{}", text),
            NodeKind::Action(pipe) => write!(f, "{{{{{}}}}}", pipe),
            NodeKind::If(branch) => branch.fmt_with_keyword(f, "if"),
            NodeKind::Range(branch) => branch.fmt_with_keyword(f, "range"),
            NodeKind::With(branch) => branch.fmt_with_keyword(f, "with"),

            NodeKind::Template(call) => match &call.pipe {
                Some(pipe) => write!(f, "{{{{template {:?} {}}}}}", call.name, pipe),
                None => write!(f, "{{{{template {:?}}}}}", call.name),
            },
        }
    }
}

impl Branch {
    pub fn new(pipe: Pipe, list: Vec<Node>, else_list: Option<Vec<Node>>) -> Self {
        Self {
            pipe,
            list: List::new(list),
            else_list: else_list.map(List::new),
        }
    }

    fn fmt_with_keyword(&self, f: &mut fmt::Formatter<'_>, keyword: &str) -> fmt::Result {
        write!(f, "{{{{{} {}}}}}{}", keyword, self.pipe, self.list)?;

        if let Some(else_list) = &self.else_list {
            write!(f, "{{{{else}}}}{}", else_list)?;
        }

        write!(f, "{{{{end}}}}")
    }
}

/// A pipeline: optional variable declarations followed by
/// commands chained with `|`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipe {
    /// Declared (or assigned) variable names, including the `$`.
    pub decl: Vec<String>,
    /// `$x = ...` rather than `$x := ...`
    pub is_assign: bool,
    pub cmds: Vec<Command>,
}

impl Pipe {
    pub const fn new(cmds: Vec<Command>) -> Self {
        Self {
            decl: Vec::new(),
            is_assign: false,
            cmds,
        }
    }

    pub fn declare(names: &[&str], cmds: Vec<Command>) -> Self {
        Self {
            decl: names.iter().map(|name| name.to_string()).collect(),
            is_assign: false,
            cmds,
        }
    }

    pub fn assign(names: &[&str], cmds: Vec<Command>) -> Self {
        Self {
            is_assign: true,
            ..Self::declare(names, cmds)
        }
    }

    /// A pipe that declares `name` as the single command `cmd`.
    pub fn binding(name: impl ToString, cmds: Vec<Command>) -> Self {
        Self {
            decl: vec![name.to_string()],
            is_assign: false,
            cmds,
        }
    }

    /// The first argument of the first command.
    pub fn head(&self) -> Option<&Arg> {
        self.cmds.first().and_then(Command::head)
    }
}

impl fmt::Display for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.decl.is_empty() {
            write!(f, "{}", self.decl.join(", "))?;
            let operator = if self.is_assign { "=" } else { ":=" };
            write!(f, " {} ", operator)?;
        }

        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }

            write!(f, "{}", cmd)?;
        }

        Ok(())
    }
}

/// A function, method or value applied to its arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Command {
    pub args: Vec<Arg>,
}

impl Command {
    pub const fn new(args: Vec<Arg>) -> Self {
        Self { args }
    }

    pub fn head(&self) -> Option<&Arg> {
        self.args.first()
    }

    /// Whether this command calls a function by name.
    pub fn is_call(&self) -> bool {
        matches!(self.head(), Some(Arg::Identifier(_)))
    }

    /// Whether this command is a lone value that takes no arguments,
    /// meaning it can be moved into the next command as its last argument.
    pub fn is_single_operand(&self) -> bool {
        match self.args.as_slice() {
            [arg] => matches!(
                arg,
                Arg::Variable(_) | Arg::Literal(_) | Arg::Dot | Arg::Field(_)
            ),
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            write!(f, "{}", arg)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// A parenthesized pipeline.
    Pipe(Pipe),
    Variable(Variable),
    /// `.A.B`, stored without the dots.
    Field(Vec<String>),
    /// A function name.
    Identifier(String),
    Literal(Literal),
    /// The cursor, `.`
    Dot,
}

impl Arg {
    /// Parses `$name.Field.Field` into a variable reference.
    pub fn var(path: &str) -> Self {
        let mut segments = path.split('.');
        let name = segments.next().unwrap_or_default().to_owned();

        Self::Variable(Variable {
            name,
            fields: segments.map(str::to_owned).collect(),
        })
    }

    /// Parses `.A.B` (or `A.B`) into a field path.
    pub fn field(path: &str) -> Self {
        Self::Field(
            path.trim_start_matches('.')
                .split('.')
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn ident(name: impl ToString) -> Self {
        Self::Identifier(name.to_string())
    }

    pub fn string(value: impl ToString) -> Self {
        Self::Literal(Literal::String(value.to_string()))
    }

    pub fn number(text: impl ToString) -> Self {
        Self::Literal(Literal::Number(text.to_string()))
    }

    pub const fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    pub const fn nil() -> Self {
        Self::Literal(Literal::Nil)
    }

    pub const fn pipe(pipe: Pipe) -> Self {
        Self::Pipe(pipe)
    }

    /// A multi-segment path: a field path, or a variable with fields.
    pub fn is_path(&self) -> bool {
        match self {
            Arg::Field(_) => true,
            Arg::Variable(var) => !var.fields.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Pipe(pipe) => write!(f, "({})", pipe),
            Arg::Variable(var) => write!(f, "{}", var),

            Arg::Field(segments) => {
                for segment in segments {
                    write!(f, ".{}", segment)?;
                }

                Ok(())
            },

            Arg::Identifier(name) => write!(f, "{}", name),
            Arg::Literal(literal) => write!(f, "{}", literal),
            Arg::Dot => write!(f, "."),
        }
    }
}

/// A variable reference with an optional field path, `$x.A.B`.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    /// Includes the leading `$`.
    pub name: String,
    pub fields: Vec<String>,
}

impl Variable {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_VARIABLE
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;

        for field in &self.fields {
            write!(f, ".{}", field)?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(String),
    /// Kept as written; `1`, `-2.5` and `0x1F` are all numbers.
    Number(String),
    Bool(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(value) => write!(f, "{:?}", value),
            Literal::Number(text) => write!(f, "{}", text),
            Literal::Bool(value) => write!(f, "{}", value),
            Literal::Nil => write!(f, "nil"),
        }
    }
}
