mod builder;
mod span;

use thiserror::Error;

pub use self::builder::DiagnosticBuilder;
pub use self::span::Span;

#[derive(Clone, Copy)]
enum Level {
    ICE,
    Error,
    Help,
    Note,
}

pub struct DiagnosticsContext<'src> {
    source: &'src str,
    origin: Option<String>,
    color: bool,
}

impl<'src> DiagnosticsContext<'src> {
    pub fn new(source: &'src str, origin: Option<String>) -> Self {
        Self {
            source,
            origin,
            color: true,
        }
    }

    /// Renders diagnostics as plain text.
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn build_ice(&self, message: impl ToString) -> DiagnosticBuilder {
        DiagnosticBuilder::new(message.to_string(), Level::ICE, self)
            .note("this is an internal error")
            .note("one of the rewrite rules left the tree in a state it can't handle")
    }

    pub fn build_ice_span(&self, span: Span, message: impl ToString) -> DiagnosticBuilder {
        self.build_ice(message).with_span(span)
    }

    pub fn build_error(&self, message: impl ToString) -> DiagnosticBuilder {
        DiagnosticBuilder::new(message.to_string(), Level::Error, self)
    }

    pub fn build_error_span(&self, span: Span, message: impl ToString) -> DiagnosticBuilder {
        self.build_error(message).with_span(span)
    }
}

/// Everything that can stop the pipeline. Every error is fatal:
/// the tree is left in whatever state the failing pass reached.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransformError {
    /// The tree has a shape the passes don't support.
    #[error("unsupported template structure: {message}")]
    Structural { message: String, span: Span },

    /// A rewrite couldn't find something an earlier check promised.
    #[error("invariant violated while rewriting: {message}")]
    InvariantViolation { message: String, span: Span },

    #[error("couldn't resolve type: {message}")]
    TypeResolution { message: String, span: Span },
}

impl TransformError {
    pub(crate) fn structural(span: Span, message: impl ToString) -> Self {
        Self::Structural {
            message: message.to_string(),
            span,
        }
    }

    pub(crate) fn invariant(span: Span, message: impl ToString) -> Self {
        Self::InvariantViolation {
            message: message.to_string(),
            span,
        }
    }

    pub(crate) fn type_resolution(span: Span, message: impl ToString) -> Self {
        Self::TypeResolution {
            message: message.to_string(),
            span,
        }
    }

    /// The span of the list-level node that was being processed.
    pub fn span(&self) -> Span {
        match self {
            Self::Structural { span, .. }
            | Self::InvariantViolation { span, .. }
            | Self::TypeResolution { span, .. } => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Structural { message, .. }
            | Self::InvariantViolation { message, .. }
            | Self::TypeResolution { message, .. } => message,
        }
    }

    fn diagnostic<'ctx>(&self, ctx: &'ctx DiagnosticsContext<'ctx>) -> DiagnosticBuilder<'ctx, 'ctx> {
        match self {
            Self::Structural { message, span } => ctx
                .build_error_span(*span, "unsupported template structure")
                .span_label(*span, message)
                .help("only text, actions, `if`, `range`, `with` and `template` are supported"),

            Self::InvariantViolation { message, span } => ctx.build_ice_span(*span, message),

            Self::TypeResolution { message, span } => ctx
                .build_error_span(*span, "couldn't resolve type")
                .span_label(*span, message),
        }
    }

    /// Renders this error as a plain text diagnostic pointing into `source`.
    pub fn render(&self, source: &str, origin: Option<String>) -> String {
        let ctx = DiagnosticsContext::new(source, origin).without_color();
        self.diagnostic(&ctx).render()
    }

    /// Prints this error as a colored diagnostic to stderr.
    pub fn emit(&self, source: &str, origin: Option<String>) {
        let ctx = DiagnosticsContext::new(source, origin);
        self.diagnostic(&ctx).emit();
    }
}
