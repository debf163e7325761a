use annotate_snippets::{
    display_list::{DisplayList, FormatOptions},
    snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation},
};

use super::{span::Span, DiagnosticsContext, Level};

impl From<Level> for AnnotationType {
    fn from(level: Level) -> Self {
        match level {
            Level::ICE | Level::Error => AnnotationType::Error,
            Level::Help => AnnotationType::Help,
            Level::Note => AnnotationType::Note,
        }
    }
}

/// A highlighted region of the template source.
struct Marker {
    span: Span,
    text: Option<String>,
}

/// A `help:` or `note:` line printed under the source.
struct Footer {
    level: Level,
    text: String,
}

#[must_use = "must render or emit the diagnostic for it to be seen"]
pub struct DiagnosticBuilder<'ctx, 'src> {
    title: String,
    level: Level,
    markers: Vec<Marker>,
    footers: Vec<Footer>,
    context: &'ctx DiagnosticsContext<'src>,
}

impl<'ctx, 'src> DiagnosticBuilder<'ctx, 'src> {
    pub(super) fn new(
        title: String,
        level: Level,
        context: &'ctx DiagnosticsContext<'src>,
    ) -> Self {
        Self {
            title,
            level,
            markers: Vec::new(),
            footers: Vec::new(),
            context,
        }
    }

    fn mark(mut self, span: Span, text: Option<String>) -> Self {
        // An empty span would point at the start of the source for no reason
        if !span.is_empty() {
            self.markers.push(Marker { span, text });
        }

        self
    }

    fn footer(mut self, level: Level, text: impl ToString) -> Self {
        self.footers.push(Footer {
            level,
            text: text.to_string(),
        });
        self
    }

    /// Highlight `span` with a message, using the diagnostic's own level.
    pub fn span_label(self, span: Span, message: impl ToString) -> Self {
        self.mark(span, Some(message.to_string()))
    }

    /// Highlight `span` without a message.
    pub fn with_span(self, span: Span) -> Self {
        self.mark(span, None)
    }

    pub fn help(self, message: impl ToString) -> Self {
        self.footer(Level::Help, message)
    }

    pub fn note(self, message: impl ToString) -> Self {
        self.footer(Level::Note, message)
    }

    pub fn render(self) -> String {
        let source = self.context.source;
        let annotation_type = AnnotationType::from(self.level);

        // Trees edited by the passes or built by hand can carry stale spans
        let annotations = self
            .markers
            .iter()
            .filter_map(|marker| {
                let span = marker.span.clamp_to(source.len());
                (!span.is_empty()).then(|| SourceAnnotation {
                    label: marker.text.as_deref().unwrap_or(""),
                    range: (span.start, span.end()),
                    annotation_type,
                })
            })
            .collect::<Vec<_>>();

        let slices = if source.is_empty() {
            Vec::new()
        } else {
            vec![Slice {
                source,
                line_start: 1,
                origin: self.context.origin.as_deref(),
                fold: true,
                annotations,
            }]
        };

        let footer = self
            .footers
            .iter()
            .map(|footer| Annotation {
                label: Some(&footer.text),
                id: None,
                annotation_type: footer.level.into(),
            })
            .collect();

        let snippet = Snippet {
            title: Some(Annotation {
                label: Some(&self.title),
                id: None,
                annotation_type,
            }),
            footer,
            slices,
            opt: FormatOptions {
                color: self.context.color,
                ..Default::default()
            },
        };

        DisplayList::from(snippet).to_string()
    }

    pub fn emit(self) {
        eprintln!("{}", self.render());
    }
}
