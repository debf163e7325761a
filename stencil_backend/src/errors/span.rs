use std::ops::Range;

/// Represents a highlighted span in the template source.
/// Nodes synthesized by the passes borrow the span of the
/// node they were split out of.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create an empty span that highlights nothing.
    pub const fn empty() -> Self {
        Self {
            start: 0,
            length: 0,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// Shrinks this span so it lies within a source of `len` bytes.
    /// Trees are sometimes built by hand or against a different
    /// source than the one used for reporting, so spans can't be
    /// trusted to be in bounds.
    pub fn clamp_to(self, len: usize) -> Self {
        let start = self.start.min(len);
        let end = self.end().min(len);
        Self::new(start, end - start)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end()
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end.saturating_sub(range.start))
    }
}
