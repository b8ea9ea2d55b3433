use std::ops::Range;

/// A value paired with the bytes of template source it came from
pub type Spanned<T> = (T, Span);

/// Byte range in to template source
pub type Span = Range<usize>;

/// For errors that don't come from a template, such as bad context data
pub const NO_SPAN: Span = 0..0;

/// Limit a span to a source of `len` bytes
pub fn clamp(span: &Span, len: usize) -> Span {
    span.start.min(len)..span.end.min(len)
}
