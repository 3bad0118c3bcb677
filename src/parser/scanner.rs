//! Splits template source into literal text and delimited blocks

use super::ast::Span;
use super::settings::{Delimiter, TemplateSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Text,
    Evaluate,
    Interpolate,
    Escape,
}

/// A run of literal text or the body of one delimited block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub kind: ChunkKind,
    /// Body without delimiters
    pub text: &'a str,
    /// Byte range of `text` in the source
    pub span: Span,
    /// Byte range including delimiters
    pub outer: Span,
}

/// Scan `source` left to right.
///
/// At each position escape is tried first, then interpolate, then evaluate;
/// the first match wins. Openers without a matching close are plain text.
pub fn scan<'a>(source: &'a str, settings: &TemplateSettings) -> Vec<Chunk<'a>> {
    let mut chunks = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;

    while pos < source.len() {
        match block_at(source, pos, settings) {
            Some(chunk) => {
                if text_start < pos {
                    chunks.push(text_chunk(source, text_start..pos));
                }
                pos = chunk.outer.end;
                text_start = pos;
                chunks.push(chunk);
            }
            None => pos += source[pos..].chars().next().map_or(1, char::len_utf8),
        }
    }

    if text_start < source.len() {
        chunks.push(text_chunk(source, text_start..source.len()));
    }

    chunks
}

fn text_chunk(source: &str, span: Span) -> Chunk<'_> {
    Chunk {
        kind: ChunkKind::Text,
        text: &source[span.clone()],
        span: span.clone(),
        outer: span,
    }
}

fn block_at<'a>(source: &'a str, pos: usize, settings: &TemplateSettings) -> Option<Chunk<'a>> {
    escape_at(source, pos, settings.escape())
        .map(|found| (ChunkKind::Escape, found))
        .or_else(|| {
            lazy_block_at(source, pos, settings.interpolate())
                .map(|found| (ChunkKind::Interpolate, found))
        })
        .or_else(|| {
            lazy_block_at(source, pos, settings.evaluate()).map(|found| (ChunkKind::Evaluate, found))
        })
        .map(|(kind, (body, end))| Chunk {
            kind,
            text: &source[body.clone()],
            span: body,
            outer: pos..end,
        })
}

/// `open`, a non-empty body, then the first `close` after it.
fn lazy_block_at(source: &str, pos: usize, delimiter: Delimiter) -> Option<(Span, usize)> {
    if !source[pos..].starts_with(delimiter.open()) {
        return None;
    }
    let body_start = pos + delimiter.open().len();
    let first = source[body_start..].chars().next()?;
    let search_from = body_start + first.len_utf8();
    let body_end = search_from + source[search_from..].find(delimiter.close())?;
    Some((body_start..body_end, body_end + delimiter.close().len()))
}

/// `open`, a non-empty body free of the closing character, then `close`
/// not directly followed by another closing character.
fn escape_at(source: &str, pos: usize, delimiter: Delimiter) -> Option<(Span, usize)> {
    if !source[pos..].starts_with(delimiter.open()) {
        return None;
    }
    let stop = delimiter.close().chars().next()?;
    let body_start = pos + delimiter.open().len();
    let body_end = body_start + source[body_start..].find(stop)?;
    if body_end == body_start || !source[body_end..].starts_with(delimiter.close()) {
        return None;
    }
    let end = body_end + delimiter.close().len();
    if source[end..].starts_with(stop) {
        return None;
    }
    Some((body_start..body_end, end))
}
