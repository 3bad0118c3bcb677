//! Lexer for template source using logos
//!
//! Code inside delimiters is tokenised with [`Token`]; the whole template is
//! flattened into a [`Lexeme`] stream where literal text and the boundaries of
//! `{{ }}` / `{{{ }}}` blocks appear as tokens of their own.

use logos::Logos;

use super::scanner::{scan, Chunk, ChunkKind};
use super::settings::TemplateSettings;
use crate::error::CompileError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("var")]
    #[token("let")]
    #[token("const")]
    Var,
    #[token("function")]
    Function,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Comparison operators (longer first)
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNe,
    #[token("==")]
    LooseEq,
    #[token("!=")]
    LooseNe,
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Logical operators
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Bang,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("=")]
    Assign,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    BlockComment,
}

/// Token stream element seen by the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme {
    /// Token from inside a delimited block
    Code(Token),
    /// Literal markup between blocks
    Text(String),
    EscapeOpen,
    EscapeClose,
    InterpolateOpen,
    InterpolateClose,
}

/// Strip quotes and resolve backslash escapes
fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Lex code with spans, failing on the first unrecognised character
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, CompileError> {
    let mut tokens = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => {
                return Err(CompileError::Lex {
                    text: input[span.clone()].to_string(),
                    span,
                })
            }
        }
    }
    Ok(tokens)
}

/// Flatten a whole template into lexemes with source spans
pub fn lex_template(
    source: &str,
    settings: &TemplateSettings,
) -> Result<Vec<(Lexeme, Span)>, CompileError> {
    let mut lexemes = Vec::new();

    for chunk in scan(source, settings) {
        match chunk.kind {
            ChunkKind::Text => {
                lexemes.push((Lexeme::Text(chunk.text.to_string()), chunk.span));
            }
            ChunkKind::Evaluate => lex_chunk(&chunk, &mut lexemes)?,
            ChunkKind::Interpolate => {
                lexemes.push((Lexeme::InterpolateOpen, chunk.outer.start..chunk.span.start));
                lex_chunk(&chunk, &mut lexemes)?;
                lexemes.push((Lexeme::InterpolateClose, chunk.span.end..chunk.outer.end));
            }
            ChunkKind::Escape => {
                lexemes.push((Lexeme::EscapeOpen, chunk.outer.start..chunk.span.start));
                lex_chunk(&chunk, &mut lexemes)?;
                lexemes.push((Lexeme::EscapeClose, chunk.span.end..chunk.outer.end));
            }
        }
    }

    Ok(lexemes)
}

fn lex_chunk(chunk: &Chunk<'_>, out: &mut Vec<(Lexeme, Span)>) -> Result<(), CompileError> {
    let offset = chunk.span.start;
    let shift = |span: Span| span.start + offset..span.end + offset;

    match lex(chunk.text) {
        Ok(tokens) => {
            out.extend(
                tokens
                    .into_iter()
                    .map(|(tok, span)| (Lexeme::Code(tok), shift(span))),
            );
            Ok(())
        }
        Err(CompileError::Lex { text, span }) => Err(CompileError::Lex {
            text,
            span: shift(span),
        }),
        Err(other) => Err(other),
    }
}
