//! Error types for compiling and rendering templates

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::{Lexeme, Token};

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Rejection of malformed template source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("unrecognised input {text:?} at {span:?}")]
    Lex { span: Span, text: String },
}

impl CompileError {
    pub fn span(&self) -> &Span {
        match self {
            CompileError::Syntax { span, .. } | CompileError::Lex { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let (span, message, detail) = match self {
            CompileError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (span, message.clone(), format!("{}{}", message, expected_str))
            }
            CompileError::Lex { span, text } => (
                span,
                format!("Unrecognised input '{}'", text),
                "not valid template code".to_string(),
            ),
        };

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(message)
            .with_label(
                Label::new((filename, span.clone()))
                    .with_message(detail)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Lexeme>> for CompileError {
    fn from(err: chumsky::error::Rich<'a, Lexeme>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_lexeme(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        // Format expected tokens nicely
        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_lexeme(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        CompileError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a lexeme for human-readable error messages
fn format_lexeme(lexeme: &Lexeme) -> String {
    match lexeme {
        Lexeme::Code(tok) => format_token(tok),
        Lexeme::Text(_) => "template text".to_string(),
        Lexeme::EscapeOpen => "'{{'".to_string(),
        Lexeme::EscapeClose => "'}}'".to_string(),
        Lexeme::InterpolateOpen => "'{{{'".to_string(),
        Lexeme::InterpolateClose => "'}}}'".to_string(),
    }
}

fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::BraceOpen => "'{'".to_string(),
        Token::BraceClose => "'}'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Semicolon => "';'".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::If => "keyword 'if'".to_string(),
        Token::Else => "keyword 'else'".to_string(),
        Token::Var => "variable declaration".to_string(),
        Token::Function => "keyword 'function'".to_string(),
        _ => format!("{:?}", tok),
    }
}

/// Failure while evaluating a compiled template against data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{name} is not defined")]
    UndefinedVariable { name: String, span: Span },

    #[error("cannot read property '{property}' of null or undefined")]
    NullAccess { property: String, span: Span },

    #[error("{name} is not a function")]
    UnknownFunction { name: String, span: Span },

    #[error("{function} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
        span: Span,
    },
}
