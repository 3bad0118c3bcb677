//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{lex_template, Lexeme, Token};
use crate::parser::settings::TemplateSettings;

/// Postfix operations applied left to right after an atom
#[derive(Debug, Clone)]
enum Postfix {
    Member(Identifier),
    Index(Spanned<Expr>),
    Call(Vec<Spanned<Expr>>),
}

/// Parse template source into a program
pub fn parse(input: &str, settings: &TemplateSettings) -> Result<Program, Vec<crate::CompileError>> {
    let len = input.len();

    let lexemes = lex_template(input, settings).map_err(|e| vec![e])?;
    let token_iter = lexemes.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Lexeme, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    program_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Match a single code token
fn tok<'a, I>(t: Token) -> impl Parser<'a, I, Lexeme, extra::Err<Rich<'a, Lexeme>>> + Clone
where
    I: ValueInput<'a, Token = Lexeme, Span = SimpleSpan>,
{
    just(Lexeme::Code(t))
}

/// Match a specific identifier such as `_` or `print`
fn word<'a, I>(name: &str) -> impl Parser<'a, I, Lexeme, extra::Err<Rich<'a, Lexeme>>> + Clone
where
    I: ValueInput<'a, Token = Lexeme, Span = SimpleSpan>,
{
    just(Lexeme::Code(Token::Ident(name.to_string())))
}

fn binary(lhs: Spanned<Expr>, (op, rhs): (BinaryOp, Spanned<Expr>)) -> Spanned<Expr> {
    let span = lhs.span.start..rhs.span.end;
    Spanned::new(Expr::Binary(op, Box::new(lhs), Box::new(rhs)), span)
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Lexeme>>> + Clone
where
    I: ValueInput<'a, Token = Lexeme, Span = SimpleSpan>,
{
    let identifier = select! {
        Lexeme::Code(Token::Ident(s)) => Identifier::new(s),
    };

    recursive(|expr| {
        let literal = select! {
            Lexeme::Code(Token::Number(n)) => Literal::Number(n),
            Lexeme::Code(Token::String(s)) => Literal::String(s),
            Lexeme::Code(Token::True) => Literal::Bool(true),
            Lexeme::Code(Token::False) => Literal::Bool(false),
            Lexeme::Code(Token::Null) => Literal::Null,
            Lexeme::Code(Token::Undefined) => Literal::Undefined,
        }
        .map_with(|lit, e| Spanned::new(Expr::Literal(lit), span_range(&e.span())));

        let array = expr
            .clone()
            .separated_by(tok(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(tok(Token::BracketOpen), tok(Token::BracketClose))
            .map_with(|items, e| Spanned::new(Expr::Array(items), span_range(&e.span())));

        let variable = identifier
            .clone()
            .map_with(|id, e| Spanned::new(Expr::Var(id), span_range(&e.span())));

        let atom = choice((
            literal,
            array,
            variable,
            expr.clone()
                .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose)),
        ));

        // a.b, a[b], a(b, c)
        let postfix_op = choice((
            tok(Token::Dot)
                .ignore_then(identifier.clone())
                .map(Postfix::Member),
            expr.clone()
                .delimited_by(tok(Token::BracketOpen), tok(Token::BracketClose))
                .map(Postfix::Index),
            expr.clone()
                .separated_by(tok(Token::Comma))
                .collect::<Vec<_>>()
                .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose))
                .map(Postfix::Call),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let postfix = atom
            .foldl(postfix_op.repeated(), |lhs: Spanned<Expr>, (op, op_span)| {
                let span = lhs.span.start..op_span.end;
                let node = match op {
                    Postfix::Member(name) => Expr::Member(Box::new(lhs), name),
                    Postfix::Index(index) => Expr::Index(Box::new(lhs), Box::new(index)),
                    Postfix::Call(args) => Expr::Call {
                        callee: Box::new(lhs),
                        args,
                    },
                };
                Spanned::new(node, span)
            })
            .boxed();

        let unary_op = choice((
            tok(Token::Bang).to(UnaryOp::Not),
            tok(Token::Minus).to(UnaryOp::Neg),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let unary = unary_op
            .repeated()
            .foldr(postfix, |(op, op_span), rhs: Spanned<Expr>| {
                let span = op_span.start..rhs.span.end;
                Spanned::new(Expr::Unary(op, Box::new(rhs)), span)
            })
            .boxed();

        let product = unary.clone().foldl(
            choice((
                tok(Token::Star).to(BinaryOp::Mul),
                tok(Token::Slash).to(BinaryOp::Div),
                tok(Token::Percent).to(BinaryOp::Rem),
            ))
            .then(unary)
            .repeated(),
            binary,
        );

        let sum = product
            .clone()
            .foldl(
                choice((
                    tok(Token::Plus).to(BinaryOp::Add),
                    tok(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated(),
                binary,
            )
            .boxed();

        let comparison = sum.clone().foldl(
            choice((
                tok(Token::LessOrEqual).to(BinaryOp::Le),
                tok(Token::GreaterOrEqual).to(BinaryOp::Ge),
                tok(Token::Less).to(BinaryOp::Lt),
                tok(Token::Greater).to(BinaryOp::Gt),
            ))
            .then(sum)
            .repeated(),
            binary,
        );

        let equality = comparison
            .clone()
            .foldl(
                choice((
                    tok(Token::StrictEq).to(BinaryOp::StrictEq),
                    tok(Token::StrictNe).to(BinaryOp::StrictNe),
                    tok(Token::LooseEq).to(BinaryOp::LooseEq),
                    tok(Token::LooseNe).to(BinaryOp::LooseNe),
                ))
                .then(comparison)
                .repeated(),
                binary,
            )
            .boxed();

        let and = equality.clone().foldl(
            tok(Token::And).to(BinaryOp::And).then(equality).repeated(),
            binary,
        );

        let or = and
            .clone()
            .foldl(tok(Token::Or).to(BinaryOp::Or).then(and).repeated(), binary)
            .boxed();

        // cond ? then : otherwise
        or.then(
            tok(Token::Question)
                .ignore_then(expr.clone())
                .then_ignore(tok(Token::Colon))
                .then(expr.clone())
                .or_not(),
        )
        .map(|(cond, branches)| match branches {
            None => cond,
            Some((then, otherwise)) => {
                let span = cond.span.start..otherwise.span.end;
                Spanned::new(
                    Expr::Conditional {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    },
                    span,
                )
            }
        })
    })
}

fn program_parser<'a, I>() -> impl Parser<'a, I, Program, extra::Err<Rich<'a, Lexeme>>> + Clone
where
    I: ValueInput<'a, Token = Lexeme, Span = SimpleSpan>,
{
    let identifier = select! {
        Lexeme::Code(Token::Ident(s)) => Identifier::new(s),
    };
    let expr = expr_parser();
    let semicolon = tok(Token::Semicolon).or_not();

    // Recursive statement parser
    let statement = recursive(|stmt| {
        let block = stmt
            .clone()
            .repeated()
            .collect::<Vec<_>>()
            .delimited_by(tok(Token::BraceOpen), tok(Token::BraceClose));

        let text = select! {
            Lexeme::Text(s) => Stmt::Text(s),
        };

        let escape = expr
            .clone()
            .delimited_by(just(Lexeme::EscapeOpen), just(Lexeme::EscapeClose))
            .map(|expr| Stmt::Emit { expr, escape: true });

        let interpolate = expr
            .clone()
            .delimited_by(just(Lexeme::InterpolateOpen), just(Lexeme::InterpolateClose))
            .map(|expr| Stmt::Emit {
                expr,
                escape: false,
            });

        // if (cond) { ... } else if (cond) { ... } else { ... }
        let if_stmt = recursive(|if_stmt| {
            tok(Token::If)
                .ignore_then(
                    expr.clone()
                        .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose)),
                )
                .then(block.clone())
                .then(
                    tok(Token::Else)
                        .ignore_then(choice((
                            if_stmt.map_with(|s, e| {
                                vec![Spanned::new(s, span_range(&e.span()))]
                            }),
                            block.clone(),
                        )))
                        .or_not(),
                )
                .map(|((cond, then), otherwise)| Stmt::If {
                    cond,
                    then,
                    otherwise,
                })
        });

        // _.each(items, function(item, key) { ... });
        let each = word("_")
            .ignore_then(tok(Token::Dot))
            .ignore_then(word("each"))
            .ignore_then(
                expr.clone()
                    .then_ignore(tok(Token::Comma))
                    .then_ignore(tok(Token::Function))
                    .then(
                        identifier
                            .clone()
                            .then(tok(Token::Comma).ignore_then(identifier.clone()).or_not())
                            .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose)),
                    )
                    .then(block.clone())
                    .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose)),
            )
            .then_ignore(semicolon.clone())
            .map(|((items, (item, key)), body)| Stmt::Each {
                items,
                item,
                key,
                body,
            });

        let print = word("print")
            .ignore_then(
                expr.clone()
                    .delimited_by(tok(Token::ParenOpen), tok(Token::ParenClose)),
            )
            .then_ignore(semicolon.clone())
            .map(Stmt::Print);

        let let_stmt = tok(Token::Var)
            .ignore_then(identifier.clone())
            .then_ignore(tok(Token::Assign))
            .then(expr.clone())
            .then_ignore(semicolon.clone())
            .map(|(name, value)| Stmt::Let { name, value });

        let empty = tok(Token::Semicolon).to(Stmt::Empty);

        choice((
            text,
            escape,
            interpolate,
            if_stmt,
            each,
            print,
            let_stmt,
            empty,
        ))
        .map_with(|s, e| Spanned::new(s, span_range(&e.span())))
        .boxed()
    });

    // A template is a list of statements
    statement
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|body| Program { body })
}
