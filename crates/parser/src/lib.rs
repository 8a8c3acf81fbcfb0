use std::sync::Arc;

use ast::{
    ast::{Literal, Node, TNode},
    trivia::{new, Range},
};
use errors::{AtomError, ParsingError};
use pest::{
    error::{Error, InputLocation},
    iterators::Pair,
    Parser,
};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "atom.pest"]
pub struct AtomParser;

/// Reads a whole program. Anything left over after the first complete
/// expression is an error.
pub fn parse<S>(src: S) -> Result<TNode, AtomError>
where
    S: AsRef<str>,
{
    let src = src.as_ref();
    let mut pairs = AtomParser::parse(Rule::program, src).map_err(parsing_error)?;

    let expr = pairs
        .next()
        .and_then(|program| {
            program
                .into_inner()
                .find(|pair| pair.as_rule() == Rule::expression)
        })
        .ok_or(ParsingError {
            start: 0,
            end: src.len(),
            message: "expected an expression".into(),
        })?;

    let node = build_expression(expr)?;
    tracing::trace!(span = ?node.span, "parsed program");

    Ok(node)
}

fn parsing_error(e: Error<Rule>) -> ParsingError {
    let (start, end) = match e.location {
        InputLocation::Pos(pos) => (pos, pos),
        InputLocation::Span(span) => span,
    };

    ParsingError {
        start,
        end,
        message: e.variant.message().as_ref().into(),
    }
}

fn span_of(pair: &Pair<'_, Rule>) -> Range {
    let span = pair.as_span();
    Range::new(span.start(), span.end())
}

fn build_expression(pair: Pair<'_, Rule>) -> Result<TNode, ParsingError> {
    let mut pairs = pair.into_inner();

    let mut node = match pairs.next() {
        Some(primary) => build_primary(primary)?,
        None => unreachable!("expression without a primary"),
    };

    // f(a)(b) is Apply(Apply(f, [a]), [b])
    for arguments in pairs {
        let span = node.span.join(span_of(&arguments));
        let args = arguments
            .into_inner()
            .map(build_expression)
            .collect::<Result<Vec<_>, _>>()?;

        node = new(Arc::new(Node::Apply(node, args)), span);
    }

    Ok(node)
}

fn build_primary(pair: Pair<'_, Rule>) -> Result<TNode, ParsingError> {
    let span = span_of(&pair);
    let node = match pair.as_rule() {
        Rule::string => {
            let quoted = pair.as_str();
            Node::Literal(Literal::String(quoted[1..quoted.len() - 1].into()))
        }
        Rule::number => {
            let number = pair.as_str().parse().map_err(|_| ParsingError {
                start: span.start,
                end: span.end,
                message: "malformed number".into(),
            })?;
            Node::Literal(Literal::Number(number))
        }
        Rule::word => Node::Word(pair.as_str().into()),
        _ => unreachable!(),
    };

    Ok(new(Arc::new(node), span))
}
