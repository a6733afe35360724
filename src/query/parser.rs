//! Query text parser
//!
//! Grammar (whitespace insensitive):
//!
//! ```text
//! query      := head ":-" body_item ("," body_item)*
//! head       := NAME "(" [head_item ("," head_item)*] ")"
//! head_item  := sum | NAME
//! body_item  := NAME "=" sum | NAME "(" [term ("," term)*] ")" | term OP term
//! sum        := "SUM" "(" term ("*" term)* ")"
//! term       := 'string' | integer | NAME
//! ```
//!
//! The `s = SUM(...)` body form binds the aggregate to the head variable `s`,
//! which is then removed from the group-by variables.

use std::fs;
use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char as pchar, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, tuple},
    IResult,
};
use thiserror::Error;

use super::ast::{
    Atom, ComparisonAtom, ComparisonOp, Head, Query, RelationalAtom, SumAggregate, Term,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read query file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("query declares more than one SUM aggregate")]
    DuplicateAggregate,

    #[error("aggregate binding `{0}` does not name a head variable")]
    UnknownAggregateAlias(String),
}

enum HeadItem {
    Variable(String),
    Sum(SumAggregate),
}

enum BodyItem {
    Atom(Atom),
    SumBinding(String, SumAggregate),
}

/// Parses a query from text.
pub fn parse_query(text: &str) -> Result<Query, ParseError> {
    let (_, (name, head_items, body_items)) =
        all_consuming(query_parts)(text).map_err(|e| syntax_error(text, e))?;
    assemble(name, head_items, body_items)
}

/// Reads and parses a query file.
pub fn parse_query_file(path: &Path) -> Result<Query, ParseError> {
    let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_query(&text)
}

fn assemble(
    name: &str,
    head_items: Vec<HeadItem>,
    body_items: Vec<BodyItem>,
) -> Result<Query, ParseError> {
    let mut variables = Vec::new();
    let mut aggregate = None;

    for item in head_items {
        match item {
            HeadItem::Variable(v) => variables.push(v),
            HeadItem::Sum(sum) => {
                if aggregate.replace(sum).is_some() {
                    return Err(ParseError::DuplicateAggregate);
                }
            }
        }
    }

    let mut body = Vec::new();
    for item in body_items {
        match item {
            BodyItem::Atom(atom) => body.push(atom),
            BodyItem::SumBinding(alias, sum) => {
                if aggregate.replace(sum).is_some() {
                    return Err(ParseError::DuplicateAggregate);
                }
                let position = variables
                    .iter()
                    .position(|v| *v == alias)
                    .ok_or_else(|| ParseError::UnknownAggregateAlias(alias.clone()))?;
                variables.remove(position);
            }
        }
    }

    let mut head = Head::new(name, variables);
    head.aggregate = aggregate;
    Ok(Query::new(head, body))
}

fn syntax_error(text: &str, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let snippet: String = e.input.chars().take(24).collect();
            ParseError::Syntax {
                offset: text.len() - e.input.len(),
                message: if snippet.is_empty() {
                    "unexpected end of query".to_string()
                } else {
                    format!("unexpected input near `{}`", snippet)
                },
            }
        }
        nom::Err::Incomplete(_) => ParseError::Syntax {
            offset: text.len(),
            message: "incomplete query".to_string(),
        },
    }
}

fn ws<'a, O>(
    mut inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    move |input: &'a str| {
        let (input, _) = multispace0(input)?;
        let (input, out) = inner(input)?;
        let (input, _) = multispace0(input)?;
        Ok((input, out))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(take_while1(is_ident_start), take_while(is_ident_continue)))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    ws(pchar(','))(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(pchar('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(pchar('\''), take_while(|c: char| c != '\''), pchar('\'')),
        String::from,
    )(input)
}

fn term(input: &str) -> IResult<&str, Term> {
    alt((
        map(string_literal, Term::String),
        map(integer, Term::Integer),
        map(ident, |name: &str| Term::var(name)),
    ))(input)
}

fn comparison_op(input: &str) -> IResult<&str, ComparisonOp> {
    alt((
        value(ComparisonOp::Ne, tag("!=")),
        value(ComparisonOp::Le, tag("<=")),
        value(ComparisonOp::Ge, tag(">=")),
        value(ComparisonOp::Eq, tag("=")),
        value(ComparisonOp::Lt, tag("<")),
        value(ComparisonOp::Gt, tag(">")),
    ))(input)
}

fn sum_aggregate(input: &str) -> IResult<&str, SumAggregate> {
    let (input, _) = tag("SUM")(input)?;
    let (input, _) = ws(pchar('('))(input)?;
    let (input, terms) = separated_list1(ws(pchar('*')), term)(input)?;
    let (input, _) = ws(pchar(')'))(input)?;
    Ok((input, SumAggregate::new(terms)))
}

fn relational_atom(input: &str) -> IResult<&str, RelationalAtom> {
    let (input, name) = ident(input)?;
    let (input, _) = ws(pchar('('))(input)?;
    let (input, terms) = separated_list0(comma, term)(input)?;
    let (input, _) = ws(pchar(')'))(input)?;
    Ok((input, RelationalAtom::new(name, terms)))
}

fn comparison_atom(input: &str) -> IResult<&str, ComparisonAtom> {
    let (input, (left, op, right)) = tuple((term, ws(comparison_op), term))(input)?;
    Ok((input, ComparisonAtom::new(left, op, right)))
}

fn sum_binding(input: &str) -> IResult<&str, (String, SumAggregate)> {
    let (input, (alias, _, sum)) = tuple((ident, ws(pchar('=')), sum_aggregate))(input)?;
    Ok((input, (alias.to_string(), sum)))
}

fn body_item(input: &str) -> IResult<&str, BodyItem> {
    alt((
        map(sum_binding, |(alias, sum)| BodyItem::SumBinding(alias, sum)),
        map(relational_atom, |atom| BodyItem::Atom(Atom::Relational(atom))),
        map(comparison_atom, |atom| BodyItem::Atom(Atom::Comparison(atom))),
    ))(input)
}

fn head_item(input: &str) -> IResult<&str, HeadItem> {
    alt((
        map(sum_aggregate, HeadItem::Sum),
        map(ident, |name: &str| HeadItem::Variable(name.to_string())),
    ))(input)
}

fn query_parts(input: &str) -> IResult<&str, (&str, Vec<HeadItem>, Vec<BodyItem>)> {
    let (input, _) = multispace0(input)?;
    let (input, name) = ident(input)?;
    let (input, _) = ws(pchar('('))(input)?;
    let (input, head_items) = separated_list0(comma, head_item)(input)?;
    let (input, _) = ws(pchar(')'))(input)?;
    let (input, _) = ws(tag(":-"))(input)?;
    let (input, body_items) = separated_list1(comma, body_item)(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (name, head_items, body_items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_join() {
        let query = parse_query("Q(x, z) :- R(x, y), S(y, z)").unwrap();
        assert_eq!(query.head.name, "Q");
        assert_eq!(query.head.variables, vec!["x", "z"]);
        assert!(query.head.aggregate.is_none());
        assert_eq!(query.body.len(), 2);
        assert_eq!(
            query.body[1],
            Atom::Relational(RelationalAtom::new(
                "S",
                vec![Term::var("y"), Term::var("z")]
            ))
        );
    }

    #[test]
    fn test_parse_constants_and_comparisons() {
        let query = parse_query("Q(x) :- R(x, 'adbs', -3), x != 4, x>=y").unwrap();
        assert_eq!(
            query.body[0],
            Atom::Relational(RelationalAtom::new(
                "R",
                vec![Term::var("x"), Term::string("adbs"), Term::Integer(-3)]
            ))
        );
        assert_eq!(
            query.body[1],
            Atom::Comparison(ComparisonAtom::new(
                Term::var("x"),
                ComparisonOp::Ne,
                Term::Integer(4)
            ))
        );
        assert_eq!(
            query.body[2],
            Atom::Comparison(ComparisonAtom::new(
                Term::var("x"),
                ComparisonOp::Ge,
                Term::var("y")
            ))
        );
    }

    #[test]
    fn test_parse_head_sum() {
        let query = parse_query("Q(x, SUM(y * 2)) :- R(x, y)").unwrap();
        assert_eq!(query.head.variables, vec!["x"]);
        assert_eq!(
            query.head.aggregate,
            Some(SumAggregate::new(vec![Term::var("y"), Term::Integer(2)]))
        );
    }

    #[test]
    fn test_parse_sum_binding_in_body() {
        let query = parse_query("Q(s):-R(a),s=SUM(a)").unwrap();
        assert!(query.head.variables.is_empty());
        assert_eq!(
            query.head.aggregate,
            Some(SumAggregate::new(vec![Term::var("a")]))
        );
        assert_eq!(query.body.len(), 1);
    }

    #[test]
    fn test_parse_empty_head() {
        let query = parse_query("Q() :- R(x)").unwrap();
        assert!(query.head.variables.is_empty());
    }

    #[test]
    fn test_duplicate_aggregate_rejected() {
        let err = parse_query("Q(SUM(x), SUM(y)) :- R(x, y)").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateAggregate));
    }

    #[test]
    fn test_unknown_alias_rejected() {
        let err = parse_query("Q(x) :- R(x, y), s = SUM(y)").unwrap_err();
        assert!(matches!(err, ParseError::UnknownAggregateAlias(ref s) if s == "s"));
    }

    #[test]
    fn test_syntax_error_reports_offset() {
        let err = parse_query("Q(x) :- R(x,").unwrap_err();
        match err {
            ParseError::Syntax { offset, .. } => assert!(offset > 0),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_query("Q(x) R(x)").is_err());
    }
}
