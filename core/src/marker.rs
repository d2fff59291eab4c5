//! PEP 508 environment markers.
//!
//! Markers are parsed only to check they are well formed; nothing here
//! evaluates them against an interpreter.

use crate::cursor::Cursor;
use crate::specifier::Operator;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// (spelling, canonical name) pairs, legacy aliases included
const MARKER_VARIABLES: &[(&str, &str)] = &[
    ("implementation_version", "implementation_version"),
    ("implementation_name", "implementation_name"),
    ("platform_python_implementation", "platform_python_implementation"),
    ("platform.python_implementation", "platform_python_implementation"),
    ("python_implementation", "platform_python_implementation"),
    ("python_full_version", "python_full_version"),
    ("python_version", "python_version"),
    ("platform_release", "platform_release"),
    ("platform_system", "platform_system"),
    ("platform_version", "platform_version"),
    ("platform.version", "platform_version"),
    ("platform_machine", "platform_machine"),
    ("platform.machine", "platform_machine"),
    ("sys_platform", "sys_platform"),
    ("sys.platform", "sys_platform"),
    ("os_name", "os_name"),
    ("os.name", "os_name"),
    ("dependency_groups", "dependency_groups"),
    ("extra", "extra"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("expected a marker variable or quoted string")]
    ExpectedValue,
    #[error("unknown marker variable {0:?}")]
    UnknownVariable(String),
    #[error("unterminated quoted string")]
    UnterminatedString,
    #[error("expected a marker operator")]
    ExpectedOperator,
    #[error("expected ')' to close marker group")]
    ExpectedClosingParen,
    #[error("unexpected text after marker")]
    ExpectedEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerOperator {
    Compare(Operator),
    In,
    NotIn,
}

impl fmt::Display for MarkerOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerOperator::Compare(op) => write!(f, "{op}"),
            MarkerOperator::In => write!(f, "in"),
            MarkerOperator::NotIn => write!(f, "not in"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MarkerValue {
    /// Environment variable, stored under its canonical name
    Variable(String),
    /// Quoted string literal, without the quotes
    Literal(String),
}

impl fmt::Display for MarkerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerValue::Variable(name) => write!(f, "{name}"),
            MarkerValue::Literal(value) if value.contains('"') => write!(f, "'{value}'"),
            MarkerValue::Literal(value) => write!(f, "\"{value}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerExpression {
    pub lhs: MarkerValue,
    pub op: MarkerOperator,
    pub rhs: MarkerValue,
}

/// Boolean tree of marker comparisons; `and` binds tighter than `or`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MarkerTree {
    Expression(MarkerExpression),
    And(Vec<MarkerTree>),
    Or(Vec<MarkerTree>),
}

impl fmt::Display for MarkerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[MarkerTree], sep: &str) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                match item {
                    MarkerTree::Expression(_) => write!(f, "{item}")?,
                    _ => write!(f, "({item})")?,
                }
            }
            Ok(())
        }

        match self {
            MarkerTree::Expression(expr) => write!(f, "{} {} {}", expr.lhs, expr.op, expr.rhs),
            MarkerTree::And(items) => join(f, items, "and"),
            MarkerTree::Or(items) => join(f, items, "or"),
        }
    }
}

impl FromStr for MarkerTree {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(s);
        let tree = parse_marker(&mut cursor)?;
        cursor.eat_ws();
        if !cursor.at_end() {
            return Err(MarkerError::ExpectedEnd);
        }
        Ok(tree)
    }
}

/// Parse a marker starting at the cursor, stopping before trailing whitespace
pub(crate) fn parse_marker(cursor: &mut Cursor<'_>) -> Result<MarkerTree, MarkerError> {
    parse_or(cursor)
}

fn parse_or(cursor: &mut Cursor<'_>) -> Result<MarkerTree, MarkerError> {
    let mut items = vec![parse_and(cursor)?];
    loop {
        let checkpoint = cursor.pos();
        cursor.eat_ws();
        if !cursor.eat_keyword("or") {
            cursor.reset(checkpoint);
            break;
        }
        items.push(parse_and(cursor)?);
    }
    Ok(collapse(items, MarkerTree::Or))
}

fn parse_and(cursor: &mut Cursor<'_>) -> Result<MarkerTree, MarkerError> {
    let mut items = vec![parse_atom(cursor)?];
    loop {
        let checkpoint = cursor.pos();
        cursor.eat_ws();
        if !cursor.eat_keyword("and") {
            cursor.reset(checkpoint);
            break;
        }
        items.push(parse_atom(cursor)?);
    }
    Ok(collapse(items, MarkerTree::And))
}

fn collapse(mut items: Vec<MarkerTree>, wrap: fn(Vec<MarkerTree>) -> MarkerTree) -> MarkerTree {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn parse_atom(cursor: &mut Cursor<'_>) -> Result<MarkerTree, MarkerError> {
    cursor.eat_ws();
    if cursor.eat("(") {
        let tree = parse_or(cursor)?;
        cursor.eat_ws();
        if !cursor.eat(")") {
            return Err(MarkerError::ExpectedClosingParen);
        }
        return Ok(tree);
    }

    let lhs = parse_value(cursor)?;
    cursor.eat_ws();
    let op = parse_operator(cursor)?;
    cursor.eat_ws();
    let rhs = parse_value(cursor)?;

    Ok(MarkerTree::Expression(MarkerExpression { lhs, op, rhs }))
}

fn parse_value(cursor: &mut Cursor<'_>) -> Result<MarkerValue, MarkerError> {
    match cursor.peek() {
        Some(quote @ ('\'' | '"')) => {
            cursor.bump();
            let value = cursor.take_while(|c| c != quote);
            if !cursor.eat(quote.encode_utf8(&mut [0; 4])) {
                return Err(MarkerError::UnterminatedString);
            }
            Ok(MarkerValue::Literal(value.to_string()))
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let start = cursor.pos();
            let name = cursor.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
            match MARKER_VARIABLES.iter().find(|(alias, _)| *alias == name) {
                Some((_, canonical)) => Ok(MarkerValue::Variable((*canonical).to_string())),
                None => {
                    cursor.reset(start);
                    Err(MarkerError::UnknownVariable(name.to_string()))
                }
            }
        }
        _ => Err(MarkerError::ExpectedValue),
    }
}

fn parse_operator(cursor: &mut Cursor<'_>) -> Result<MarkerOperator, MarkerError> {
    if let Some(op) = Operator::eat(cursor) {
        return Ok(MarkerOperator::Compare(op));
    }
    if cursor.eat_keyword("in") {
        return Ok(MarkerOperator::In);
    }

    let checkpoint = cursor.pos();
    if cursor.eat_keyword("not") && cursor.eat_ws() > 0 && cursor.eat_keyword("in") {
        return Ok(MarkerOperator::NotIn);
    }
    cursor.reset(checkpoint);
    Err(MarkerError::ExpectedOperator)
}
