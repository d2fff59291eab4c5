//! PEP 508 dependency specifiers.
//!
//! `name [extras] (version specifiers | @ url) ; marker`
//!
//! The line classifier only needs to know whether a value is a legal
//! specifier, but the parsed pieces are kept so callers can inspect them.

use crate::cursor::Cursor;
use crate::marker::{self, MarkerError, MarkerTree};
use crate::version::Version;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Why a specifier failed to parse, without position information
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierErrorKind {
    #[error("expected package name")]
    ExpectedName,
    #[error("invalid name {0:?}: must start and end with a letter or digit")]
    InvalidName(String),
    #[error("expected extra name")]
    ExpectedExtra,
    #[error("expected ',' or ']' after extra name")]
    ExpectedClosingBracket,
    #[error("expected URL after '@'")]
    ExpectedUrl,
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("expected version specifier after ','")]
    ExpectedSpecifier,
    #[error("invalid version specifier {specifier:?}: {reason}")]
    InvalidSpecifier { specifier: String, reason: String },
    #[error("expected ')' after version specifiers")]
    ExpectedClosingParen,
    #[error("invalid marker: {0}")]
    Marker(#[from] MarkerError),
    #[error("unexpected {0:?}, expected end of requirement or ';'")]
    UnexpectedText(String),
}

/// A dependency specifier that failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid requirement {input:?}: {kind} (at byte {position})")]
pub struct SpecifierError {
    /// The full text that was being parsed
    pub input: String,
    /// Byte offset into `input` where parsing stopped
    pub position: usize,
    pub kind: SpecifierErrorKind,
}

impl SpecifierError {
    /// The input followed by a caret line under the failing position
    pub fn snippet(&self) -> String {
        let column = self
            .input
            .get(..self.position)
            .map_or(self.position, |prefix| prefix.chars().count());
        format!("{}\n{}^", self.input, " ".repeat(column))
    }
}

/// Version comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    ArbitraryEqual,
    Equal,
    NotEqual,
    Compatible,
    LessThanEqual,
    GreaterThanEqual,
    LessThan,
    GreaterThan,
}

impl Operator {
    // "===" must be tried before "==", and "<=" before "<"
    const ALL: [Operator; 8] = [
        Operator::ArbitraryEqual,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Compatible,
        Operator::LessThanEqual,
        Operator::GreaterThanEqual,
        Operator::LessThan,
        Operator::GreaterThan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::ArbitraryEqual => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Compatible => "~=",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThanEqual => ">=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
        }
    }

    pub(crate) fn eat(cursor: &mut Cursor<'_>) -> Option<Self> {
        Self::ALL.into_iter().find(|op| cursor.eat(op.as_str()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `operator version` clause, e.g. `>=1.2` or `==2.*`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Specifier {
    pub operator: Operator,
    /// Version text as written (may end in `.*` for `==`/`!=`)
    pub version: String,
}

impl Specifier {
    pub fn new(operator: Operator, version: &str) -> Result<Self, SpecifierErrorKind> {
        check_version(operator, version).map_err(|reason| SpecifierErrorKind::InvalidSpecifier {
            specifier: format!("{operator}{version}"),
            reason,
        })?;
        Ok(Self {
            operator,
            version: version.to_string(),
        })
    }
}

/// Apply the per-operator version rules
fn check_version(operator: Operator, version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err("missing version".to_string());
    }

    match operator {
        // Anything without whitespace is allowed after ===
        Operator::ArbitraryEqual => Ok(()),
        Operator::Equal | Operator::NotEqual => match version.strip_suffix(".*") {
            Some(prefix) => {
                let parsed = Version::from_str(prefix).map_err(|e| e.to_string())?;
                if parsed.is_release_only() {
                    Ok(())
                } else {
                    Err("a wildcard may only follow release segments".to_string())
                }
            }
            None => Version::from_str(version).map(|_| ()).map_err(|e| e.to_string()),
        },
        Operator::Compatible => {
            let parsed = Version::from_str(version).map_err(|e| e.to_string())?;
            if parsed.local.is_some() {
                Err("local versions are not allowed with ~=".to_string())
            } else if parsed.release.len() < 2 {
                Err("~= needs at least two release segments".to_string())
            } else {
                Ok(())
            }
        }
        Operator::LessThanEqual
        | Operator::GreaterThanEqual
        | Operator::LessThan
        | Operator::GreaterThan => {
            let parsed = Version::from_str(version).map_err(|e| e.to_string())?;
            if parsed.local.is_some() {
                Err(format!("local versions are not allowed with {operator}"))
            } else {
                Ok(())
            }
        }
    }
}

impl FromStr for Specifier {
    type Err = SpecifierErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut cursor = Cursor::new(s);
        let operator =
            Operator::eat(&mut cursor).ok_or_else(|| SpecifierErrorKind::InvalidSpecifier {
                specifier: s.to_string(),
                reason: "missing comparison operator".to_string(),
            })?;
        cursor.eat_ws();
        Specifier::new(operator, cursor.rest())
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionOrUrl {
    Specifiers(Vec<Specifier>),
    Url(String),
}

/// A parsed PEP 508 dependency specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// Package name as written
    pub name: String,
    pub extras: Vec<String>,
    pub version_or_url: Option<VersionOrUrl>,
    pub marker: Option<MarkerTree>,
}

impl FromStr for Requirement {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(s);
        parse_requirement(&mut cursor).map_err(|kind| SpecifierError {
            input: s.to_string(),
            position: cursor.pos(),
            kind,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        match &self.version_or_url {
            Some(VersionOrUrl::Specifiers(specs)) => {
                let specs: Vec<String> = specs.iter().map(ToString::to_string).collect();
                write!(f, "{}", specs.join(","))?;
            }
            Some(VersionOrUrl::Url(url)) => {
                write!(f, " @ {url}")?;
                if self.marker.is_some() {
                    // A marker directly after a URL would be read as part of it
                    write!(f, " ")?;
                }
            }
            None => {}
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// Check that `s` is a legal dependency specifier
pub fn validate(s: &str) -> Result<(), SpecifierError> {
    Requirement::from_str(s).map(|_| ())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Names and extras share one rule: alphanumeric at both ends
fn parse_identifier(
    cursor: &mut Cursor<'_>,
    missing: SpecifierErrorKind,
) -> Result<String, SpecifierErrorKind> {
    let start = cursor.pos();
    let ident = cursor.take_while(is_name_char);
    let bounded = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());

    if ident.is_empty() {
        return Err(missing);
    }
    if !bounded(ident.chars().next()) || !bounded(ident.chars().last()) {
        cursor.reset(start);
        return Err(SpecifierErrorKind::InvalidName(ident.to_string()));
    }
    Ok(ident.to_string())
}

fn parse_requirement(cursor: &mut Cursor<'_>) -> Result<Requirement, SpecifierErrorKind> {
    cursor.eat_ws();
    let name = parse_identifier(cursor, SpecifierErrorKind::ExpectedName)?;
    cursor.eat_ws();
    let extras = parse_extras(cursor)?;
    cursor.eat_ws();

    let version_or_url = if cursor.eat("@") {
        cursor.eat_ws();
        let url = parse_url(cursor)?;
        // The URL runs to the next whitespace, so anything after it is separated
        if cursor.eat_ws() == 0 && !cursor.at_end() {
            return Err(SpecifierErrorKind::UnexpectedText(cursor.rest().to_string()));
        }
        Some(VersionOrUrl::Url(url))
    } else {
        let specs = parse_version_spec(cursor)?;
        cursor.eat_ws();
        if specs.is_empty() {
            None
        } else {
            Some(VersionOrUrl::Specifiers(specs))
        }
    };

    let marker = if cursor.eat(";") {
        Some(marker::parse_marker(cursor)?)
    } else {
        None
    };

    cursor.eat_ws();
    if !cursor.at_end() {
        return Err(SpecifierErrorKind::UnexpectedText(cursor.rest().to_string()));
    }

    Ok(Requirement {
        name,
        extras,
        version_or_url,
        marker,
    })
}

fn parse_extras(cursor: &mut Cursor<'_>) -> Result<Vec<String>, SpecifierErrorKind> {
    let mut extras = Vec::new();
    if !cursor.eat("[") {
        return Ok(extras);
    }

    cursor.eat_ws();
    if cursor.eat("]") {
        return Ok(extras);
    }

    loop {
        cursor.eat_ws();
        extras.push(parse_identifier(cursor, SpecifierErrorKind::ExpectedExtra)?);
        cursor.eat_ws();
        if cursor.eat(",") {
            continue;
        }
        if cursor.eat("]") {
            return Ok(extras);
        }
        return Err(SpecifierErrorKind::ExpectedClosingBracket);
    }
}

fn parse_url(cursor: &mut Cursor<'_>) -> Result<String, SpecifierErrorKind> {
    let start = cursor.pos();
    let url = cursor.take_while(|c| !c.is_whitespace());
    if url.is_empty() {
        return Err(SpecifierErrorKind::ExpectedUrl);
    }
    if let Err(err) = url::Url::parse(url) {
        cursor.reset(start);
        return Err(SpecifierErrorKind::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        });
    }
    Ok(url.to_string())
}

fn parse_version_spec(cursor: &mut Cursor<'_>) -> Result<Vec<Specifier>, SpecifierErrorKind> {
    if !cursor.eat("(") {
        return parse_version_many(cursor);
    }

    cursor.eat_ws();
    let specs = parse_version_many(cursor)?;
    cursor.eat_ws();
    if !cursor.eat(")") {
        return Err(SpecifierErrorKind::ExpectedClosingParen);
    }
    Ok(specs)
}

fn parse_version_many(cursor: &mut Cursor<'_>) -> Result<Vec<Specifier>, SpecifierErrorKind> {
    let mut specs = Vec::new();
    let Some(first) = parse_version_one(cursor)? else {
        return Ok(specs);
    };
    specs.push(first);

    loop {
        let checkpoint = cursor.pos();
        cursor.eat_ws();
        if !cursor.eat(",") {
            cursor.reset(checkpoint);
            return Ok(specs);
        }
        cursor.eat_ws();
        match parse_version_one(cursor)? {
            Some(spec) => specs.push(spec),
            None => return Err(SpecifierErrorKind::ExpectedSpecifier),
        }
    }
}

fn parse_version_one(cursor: &mut Cursor<'_>) -> Result<Option<Specifier>, SpecifierErrorKind> {
    let start = cursor.pos();
    let Some(operator) = Operator::eat(cursor) else {
        return Ok(None);
    };
    cursor.eat_ws();
    let version = cursor.take_while(|c| !c.is_whitespace() && !matches!(c, ',' | ';' | ')'));
    match Specifier::new(operator, version) {
        Ok(spec) => Ok(Some(spec)),
        Err(err) => {
            cursor.reset(start);
            Err(err)
        }
    }
}
