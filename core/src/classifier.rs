//! Classification of a single physical line.

use crate::node::{LineParts, Node, UnparsedLine};
use crate::specifier::{self, SpecifierError};
use regex::Regex;
use std::sync::LazyLock;

/// leading ws, value, trailing ws, optional comment, terminator.
/// A value can't start with `\r`, so CRLF blank lines stay unparsed.
static WELL_FORMED_REQUIREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([^# \t\r][^#]*?)([ \t]*)(#.*?)?(\r?\n)$")
        .expect("requirement line pattern is valid")
});

/// Classify one line, terminator included.
///
/// Lines that don't have the shape of a requirement are never an error;
/// they come back as [`Node::Unparsed`]. The only failure is a bare value
/// that is not a valid dependency specifier.
pub fn classify_line(line: &str) -> Result<Node, SpecifierError> {
    let Some(caps) = WELL_FORMED_REQUIREMENT_LINE.captures(line) else {
        return Ok(Node::Unparsed(UnparsedLine::new(line)));
    };

    let whitespace_before = &caps[1];
    let value = &caps[2];
    let whitespace_after = &caps[3];
    let comment = caps.get(4).map_or("", |m| m.as_str());
    let newline = &caps[5];

    let parts = LineParts::new(value)
        .with_whitespace_before_requirement(whitespace_before)
        .with_whitespace_after_requirement(whitespace_after)
        .with_comment(comment)
        .with_newline(newline);

    // Options (-e, -r, --hash=...) are kept verbatim
    if value.starts_with(['-', '#']) {
        return Ok(Node::Unparsed(UnparsedLine::new(line)));
    }

    if value.starts_with(['.', '/']) {
        return Ok(Node::LocalPath(parts));
    }

    // pip only starts a comment at a '#' preceded by whitespace, so a glued
    // '#' belongs to the value (e.g. a URL fragment)
    if !value.is_empty() && !comment.is_empty() && whitespace_after.is_empty() {
        let requirement = format!("{value}{whitespace_after}{comment}");
        return Ok(Node::Vcs(
            parts
                .with_requirement(requirement)
                .with_whitespace_after_requirement("")
                .with_comment(""),
        ));
    }

    if value.contains("://") {
        return Ok(Node::Vcs(parts));
    }

    specifier::validate(value)?;
    Ok(Node::Requirement(parts))
}
