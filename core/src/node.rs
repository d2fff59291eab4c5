use serde::Serialize;
use std::fmt;

/// Which kind of line a [`Node`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    UnparsedLine,
    LocalPathRequirementLine,
    VcsRequirementLine,
    RequirementLine,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::UnparsedLine => "UnparsedLine",
            NodeKind::LocalPathRequirementLine => "LocalPathRequirementLine",
            NodeKind::VcsRequirementLine => "VcsRequirementLine",
            NodeKind::RequirementLine => "RequirementLine",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line kept byte-for-byte: options, comments, blanks, anything unrecognized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedLine {
    orig_line: String,
}

impl UnparsedLine {
    pub fn new(orig_line: impl Into<String>) -> Self {
        Self {
            orig_line: orig_line.into(),
        }
    }

    /// The line as read, terminator included
    pub fn orig_line(&self) -> &str {
        &self.orig_line
    }

    pub fn with_line(&self, orig_line: impl Into<String>) -> Self {
        Self::new(orig_line)
    }
}

/// The pieces of a requirement-bearing line, in source order:
/// leading whitespace, requirement, trailing whitespace, comment, newline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineParts {
    // a parsed Requirement can't roundtrip, so the text is kept as written
    requirement: String,
    whitespace_before_requirement: String,
    whitespace_after_requirement: String,
    comment: String,
    newline: String,
}

impl LineParts {
    /// A bare requirement with no decoration, terminated by `\n`
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            whitespace_before_requirement: String::new(),
            whitespace_after_requirement: String::new(),
            comment: String::new(),
            newline: "\n".to_string(),
        }
    }

    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    pub fn whitespace_before_requirement(&self) -> &str {
        &self.whitespace_before_requirement
    }

    pub fn whitespace_after_requirement(&self) -> &str {
        &self.whitespace_after_requirement
    }

    /// The comment including its leading `#`, or empty
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn with_requirement(&self, requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
            ..self.clone()
        }
    }

    pub fn with_whitespace_before_requirement(&self, whitespace: impl Into<String>) -> Self {
        Self {
            whitespace_before_requirement: whitespace.into(),
            ..self.clone()
        }
    }

    pub fn with_whitespace_after_requirement(&self, whitespace: impl Into<String>) -> Self {
        Self {
            whitespace_after_requirement: whitespace.into(),
            ..self.clone()
        }
    }

    pub fn with_comment(&self, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..self.clone()
        }
    }

    pub fn with_newline(&self, newline: impl Into<String>) -> Self {
        Self {
            newline: newline.into(),
            ..self.clone()
        }
    }

    fn build<W: fmt::Write + ?Sized>(&self, buf: &mut W) -> fmt::Result {
        buf.write_str(&self.whitespace_before_requirement)?;
        buf.write_str(&self.requirement)?;
        buf.write_str(&self.whitespace_after_requirement)?;
        buf.write_str(&self.comment)?;
        buf.write_str(&self.newline)
    }

    fn dump_fields<W: fmt::Write + ?Sized>(&self, buf: &mut W) -> fmt::Result {
        write!(
            buf,
            "requirement={:?}, whitespace_before_requirement={:?}, \
             whitespace_after_requirement={:?}, comment={:?}, newline={:?}",
            self.requirement,
            self.whitespace_before_requirement,
            self.whitespace_after_requirement,
            self.comment,
            self.newline,
        )
    }
}

/// One physical line of a requirements file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    #[serde(rename = "UnparsedLine")]
    Unparsed(UnparsedLine),
    /// `./foo`, `/abs/path`, `../sibling`
    #[serde(rename = "LocalPathRequirementLine")]
    LocalPath(LineParts),
    /// URL or VCS reference, or a value with a `#` glued to it
    #[serde(rename = "VcsRequirementLine")]
    Vcs(LineParts),
    /// A validated PEP 508 specifier
    #[serde(rename = "RequirementLine")]
    Requirement(LineParts),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Unparsed(_) => NodeKind::UnparsedLine,
            Node::LocalPath(_) => NodeKind::LocalPathRequirementLine,
            Node::Vcs(_) => NodeKind::VcsRequirementLine,
            Node::Requirement(_) => NodeKind::RequirementLine,
        }
    }

    /// Structured fields, for every kind except unparsed lines
    pub fn parts(&self) -> Option<&LineParts> {
        match self {
            Node::Unparsed(_) => None,
            Node::LocalPath(parts) | Node::Vcs(parts) | Node::Requirement(parts) => Some(parts),
        }
    }

    pub fn requirement(&self) -> Option<&str> {
        self.parts().map(LineParts::requirement)
    }

    /// The line terminator this node ends with (empty only for hand-built nodes)
    pub fn newline(&self) -> &str {
        match self {
            Node::Unparsed(line) => {
                let text = line.orig_line();
                if text.ends_with("\r\n") {
                    "\r\n"
                } else if text.ends_with('\n') {
                    "\n"
                } else {
                    ""
                }
            }
            Node::LocalPath(parts) | Node::Vcs(parts) | Node::Requirement(parts) => parts.newline(),
        }
    }

    /// Copy this node with its parts replaced, keeping the kind.
    /// Unparsed lines have no parts and come back unchanged.
    pub fn with_parts(&self, change: impl FnOnce(&LineParts) -> LineParts) -> Node {
        match self {
            Node::Unparsed(_) => self.clone(),
            Node::LocalPath(parts) => Node::LocalPath(change(parts)),
            Node::Vcs(parts) => Node::Vcs(change(parts)),
            Node::Requirement(parts) => Node::Requirement(change(parts)),
        }
    }

    /// Write the node's source text
    pub fn build<W: fmt::Write + ?Sized>(&self, buf: &mut W) -> fmt::Result {
        match self {
            Node::Unparsed(line) => buf.write_str(line.orig_line()),
            Node::LocalPath(parts) | Node::Vcs(parts) | Node::Requirement(parts) => parts.build(buf),
        }
    }

    /// Write one debug line, `Kind(field="value", ...)`, prefixed by `indent`
    pub fn dump<W: fmt::Write + ?Sized>(&self, buf: &mut W, indent: &str) -> fmt::Result {
        write!(buf, "{indent}{}(", self.kind())?;
        match self {
            Node::Unparsed(line) => write!(buf, "orig_line={:?}", line.orig_line())?,
            Node::LocalPath(parts) | Node::Vcs(parts) | Node::Requirement(parts) => {
                parts.dump_fields(buf)?;
            }
        }
        buf.write_str(")\n")
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.build(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts() -> LineParts {
        LineParts::new("requests==2.0")
            .with_whitespace_before_requirement("  ")
            .with_whitespace_after_requirement(" ")
            .with_comment("# pinned")
            .with_newline("\r\n")
    }

    #[test]
    fn test_build_writes_fields_in_source_order() {
        let node = Node::Requirement(parts());
        assert_eq!(node.to_text(), "  requests==2.0 # pinned\r\n");
        assert_eq!(node.newline(), "\r\n");
    }

    #[test]
    fn test_with_changes_leaves_original_untouched() {
        let original = Node::Requirement(parts());
        let changed = original.with_parts(|p| p.with_requirement("requests==2.1"));

        assert_eq!(changed.kind(), NodeKind::RequirementLine);
        assert_eq!(changed.requirement(), Some("requests==2.1"));
        assert_eq!(changed.to_text(), "  requests==2.1 # pinned\r\n");
        assert_eq!(original.requirement(), Some("requests==2.0"));
    }

    #[test]
    fn test_with_parts_on_unparsed_is_identity() {
        let node = Node::Unparsed(UnparsedLine::new("-r base.txt\n"));
        let same = node.with_parts(|p| p.with_comment("# ignored"));
        assert_eq!(same, node);
        assert_eq!(node.parts(), None);
        assert_eq!(node.newline(), "\n");
    }

    #[test]
    fn test_with_line() {
        let line = UnparsedLine::new("# old\n");
        let replaced = line.with_line("# new\n");
        assert_eq!(replaced.orig_line(), "# new\n");
        assert_eq!(line.orig_line(), "# old\n");
    }

    #[test]
    fn test_dump_unparsed() {
        let mut out = String::new();
        Node::Unparsed(UnparsedLine::new("-e foo\n"))
            .dump(&mut out, "  ")
            .unwrap();
        assert_eq!(out, "  UnparsedLine(orig_line=\"-e foo\\n\")\n");
    }

    #[test]
    fn test_dump_requirement() {
        let mut out = String::new();
        Node::Vcs(LineParts::new("git+https://x/y.git"))
            .dump(&mut out, "")
            .unwrap();
        assert_eq!(
            out,
            "VcsRequirementLine(requirement=\"git+https://x/y.git\", \
             whitespace_before_requirement=\"\", whitespace_after_requirement=\"\", \
             comment=\"\", newline=\"\\n\")\n"
        );
    }

    #[test]
    fn test_serialize_is_tagged_by_kind() {
        let value = serde_json::to_value(Node::LocalPath(LineParts::new("./pkg"))).unwrap();
        assert_eq!(value["kind"], "LocalPathRequirementLine");
        assert_eq!(value["requirement"], "./pkg");
    }
}
