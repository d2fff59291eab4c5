use crate::classifier::classify_line;
use crate::node::{LineParts, Node};
use crate::specifier::SpecifierError;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// The terminator a final unterminated line gets: `\r\n` if the text uses
/// it anywhere, `\n` otherwise
pub fn dominant_newline(data: &str) -> &'static str {
    if data.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Make sure `data` ends with a line terminator.
///
/// This is the only change a parse/build round-trip makes to its input.
pub fn normalize(data: &str) -> Cow<'_, str> {
    if data.ends_with('\n') {
        Cow::Borrowed(data)
    } else {
        Cow::Owned(format!("{data}{}", dominant_newline(data)))
    }
}

/// A parsed requirements file: one node per physical line, in order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementFile {
    children: Vec<Node>,
}

impl RequirementFile {
    /// Parse the text of a requirements file.
    ///
    /// Fails on the first line whose value is not a valid dependency
    /// specifier; no partial document is returned.
    pub fn parse(data: &str) -> Result<Self, SpecifierError> {
        let data = normalize(data);

        let children = data
            .split_inclusive('\n')
            .enumerate()
            .map(|(idx, line)| -> Result<Node, SpecifierError> {
                let node = classify_line(line)?;
                trace!(line = idx + 1, kind = %node.kind(), "classified line");
                Ok(node)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            lines = children.len(),
            newline = ?dominant_newline(&data),
            "parsed requirements file"
        );

        Ok(Self { children })
    }

    /// Build a document from nodes, e.g. after replacing some of them
    pub fn from_nodes(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// A copy of this document with the node at `index` replaced,
    /// or `None` if `index` is out of range
    pub fn with_child(&self, index: usize, node: Node) -> Option<Self> {
        if index >= self.children.len() {
            return None;
        }
        let mut children = self.children.clone();
        children[index] = node;
        Some(Self { children })
    }

    /// The lines holding validated PEP 508 specifiers
    pub fn requirements(&self) -> impl Iterator<Item = &LineParts> {
        self.children.iter().filter_map(|node| match node {
            Node::Requirement(parts) => Some(parts),
            _ => None,
        })
    }

    /// Write every node's text in order
    pub fn build<W: fmt::Write + ?Sized>(&self, buf: &mut W) -> fmt::Result {
        for child in &self.children {
            child.build(buf)?;
        }
        Ok(())
    }

    /// Write one debug line per node
    pub fn dump<W: fmt::Write + ?Sized>(&self, buf: &mut W, indent: &str) -> fmt::Result {
        for child in &self.children {
            child.dump(buf, indent)?;
        }
        Ok(())
    }
}

impl FromStr for RequirementFile {
    type Err = SpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RequirementFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.build(f)
    }
}

impl<'a> IntoIterator for &'a RequirementFile {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, UnparsedLine};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(doc: &RequirementFile) -> Vec<NodeKind> {
        doc.iter().map(Node::kind).collect()
    }

    #[test]
    fn test_empty() {
        let doc = RequirementFile::parse("").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(kinds(&doc), vec![NodeKind::UnparsedLine]);
        // The only change a round-trip makes
        assert_eq!(doc.to_string(), "\n");
    }

    #[test]
    fn test_just_newline() {
        let doc = RequirementFile::parse("\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::UnparsedLine]);
        assert_eq!(doc.to_string(), "\n");
    }

    #[test]
    fn test_line_with_opts() {
        let doc = RequirementFile::parse("-e foo\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::UnparsedLine]);
        assert_eq!(doc.to_string(), "-e foo\n");
    }

    #[test]
    fn test_just_comment() {
        let doc = RequirementFile::parse("# comment\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::UnparsedLine]);
        assert_eq!(doc.to_string(), "# comment\n");
    }

    #[test]
    fn test_requirement() {
        let doc = RequirementFile::parse("x\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::RequirementLine]);
        assert_eq!(doc.children()[0].requirement(), Some("x"));
        assert_eq!(doc.to_string(), "x\n");
    }

    #[test]
    fn test_requirement_comment() {
        let doc = RequirementFile::parse("x # comment\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::RequirementLine]);
        let parts = doc.children()[0].parts().unwrap();
        assert_eq!(parts.requirement(), "x");
        assert_eq!(parts.comment(), "# comment");
        assert_eq!(doc.to_string(), "x # comment\n");
    }

    #[test]
    fn test_local_requirement() {
        let doc = RequirementFile::parse("../foo # comment\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::LocalPathRequirementLine]);
        assert_eq!(doc.children()[0].requirement(), Some("../foo"));
        assert_eq!(doc.to_string(), "../foo # comment\n");
    }

    #[test]
    fn test_special_case_url_hash_mark() {
        let doc = RequirementFile::parse("http://foo#egg_info=t\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::VcsRequirementLine]);
        assert_eq!(doc.children()[0].requirement(), Some("http://foo#egg_info=t"));
        assert_eq!(doc.to_string(), "http://foo#egg_info=t\n");
    }

    #[test]
    fn test_mixed_file_roundtrip() {
        let input = "\
# Production dependencies
--index-url https://pypi.org/simple
-r base.txt

requests[security]>=2.28,<3  # http
numpy==1.24.*
  indented ; python_version < '3.12'
-e git+https://github.com/org/repo.git#egg=repo
./vendor/pkg
git+https://github.com/org/other.git@main#egg=other
";
        let doc = RequirementFile::parse(input).unwrap();
        assert_eq!(
            kinds(&doc),
            vec![
                NodeKind::UnparsedLine,
                NodeKind::UnparsedLine,
                NodeKind::UnparsedLine,
                NodeKind::UnparsedLine,
                NodeKind::RequirementLine,
                NodeKind::RequirementLine,
                NodeKind::RequirementLine,
                NodeKind::UnparsedLine,
                NodeKind::LocalPathRequirementLine,
                NodeKind::VcsRequirementLine,
            ]
        );
        assert_eq!(doc.requirements().count(), 3);
        assert_eq!(doc.to_string(), input);
    }

    #[rstest]
    #[case("x", "x\n")]
    #[case("x\ny", "x\ny\n")]
    #[case("x\r\ny", "x\r\ny\r\n")]
    #[case("# only\r\n\r\n-e .", "# only\r\n\r\n-e .\r\n")]
    #[case("x\r\n", "x\r\n")]
    #[case("a\nb\r\n", "a\nb\r\n")]
    fn test_terminator_normalization(#[case] input: &str, #[case] expected: &str) {
        let doc = RequirementFile::parse(input).unwrap();
        assert_eq!(doc.to_string(), expected);
        assert_eq!(normalize(input), expected);
        assert_eq!(doc.len(), expected.matches('\n').count());
    }

    #[test]
    fn test_newline_field_matches_source() {
        let doc = RequirementFile::parse("a\r\nb\n# c\r\n").unwrap();
        let newlines: Vec<&str> = doc.iter().map(Node::newline).collect();
        assert_eq!(newlines, vec!["\r\n", "\n", "\r\n"]);
    }

    #[test]
    fn test_only_line_feed_ends_a_line() {
        let doc = RequirementFile::parse("# a\x0cb\u{2028}c\r d\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::UnparsedLine]);
        assert!(RequirementFile::parse("foo\x0cbar\n").is_err());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "a==1\n./b\nhttp://c#d\n-e e\n";
        assert_eq!(
            RequirementFile::parse(input).unwrap(),
            RequirementFile::parse(input).unwrap()
        );
    }

    #[test]
    fn test_long_version_numbers() {
        let doc = RequirementFile::parse("foo==99999999999999999999999\n").unwrap();
        assert_eq!(kinds(&doc), vec![NodeKind::RequirementLine]);
        assert_eq!(doc.to_string(), "foo==99999999999999999999999\n");
    }

    #[test]
    fn test_invalid_line_aborts_parse() {
        let err = RequirementFile::parse("good==1.0\nnot valid\nalso==2\n").unwrap_err();
        assert_eq!(err.input, "not valid");
    }

    #[test]
    fn test_dump() {
        let doc = RequirementFile::parse("x # c\n-e .\n").unwrap();
        let mut out = String::new();
        doc.dump(&mut out, "> ").unwrap();
        assert_eq!(
            out,
            "> RequirementLine(requirement=\"x\", whitespace_before_requirement=\"\", \
             whitespace_after_requirement=\" \", comment=\"# c\", newline=\"\\n\")\n\
             > UnparsedLine(orig_line=\"-e .\\n\")\n"
        );
    }

    #[test]
    fn test_replace_node() {
        let doc = RequirementFile::parse("# deps\nrequests==2.0  # pinned\n").unwrap();
        let bumped = doc.children()[1].with_parts(|p| p.with_requirement("requests==2.31.0"));
        let updated = doc.with_child(1, bumped).unwrap();

        assert_eq!(updated.to_string(), "# deps\nrequests==2.31.0  # pinned\n");
        assert_eq!(doc.to_string(), "# deps\nrequests==2.0  # pinned\n");
        assert!(doc.with_child(2, Node::Unparsed(UnparsedLine::new("\n"))).is_none());
    }

    #[test]
    fn test_from_nodes() {
        let nodes = RequirementFile::parse("a\nb\n").unwrap().into_children();
        let reversed = RequirementFile::from_nodes(nodes.into_iter().rev().collect());
        assert_eq!(reversed.to_string(), "b\na\n");
        assert!(!reversed.is_empty());
        assert!(RequirementFile::default().is_empty());
    }

    #[test]
    fn test_from_str() {
        let doc: RequirementFile = "flask\n".parse().unwrap();
        assert_eq!((&doc).into_iter().count(), 1);
    }
}
