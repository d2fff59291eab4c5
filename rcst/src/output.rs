use colored::{ColoredString, Colorize};
use requirements_cst_core::{Node, NodeKind, RequirementFile};
use std::fmt::{self, Write};

/// Renders a parsed file as one `Kind(field="value", ...)` line per node
pub struct DumpRenderer {
    show_colors: bool,
}

impl DumpRenderer {
    pub fn new(show_colors: bool) -> Self {
        Self { show_colors }
    }

    /// Print the dump to stdout
    pub fn render(&self, doc: &RequirementFile, indent: &str) -> fmt::Result {
        print!("{}", self.render_to_string(doc, indent)?);
        Ok(())
    }

    pub fn render_to_string(
        &self,
        doc: &RequirementFile,
        indent: &str,
    ) -> Result<String, fmt::Error> {
        let mut out = String::new();
        for node in doc {
            self.write_node(&mut out, node, indent)?;
        }
        Ok(out)
    }

    fn write_node<W: Write + ?Sized>(
        &self,
        out: &mut W,
        node: &Node,
        indent: &str,
    ) -> fmt::Result {
        if !self.show_colors {
            return node.dump(out, indent);
        }

        let mut line = String::new();
        node.dump(&mut line, indent)?;
        let kind = node.kind();
        let rest = &line[indent.len() + kind.as_str().len()..];
        write!(out, "{indent}{}{rest}", self.format_kind(kind))
    }

    fn format_kind(&self, kind: NodeKind) -> ColoredString {
        let name = kind.as_str();
        match kind {
            NodeKind::UnparsedLine => name.dimmed(),
            NodeKind::LocalPathRequirementLine => name.cyan(),
            NodeKind::VcsRequirementLine => name.magenta(),
            NodeKind::RequirementLine => name.green().bold(),
        }
    }
}

/// Render the nodes as pretty-printed JSON
pub fn render_json(doc: &RequirementFile) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}
