use clap::Parser;
use std::path::PathBuf;

/// Parse a pip requirements file and dump its syntax tree
#[derive(Parser, Debug, Clone)]
#[command(name = "rcst")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the requirements file
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Prefix for every dump line
    #[arg(long, value_name = "STR", default_value = "")]
    pub indent: String,

    /// Print the rebuilt file instead of the node dump
    #[arg(short, long, conflicts_with_all = ["json", "check"])]
    pub build: bool,

    /// Verify that rebuilding reproduces the file, and exit non-zero if not
    #[arg(short, long, conflicts_with = "json")]
    pub check: bool,

    /// Print the nodes as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log parser activity to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default tracing filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["rcst", "requirements.txt"]).unwrap();
        assert_eq!(args.path, PathBuf::from("requirements.txt"));
        assert_eq!(args.indent, "");
        assert!(!args.build && !args.check && !args.json);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_flags() {
        let args =
            Args::try_parse_from(["rcst", "-v", "--indent", "  ", "--no-color", "r.txt"]).unwrap();
        assert_eq!(args.indent, "  ");
        assert!(args.no_color);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_output_modes_conflict() {
        assert!(Args::try_parse_from(["rcst", "--build", "--json", "r.txt"]).is_err());
        assert!(Args::try_parse_from(["rcst", "--check", "--json", "r.txt"]).is_err());
        assert!(Args::try_parse_from(["rcst", "--build", "--check", "r.txt"]).is_err());
    }

    #[test]
    fn test_path_required() {
        assert!(Args::try_parse_from(["rcst"]).is_err());
    }
}
