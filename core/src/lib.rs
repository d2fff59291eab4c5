//! Lossless concrete syntax tree for pip requirements files.
//!
//! Every physical line becomes one [`Node`]; building the nodes back
//! reproduces the input, except that a missing final terminator is added.
//!
//! ```
//! use requirements_cst_core::{NodeKind, RequirementFile};
//!
//! let doc = RequirementFile::parse("-r base.txt\nrequests>=2.0  # http\n").unwrap();
//! assert_eq!(doc.children()[1].kind(), NodeKind::RequirementLine);
//! assert_eq!(doc.to_string(), "-r base.txt\nrequests>=2.0  # http\n");
//! ```

mod cursor;

pub mod classifier;
pub mod document;
pub mod marker;
pub mod node;
pub mod specifier;
pub mod version;

// Re-export commonly used types at crate root
pub use classifier::classify_line;
pub use document::{RequirementFile, normalize};
pub use marker::{MarkerError, MarkerTree};
pub use node::{LineParts, Node, NodeKind, UnparsedLine};
pub use specifier::{Requirement, Specifier, SpecifierError, SpecifierErrorKind};
pub use version::{Version, VersionError};
