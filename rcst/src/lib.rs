pub mod check;
pub mod cli;
pub mod output;

// Re-export core types for convenience
pub use requirements_cst_core::{
    LineParts, Node, NodeKind, RequirementFile, SpecifierError, UnparsedLine,
};
