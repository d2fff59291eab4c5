use requirements_cst_core::{RequirementFile, normalize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("line {line} does not round-trip: expected {expected:?}, rebuilt {actual:?}")]
    LineMismatch {
        line: usize,
        expected: String,
        actual: String,
    },

    #[error("rebuilt text has {actual} lines, expected {expected}")]
    LineCount { expected: usize, actual: usize },
}

/// Verify that rebuilding `doc` reproduces `source`, allowing only the
/// terminator normalization of a final unterminated line
pub fn verify_roundtrip(source: &str, doc: &RequirementFile) -> Result<(), CheckError> {
    let expected = normalize(source);
    let actual = doc.to_string();
    if expected.as_ref() == actual {
        return Ok(());
    }

    let expected_lines: Vec<&str> = expected.split_inclusive('\n').collect();
    let actual_lines: Vec<&str> = actual.split_inclusive('\n').collect();

    for (idx, (want, got)) in expected_lines.iter().zip(&actual_lines).enumerate() {
        if want != got {
            return Err(CheckError::LineMismatch {
                line: idx + 1,
                expected: (*want).to_string(),
                actual: (*got).to_string(),
            });
        }
    }

    Err(CheckError::LineCount {
        expected: expected_lines.len(),
        actual: actual_lines.len(),
    })
}
