//! Fatal conditions raised while locating, splitting and assembling tex files.

use failure::Fail;
use std::fmt;

/// Errors that stop a compilation run.
///
/// Each variant is fatal: `main` prints it and the process exits with a
/// non-zero status.
#[derive(Debug, Fail, PartialEq)]
pub enum CompileError {
    /// Zero or several files matched a glob that must match exactly once.
    #[fail(
        display = "Found {} files matching `{}` in {}. Specify one please.",
        found, pattern, location
    )]
    FileSelectionAmbiguity {
        pattern: String,
        location: String,
        found: usize,
    },

    /// A required marker is missing, duplicated, or out of place.
    #[fail(display = "{}", _0)]
    StructuralMismatch(Mismatch),

    /// A label line did not yield an identifier.
    #[fail(display = "Could not read a label from line {}: `{}`", line, text)]
    LabelFormat { line: usize, text: String },
}

/// The ways a tex file's structure can disagree with what is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// A marker that must be unique was found `found` times.
    MarkerCount {
        marker: String,
        source: String,
        found: usize,
    },

    /// The document start marker does not precede the document end marker.
    MarkerOrder { begin: usize, end: usize },

    /// Figure begin, end and label counts differ.
    FigureCounts {
        begins: usize,
        ends: usize,
        labels: usize,
    },

    /// Figure `figure` (zero based) is not laid out as begin, label, end.
    FigureNesting { figure: usize, line: usize },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mismatch::MarkerCount {
                marker,
                source,
                found,
            } => write!(
                f,
                "Expected exactly one `{}` in {}, found {}.",
                marker, source, found
            ),
            Mismatch::MarkerOrder { begin, end } => write!(
                f,
                "Document begins at line {} but ends at line {}.",
                begin + 1,
                end + 1
            ),
            Mismatch::FigureCounts {
                begins,
                ends,
                labels,
            } => write!(
                f,
                "Found {} figure beginnings, {} figure endings and {} labels; they must be equal.",
                begins, ends, labels
            ),
            Mismatch::FigureNesting { figure, line } => write!(
                f,
                "Figure {} is not laid out as begin, label, end (line {}).",
                figure + 1,
                line + 1
            ),
        }
    }
}

impl From<Mismatch> for CompileError {
    fn from(mismatch: Mismatch) -> Self {
        CompileError::StructuralMismatch(mismatch)
    }
}
