//! Splicing generated content into the main template.

use super::TexFile;
use crate::mmdtex::errors::{CompileError, Mismatch};
use crate::mmdtex::settings::Markers;

/// Returns `template` with the line at `marker` replaced by `replacement`.
///
/// Every other line of `template` is kept as it is and in order.
pub fn assemble(template: &TexFile, marker: usize, replacement: &[String]) -> TexFile {
    let lines = template.lines();

    let mut assembled = Vec::with_capacity(lines.len() + replacement.len());
    assembled.extend_from_slice(&lines[..marker]);
    assembled.extend_from_slice(replacement);
    assembled.extend_from_slice(&lines[marker + 1..]);

    TexFile::from_lines(template.source(), assembled)
}

/// The lines strictly between `\begin{document}` and `\end{document}`.
///
/// # Errors
///
/// - Either marker is missing or appears more than once.
///
/// - The document ends before it begins.
pub fn document_body(generated: &TexFile, markers: &Markers) -> Result<TexFile, CompileError> {
    let begin = generated.locate_unique(&markers.document_begin)?;
    let end = generated.locate_unique(&markers.document_end)?;

    if begin >= end {
        return Err(Mismatch::MarkerOrder { begin, end }.into());
    }

    Ok(TexFile::from_lines(
        generated.source(),
        generated.lines()[begin + 1..end].to_vec(),
    ))
}

/// The template line that generated content replaces.
pub fn insertion_line(template: &TexFile, markers: &Markers) -> Result<usize, CompileError> {
    template.locate_unique(&markers.insertion)
}

/// Chapter references, then the back matter marker, then appendix
/// references.
///
/// The marker is only added when there are appendices to separate.
pub fn chapter_references(
    chapters: &[String],
    appendices: &[String],
    back_matter: &str,
) -> Vec<String> {
    let mut references = chapters.to_vec();

    if !appendices.is_empty() {
        references.push(back_matter.to_string());
        references.extend_from_slice(appendices);
    }

    references
}
