//! Formatting for consistent user-facing messages.

use std::path::Path;

/// Used once every output of a run has been written.
pub(super) fn successful(outfile: &Path, formats: &str) {
    println!(
        "`{}` has been exported as {} successfully.",
        outfile.display(),
        formats
    )
}

/// Used when a file or folder cannot be operated on.
pub(super) fn could_not_path(action: &str, path: &Path) -> String {
    format!("Could not {} {}.", action, path.display())
}

/// Used when no figures are available to crop.
pub(super) fn nothing_to_crop(folder: &Path) -> String {
    format!("No PDF figures found in {}, nothing to crop.", folder.display())
}

/// Used when a chapter is left out of every split.
pub(super) fn unclaimed_chapter(line: usize, text: &str, keywords: &[String]) -> String {
    let labels: Vec<String> = keywords
        .iter()
        .map(|keyword| format!("`{}-`", keyword))
        .collect();

    format!(
        "Chapter at line {} is not labelled {} and is left out: {}",
        line,
        labels.join(" or "),
        text
    )
}
