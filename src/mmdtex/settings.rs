//! Settings and markers

use failure::{Error, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Literal substrings that identify structural boundaries in tex files.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Markers {
    pub document_begin: String,
    pub document_end: String,

    /// The line of the main template that generated content replaces.
    pub insertion: String,

    pub figure_begin: String,
    pub figure_end: String,
    pub label: String,
    pub chapter: String,

    /// Separates chapter includes from appendix includes.
    pub back_matter: String,
}

impl Default for Markers {
    fn default() -> Self {
        Markers {
            document_begin: String::from("\\begin{document}"),
            document_end: String::from("\\end{document}"),
            insertion: String::from("\\input{scrivener-input.tex}"),
            figure_begin: String::from("\\begin{figure}"),
            figure_end: String::from("\\end{figure}"),
            label: String::from("label{"),
            chapter: String::from("\\chapter"),
            back_matter: String::from("\\appendix"),
        }
    }
}

/// Tools, margins and splitting policy, stored in mmdtex.toml.
///
/// Linux: ~/.config/mmdtex/mmdtex.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub pandoc: String,

    /// LaTeX engine used for typesetting
    pub engine: String,

    pub bibtex: String,
    pub pdfcrop: String,

    /// Margins handed to pdfcrop, left top right bottom.
    pub crop_margins: String,

    pub chapter_keyword: String,
    pub appendix_keyword: String,

    /// Skip chapters without any label instead of failing.
    pub drop_unlabeled_chapters: bool,

    /// Input appended to every chapter and appendix file unless a single
    /// bibliography is used.
    pub chapter_bib_include_path: String,

    pub markers: Markers,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            pandoc: String::from("pandoc"),
            engine: String::from("pdflatex"),
            bibtex: String::from("bibtex"),
            pdfcrop: String::from("pdfcrop"),
            crop_margins: String::from("0 20 0 20"),
            chapter_keyword: String::from("chapter"),
            appendix_keyword: String::from("appendix"),
            drop_unlabeled_chapters: true,
            chapter_bib_include_path: String::from("chapter-bibliography"),
            markers: Markers::default(),
        }
    }
}

impl Settings {
    /// Loads the settings stored under the program's name, creating the file
    /// with defaults on first use.
    pub fn load(program_name: &str) -> Result<Settings, Error> {
        let settings = confy::load(program_name)
            .with_context(|_| format!("could not read {}.toml", program_name))?;
        Ok(settings)
    }

    /// Loads settings from an explicit file.
    pub fn load_path(path: &Path) -> Result<Settings, Error> {
        let settings = confy::load_path(path)
            .with_context(|_| format!("could not read {}", path.display()))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn defaults_match_the_documented_markers() {
        let settings = Settings::default();

        assert_eq!(settings.crop_margins, "0 20 0 20");
        assert_eq!(settings.markers.insertion, "\\input{scrivener-input.tex}");
        assert!(settings.drop_unlabeled_chapters);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mmdtex.toml");
        fs::write(
            &path,
            "engine = \"xelatex\"\n\n[markers]\nback_matter = \"\\\\backmatter\"\n",
        )
        .unwrap();

        let settings = Settings::load_path(&path).unwrap();

        assert_eq!(settings.engine, "xelatex");
        assert_eq!(settings.markers.back_matter, "\\backmatter");
        assert_eq!(settings.markers.chapter, "\\chapter");
        assert_eq!(settings.pandoc, "pandoc");
    }
}
