//! Tex files as line sequences, and marker lookup within them.

use failure::{Error, ResultExt};
use log::debug;
use std::fs;
use std::path::Path;

use crate::mmdtex::errors::{CompileError, Mismatch};

pub mod assemble;
pub mod labels;
pub mod split;
pub mod tokens;

/// How many matches `TexFile::locate` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Exactly one match, anything else is a structural mismatch.
    Unique,
    /// Every match, possibly none.
    All,
}

/// The content of a tex file as an ordered list of lines.
///
/// Lines are stored without their terminators. A `TexFile` is never edited
/// in place; slicing and assembly build new ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexFile {
    /// Where the lines came from, used in messages.
    source: String,

    lines: Vec<String>,
}

impl TexFile {
    /// Creates a `TexFile` from lines that did not come from disk.
    pub fn from_lines(source: &str, lines: Vec<String>) -> TexFile {
        TexFile {
            source: source.to_string(),
            lines,
        }
    }

    /// Splits `text` into lines.
    pub fn parse(source: &str, text: &str) -> TexFile {
        TexFile::from_lines(source, text.lines().map(String::from).collect())
    }

    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// - The file does not exist or is not valid UTF-8.
    pub fn read(path: &Path) -> Result<TexFile, Error> {
        let text = fs::read_to_string(path)
            .with_context(|_| format!("Could not read {}.", path.display()))?;

        Ok(TexFile::parse(&path.display().to_string(), &text))
    }

    /// Writes every line followed by a newline, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let mut text = self.lines.join("\n");
        text.push('\n');

        fs::write(path, text).with_context(|_| format!("Could not write {}.", path.display()))?;

        Ok(())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Finds the indices of lines containing `matchstr`, in file order.
    ///
    /// # Errors
    ///
    /// - `mode` is `Mode::Unique` and `matchstr` occurs on zero or several
    /// lines.
    pub fn locate(&self, matchstr: &str, mode: Mode) -> Result<Vec<usize>, CompileError> {
        let found: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(matchstr))
            .map(|(i, _)| i)
            .collect();

        debug!("`{}` in {}: lines {:?}", matchstr, self.source, found);

        if mode == Mode::Unique && found.len() != 1 {
            return Err(Mismatch::MarkerCount {
                marker: matchstr.to_string(),
                source: self.source.clone(),
                found: found.len(),
            }
            .into());
        }

        Ok(found)
    }

    /// Finds the single line containing `matchstr`.
    pub fn locate_unique(&self, matchstr: &str) -> Result<usize, CompileError> {
        let found = self.locate(matchstr, Mode::Unique)?;
        Ok(found[0])
    }

    /// Copies lines `start..=end`.
    pub fn slice(&self, start: usize, end: usize) -> Vec<String> {
        self.lines[start..=end].to_vec()
    }
}
