//! Label extraction

use failure::Error;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::mmdtex::errors::CompileError;

static ANY_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"label\{([^\s}]+)\}").unwrap());

/// A compiled `label{...}` pattern with one capture group for the name.
#[derive(Debug, Clone)]
pub struct LabelPattern {
    regex: Regex,
}

impl LabelPattern {
    /// Matches any label, as used inside figures.
    pub fn any() -> LabelPattern {
        LabelPattern {
            regex: (*ANY_LABEL).clone(),
        }
    }

    /// Matches `label{<keyword>-<name>}` and captures `<name>`.
    pub fn scoped(keyword: &str) -> Result<LabelPattern, Error> {
        let regex = Regex::new(&format!(r"label\{{{}-([^\s}}]+)\}}", regex::escape(keyword)))?;

        Ok(LabelPattern { regex })
    }

    /// Returns the captured name if `text` carries a matching label.
    pub fn find(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|name| name.as_str().to_string())
    }

    /// Like `find`, but a line that must carry a label and does not is an
    /// error.
    ///
    /// `line` is the zero based line index, reported one based.
    pub fn extract(&self, line: usize, text: &str) -> Result<String, CompileError> {
        self.find(text).ok_or_else(|| CompileError::LabelFormat {
            line: line + 1,
            text: text.to_string(),
        })
    }
}
