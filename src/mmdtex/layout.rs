//! Where input files live and where output goes.
//!
//! Every path is resolved against an explicit base directory; the process
//! working directory is never changed.

use failure::{Error, ResultExt};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::mmdtex::errors::CompileError;

/// Suffix of the figures-only document, kept out of the figures file lookup.
pub const ONLY_FIGURES_SUFFIX: &str = "-only-figures";

/// Default folder names, relative to the base directory.
const FIGURE_SRC: &str = "figures";
const FIGURE_DST: &str = "figures/cropped";
const FIGURE_TEXS: &str = "figures/texs";
const CHAPTERS: &str = "chapters";
const APPENDIX: &str = "appendix";

/// The base directory and any paths given explicitly on the command line.
///
/// Paths left as `None` are derived from the base directory when asked for.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub base: PathBuf,
    pub bibfile: Option<PathBuf>,
    pub maintex: Option<PathBuf>,
    pub figure_tex: Option<PathBuf>,
    pub figure_src: Option<PathBuf>,
    pub figure_dst: Option<PathBuf>,
    pub figure_texs: Option<PathBuf>,
    pub chapters: Option<PathBuf>,
    pub appendix: Option<PathBuf>,
}

impl Layout {
    /// A layout with every path derived from `base`.
    pub fn new(base: &Path) -> Layout {
        Layout {
            base: base.to_path_buf(),
            ..Layout::default()
        }
    }

    /// Joins relative paths onto the base directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }

    /// The bibliography, or the only `*.bib` in the base directory.
    pub fn bibfile(&self) -> Result<PathBuf, Error> {
        self.file_or_unique(&self.bibfile, "*.bib", |_| true)
    }

    /// The main template, or the only `*main.tex` in the base directory.
    pub fn maintex(&self) -> Result<PathBuf, Error> {
        self.file_or_unique(&self.maintex, "*main.tex", |_| true)
    }

    /// The hand-written figures file, or the only `*figures.tex` in the
    /// base directory that is not a figures-only document.
    pub fn figure_tex(&self) -> Result<PathBuf, Error> {
        self.file_or_unique(&self.figure_tex, "*figures.tex", |path| {
            !path
                .file_stem()
                .map(|stem| stem.to_string_lossy().ends_with(ONLY_FIGURES_SUFFIX))
                .unwrap_or(false)
        })
    }

    /// Like `figure_tex`, but a missing figures file is `None`.
    ///
    /// # Errors
    ///
    /// - Several figures files match.
    pub fn optional_figure_tex(&self) -> Result<Option<PathBuf>, Error> {
        match self.figure_tex() {
            Ok(path) => Ok(Some(path)),
            Err(error) => match error.downcast::<CompileError>() {
                Ok(CompileError::FileSelectionAmbiguity { found: 0, .. }) => Ok(None),
                Ok(other) => Err(other.into()),
                Err(error) => Err(error),
            },
        }
    }

    pub fn figure_src(&self) -> PathBuf {
        self.folder_or(&self.figure_src, FIGURE_SRC)
    }

    pub fn figure_dst(&self) -> PathBuf {
        self.folder_or(&self.figure_dst, FIGURE_DST)
    }

    pub fn figure_texs(&self) -> PathBuf {
        self.folder_or(&self.figure_texs, FIGURE_TEXS)
    }

    pub fn chapters(&self) -> PathBuf {
        self.folder_or(&self.chapters, CHAPTERS)
    }

    pub fn appendix(&self) -> PathBuf {
        self.folder_or(&self.appendix, APPENDIX)
    }

    fn folder_or(&self, explicit: &Option<PathBuf>, default: &str) -> PathBuf {
        match explicit {
            Some(path) => self.resolve(path),
            None => self.base.join(default),
        }
    }

    fn file_or_unique<F>(
        &self,
        explicit: &Option<PathBuf>,
        pattern: &str,
        keep: F,
    ) -> Result<PathBuf, Error>
    where
        F: Fn(&Path) -> bool,
    {
        match explicit {
            Some(path) => Ok(self.resolve(path)),
            None => unique_file(&self.base, pattern, keep),
        }
    }
}

/// Every file in `location` matching `pattern`, in glob order.
///
/// A missing `location` yields no files.
pub fn files_in(location: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&location.to_string_lossy()),
        pattern
    );

    let mut files = Vec::new();

    for entry in glob::glob(&full).with_context(|_| format!("Invalid pattern {}.", full))? {
        let path = entry.with_context(|_| format!("Could not read {}.", location.display()))?;

        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

/// Finds the one file in `location` matching `pattern` and `keep`.
///
/// # Errors
///
/// - No file or more than one file matches.
pub fn unique_file<F>(location: &Path, pattern: &str, keep: F) -> Result<PathBuf, Error>
where
    F: Fn(&Path) -> bool,
{
    let mut files: Vec<PathBuf> = files_in(location, pattern)?
        .into_iter()
        .filter(|path| keep(path))
        .collect();

    if files.len() != 1 {
        return Err(CompileError::FileSelectionAmbiguity {
            pattern: pattern.to_string(),
            location: location.display().to_string(),
            found: files.len(),
        }
        .into());
    }

    Ok(files.remove(0))
}

/// Appends `suffix` to the file name, leaving any existing extension in
/// place.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
