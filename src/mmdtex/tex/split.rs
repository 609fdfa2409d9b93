//! Splitting figures, chapters and appendices into files of their own.
//!
//! Both splits pair start markers with end markers by position and slice
//! the lines in between. Figures carry explicit end markers, chapters end
//! where the next one begins.

use failure::{Error, ResultExt};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::labels::LabelPattern;
use super::tokens::{self, Token};
use super::{Mode, TexFile};
use crate::mmdtex::errors::{CompileError, Mismatch};
use crate::mmdtex::settings::Markers;

/// Lines `start..=end` of a tex file, named after their label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// A segment that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub name: String,
    pub path: PathBuf,

    /// The `\input` or `\include` line that pulls the file back in.
    pub reference: String,
}

/// How chapters or appendices are picked out of a document body.
#[derive(Debug, Clone)]
pub struct ChapterSplit {
    /// `chapter` or `appendix`, the prefix of the label and of the filename.
    pub keyword: String,

    /// Appended as `\input{...}` to every file, if set.
    pub bib_include: Option<String>,
}

/// Finds every figure and checks that figures and labels line up.
///
/// # Errors
///
/// - The counts of `\begin{figure}`, `\end{figure}` and labels differ.
///
/// - A figure's label lies outside it, or figures overlap.
///
/// - A label line does not yield a name, or the name holds a path
/// separator.
pub fn figure_segments(tex: &TexFile, markers: &Markers) -> Result<Vec<Segment>, CompileError> {
    let tokens = tokens::tokenize(tex, markers);
    let begins = tokens::lines_of(&tokens, Token::FigureBegin);
    let ends = tokens::lines_of(&tokens, Token::FigureEnd);
    let labels = tokens::lines_of(&tokens, Token::Label);

    if !(begins.len() == ends.len() && ends.len() == labels.len()) {
        return Err(Mismatch::FigureCounts {
            begins: begins.len(),
            ends: ends.len(),
            labels: labels.len(),
        }
        .into());
    }

    let pattern = LabelPattern::any();
    let mut segments = Vec::with_capacity(begins.len());

    for i in 0..begins.len() {
        if !(begins[i] <= labels[i] && labels[i] <= ends[i]) {
            return Err(Mismatch::FigureNesting {
                figure: i,
                line: labels[i],
            }
            .into());
        }

        if let Some(next) = begins.get(i + 1) {
            if ends[i] >= *next {
                return Err(Mismatch::FigureNesting {
                    figure: i + 1,
                    line: *next,
                }
                .into());
            }
        }

        let text = &tex.lines()[labels[i]];
        let name = file_name(labels[i], text, pattern.extract(labels[i], text)?)?;

        debug!("figure `{}` spans lines {}..={}", name, begins[i], ends[i]);

        segments.push(Segment {
            name,
            start: begins[i],
            end: ends[i],
        });
    }

    Ok(segments)
}

/// Finds the chapters whose label carries `split.keyword`.
///
/// A chapter runs from its `\chapter` line up to the line before the next
/// one, or to the end of `tex`. Its label is looked for on the `\chapter`
/// line and on the line right after it. Chapters labelled otherwise are
/// left to `unclaimed_chapters`.
///
/// # Errors
///
/// - A chapter name holds a path separator.
pub fn chapter_segments(
    tex: &TexFile,
    markers: &Markers,
    split: &ChapterSplit,
) -> Result<Vec<Segment>, Error> {
    let scoped = LabelPattern::scoped(&split.keyword)?;
    let mut segments = Vec::new();

    for (start, end) in chapter_spans(tex, markers) {
        let found = label_window(tex, start, end)
            .iter()
            .find_map(|text| scoped.find(text));

        if let Some(name) = found {
            let name = file_name(start, &tex.lines()[start], name)?;

            debug!(
                "{} `{}` spans lines {}..={}",
                split.keyword, name, start, end
            );

            segments.push(Segment {
                name: format!("{}{}", split.keyword, name),
                start,
                end,
            });
        }
    }

    Ok(segments)
}

/// The `\chapter` lines that no keyword in `keywords` claims.
///
/// These are chapters with no label at all, and chapters carrying a label
/// such as pandoc's automatic `\label{introduction}`.
pub fn unclaimed_chapters(
    tex: &TexFile,
    markers: &Markers,
    keywords: &[String],
) -> Result<Vec<usize>, Error> {
    let patterns = keywords
        .iter()
        .map(|keyword| LabelPattern::scoped(keyword))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(chapter_spans(tex, markers)
        .into_iter()
        .filter(|&(start, end)| {
            !label_window(tex, start, end)
                .iter()
                .any(|text| patterns.iter().any(|pattern| pattern.find(text).is_some()))
        })
        .map(|(start, _)| start)
        .collect())
}

/// First and last line of every chapter.
fn chapter_spans(tex: &TexFile, markers: &Markers) -> Vec<(usize, usize)> {
    let starts = tokens::lines_of(&tokens::tokenize(tex, markers), Token::ChapterBegin);

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| match starts.get(i + 1) {
            Some(next) => (start, next - 1),
            None => (start, tex.len() - 1),
        })
        .collect()
}

fn label_window(tex: &TexFile, start: usize, end: usize) -> &[String] {
    &tex.lines()[start..=usize::min(start + 1, end)]
}

/// Names become file names, so they may not leave their folder.
fn file_name(line: usize, text: &str, name: String) -> Result<String, CompileError> {
    if name.contains('/') || name.contains('\\') {
        return Err(CompileError::LabelFormat {
            line: line + 1,
            text: text.to_string(),
        });
    }

    Ok(name)
}

/// Counts the non-blank lines that come before the first chapter and
/// therefore end up in no chapter file.
pub fn lines_before_chapters(tex: &TexFile, markers: &Markers) -> usize {
    let first = tex
        .locate(&markers.chapter, Mode::All)
        .unwrap_or_default()
        .first()
        .copied()
        .unwrap_or_else(|| tex.len());

    tex.lines()[..first]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .count()
}

/// Writes each figure to `<folder>/<label>.tex` followed by a blank line.
///
/// Returns an `\input` reference per figure, relative to `base`.
pub fn split_figures(
    tex: &TexFile,
    markers: &Markers,
    folder: &Path,
    base: &Path,
) -> Result<Vec<Written>, Error> {
    let segments = figure_segments(tex, markers)?;

    write_segments(tex, &segments, folder, base, "input", |lines| {
        lines.push(String::new())
    })
}

/// Writes each chapter matching `split` to `<folder>/<keyword><name>.tex`.
///
/// Returns an `\include` reference per chapter, relative to `base`, in
/// document order.
pub fn split_chapters(
    tex: &TexFile,
    markers: &Markers,
    split: &ChapterSplit,
    folder: &Path,
    base: &Path,
) -> Result<Vec<Written>, Error> {
    let segments = chapter_segments(tex, markers, split)?;

    write_segments(tex, &segments, folder, base, "include", |lines| {
        if let Some(bib) = &split.bib_include {
            lines.push(format!("\\input{{{}}}", bib));
        }
    })
}

fn write_segments<F>(
    tex: &TexFile,
    segments: &[Segment],
    folder: &Path,
    base: &Path,
    command: &str,
    finish: F,
) -> Result<Vec<Written>, Error>
where
    F: Fn(&mut Vec<String>),
{
    if !segments.is_empty() {
        fs::create_dir_all(folder)
            .with_context(|_| format!("Could not create {}.", folder.display()))?;
    }

    let mut written = Vec::with_capacity(segments.len());

    for segment in segments {
        let path = folder.join(format!("{}.tex", segment.name));

        let mut lines = tex.slice(segment.start, segment.end);
        finish(&mut lines);

        TexFile::from_lines(&segment.name, lines).write(&path)?;

        written.push(Written {
            name: segment.name.clone(),
            reference: format!("\\{}{{{}}}", command, reference_path(&path, base)),
            path,
        });
    }

    Ok(written)
}

/// `path` relative to `base`, without its extension and with `/` separators.
///
/// Paths outside `base` are kept as they are.
pub fn reference_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);

    relative
        .with_extension("")
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;

    use super::*;

    const FIGURES: &str = "\
% figures
\\begin{figure}
\\includegraphics{figures/cropped/a.pdf}
\\caption{First.}\\label{fig:a}
\\end{figure}

\\begin{figure}
\\includegraphics{figures/cropped/b.pdf}
\\label{fig:b}
\\end{figure}
";

    const BODY: &str = "\
Preface text.
\\chapter{Introduction}\\label{chapter-intro}
Intro text.
\\chapter{Untitled}
Stray text.
\\chapter{Methods}
\\label{chapter-methods}
Methods text.
\\chapter{Data}\\label{appendix-data}
Data text.
";

    fn chapters(bib: Option<&str>) -> ChapterSplit {
        ChapterSplit {
            keyword: String::from("chapter"),
            bib_include: bib.map(String::from),
        }
    }

    #[test]
    fn figures_become_one_file_per_label() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("figures/texs");
        let tex = TexFile::parse("figures.tex", FIGURES);

        let written = split_figures(&tex, &Markers::default(), &folder, dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0].name, "fig:a");
        assert_eq!(written[1].reference, "\\input{figures/texs/fig:b}");
        assert_eq!(
            fs::read_to_string(folder.join("fig:a.tex")).unwrap(),
            "\\begin{figure}\n\\includegraphics{figures/cropped/a.pdf}\n\\caption{First.}\\label{fig:a}\n\\end{figure}\n\n"
        );
        assert_eq!(
            fs::read_to_string(folder.join("fig:b.tex")).unwrap(),
            "\\begin{figure}\n\\includegraphics{figures/cropped/b.pdf}\n\\label{fig:b}\n\\end{figure}\n\n"
        );
    }

    #[test]
    fn missing_figure_label_is_a_count_mismatch() {
        let tex = TexFile::parse(
            "figures.tex",
            "\\begin{figure}\n\\label{fig:a}\n\\end{figure}\n\\begin{figure}\n\\end{figure}\n",
        );

        assert_eq!(
            figure_segments(&tex, &Markers::default()),
            Err(CompileError::StructuralMismatch(Mismatch::FigureCounts {
                begins: 2,
                ends: 2,
                labels: 1,
            }))
        );
    }

    #[test]
    fn any_unequal_pair_of_counts_fails() {
        // Equal begins and labels must not hide a missing end.
        let tex = TexFile::parse(
            "figures.tex",
            "\\begin{figure}\n\\label{fig:a}\n\\begin{figure}\n\\label{fig:b}\n\\end{figure}\n",
        );

        assert!(figure_segments(&tex, &Markers::default()).is_err());
    }

    #[test]
    fn label_outside_its_figure_fails() {
        let tex = TexFile::parse(
            "figures.tex",
            "\\label{fig:a}\n\\begin{figure}\n\\end{figure}\n",
        );

        assert_eq!(
            figure_segments(&tex, &Markers::default()),
            Err(CompileError::StructuralMismatch(Mismatch::FigureNesting {
                figure: 0,
                line: 0,
            }))
        );
    }

    #[test]
    fn labelled_chapters_are_kept_in_order() {
        let tex = TexFile::parse("body.tex", BODY);

        let segments = chapter_segments(&tex, &Markers::default(), &chapters(None)).unwrap();

        assert_eq!(
            segments,
            vec![
                Segment {
                    name: String::from("chapterintro"),
                    start: 1,
                    end: 2,
                },
                Segment {
                    name: String::from("chaptermethods"),
                    start: 5,
                    end: 7,
                },
            ]
        );
    }

    #[test]
    fn appendix_pass_takes_only_appendices() {
        let tex = TexFile::parse("body.tex", BODY);
        let split = ChapterSplit {
            keyword: String::from("appendix"),
            bib_include: None,
        };

        let segments = chapter_segments(&tex, &Markers::default(), &split).unwrap();

        assert_eq!(
            segments,
            vec![Segment {
                name: String::from("appendixdata"),
                start: 8,
                end: 9,
            }]
        );
    }

    #[test]
    fn unlabelled_and_auto_labelled_chapters_are_unclaimed() {
        let tex = TexFile::parse(
            "body.tex",
            &format!("{}\\chapter{{Results}}\\label{{results}}\nMore text.\n", BODY),
        );
        let keywords = [String::from("chapter"), String::from("appendix")];

        assert_eq!(
            unclaimed_chapters(&tex, &Markers::default(), &keywords).unwrap(),
            vec![3, 10]
        );
    }

    #[test]
    fn overlapping_figures_fail() {
        let tex = TexFile::parse(
            "figures.tex",
            "\\begin{figure}\n\\begin{figure}\n\\label{fig:a}\n\\label{fig:b}\n\\end{figure}\n\\end{figure}\n",
        );

        assert_eq!(
            figure_segments(&tex, &Markers::default()),
            Err(CompileError::StructuralMismatch(Mismatch::FigureNesting {
                figure: 1,
                line: 1,
            }))
        );
    }

    #[test]
    fn figure_on_a_single_line_is_accepted() {
        let tex = TexFile::parse(
            "figures.tex",
            "\\begin{figure}\\includegraphics{a.pdf}\\label{fig:a}\\end{figure}\n",
        );

        assert_eq!(
            figure_segments(&tex, &Markers::default()),
            Ok(vec![Segment {
                name: String::from("fig:a"),
                start: 0,
                end: 0,
            }])
        );
    }

    #[test]
    fn labels_with_path_separators_are_rejected() {
        let tex = TexFile::parse(
            "figures.tex",
            "\\begin{figure}\n\\label{../escape}\n\\end{figure}\n",
        );

        assert_eq!(
            figure_segments(&tex, &Markers::default()),
            Err(CompileError::LabelFormat {
                line: 2,
                text: String::from("\\label{../escape}"),
            })
        );

        let body = TexFile::parse("body.tex", "\\chapter{One}\\label{chapter-a\\b}\n");
        let error = chapter_segments(&body, &Markers::default(), &chapters(None)).unwrap_err();

        assert_eq!(
            error.downcast::<CompileError>().unwrap(),
            CompileError::LabelFormat {
                line: 1,
                text: String::from("\\chapter{One}\\label{chapter-a\\b}"),
            }
        );
    }

    #[test]
    fn chapter_files_end_with_the_bibliography_input() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("chapters");
        let tex = TexFile::parse("body.tex", BODY);

        let written = split_chapters(
            &tex,
            &Markers::default(),
            &chapters(Some("chapter-bibliography")),
            &folder,
            dir.path(),
        )
        .unwrap();

        let references: Vec<&str> = written.iter().map(|w| w.reference.as_str()).collect();
        assert_eq!(
            references,
            vec![
                "\\include{chapters/chapterintro}",
                "\\include{chapters/chaptermethods}"
            ]
        );
        assert_eq!(
            fs::read_to_string(folder.join("chapterintro.tex")).unwrap(),
            "\\chapter{Introduction}\\label{chapter-intro}\nIntro text.\n\\input{chapter-bibliography}\n"
        );
    }

    #[test]
    fn rerunning_a_split_overwrites_with_identical_files() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("chapters");
        let tex = TexFile::parse("body.tex", BODY);
        let split = chapters(None);

        split_chapters(&tex, &Markers::default(), &split, &folder, dir.path()).unwrap();
        let first = fs::read(folder.join("chaptermethods.tex")).unwrap();

        split_chapters(&tex, &Markers::default(), &split, &folder, dir.path()).unwrap();
        let second = fs::read(folder.join("chaptermethods.tex")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn preface_lines_are_counted() {
        let tex = TexFile::parse("body.tex", BODY);

        assert_eq!(lines_before_chapters(&tex, &Markers::default()), 1);
    }

    #[test]
    fn references_outside_base_stay_absolute() {
        assert_eq!(
            reference_path(Path::new("/elsewhere/chapters/one.tex"), Path::new("/thesis")),
            "/elsewhere/chapters/one"
        );
    }
}
