//! The compilation pipeline and its steps.

use failure::{Error, ResultExt};
use log::{info, warn};
use prettytable::{format, Attr, Cell, Row, Table};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mmdtex::errors::CompileError;
use crate::mmdtex::layout::{self, Layout, ONLY_FIGURES_SUFFIX};
use crate::mmdtex::settings::Settings;
use crate::mmdtex::tex::assemble::{self, assemble};
use crate::mmdtex::tex::split::{self, ChapterSplit, Written};
use crate::mmdtex::tex::TexFile;
use crate::mmdtex::tools::{Runner, Toolchain};

mod messages;

/// The tex file pandoc generates, in the base directory.
pub const TEMP_TEX: &str = "scrivener_mmd_compile_temp.tex";

/// What a single run builds.
#[derive(Debug, Clone)]
pub struct Job {
    pub mmd: PathBuf,

    /// Prefix of every output file.
    pub outfile: PathBuf,

    pub margins: String,

    /// Split chapters, appendices and figures into files of their own.
    pub split: bool,

    /// Only crop and split figures.
    pub figures_only: bool,

    pub crop: bool,

    /// Run bibtex once on the main document instead of once per chapter.
    pub single_bib: bool,
}

/// Runs every step `job` asks for, in order.
///
/// # Errors
///
/// - An input file cannot be found or read.
///
/// - A generated or hand-written tex file does not have the expected
/// markers.
///
/// - pandoc cannot be run or fails.
pub fn run<R: Runner>(
    job: &Job,
    layout: &Layout,
    settings: &Settings,
    runner: &R,
) -> Result<(), Error> {
    let mut compiler = Compiler {
        job,
        layout,
        settings,
        tools: Toolchain::new(runner, settings, &layout.base),
        template: TexFile::read(&layout.maintex()?)?,
        report: Vec::new(),
    };

    if job.figures_only {
        let figure_tex = layout.figure_tex()?;
        compiler.figures(&figure_tex)?;

        print_report(&compiler.report);
        messages::successful(&job.outfile, "a figures-only tex and pdf");

        return Ok(());
    }

    compiler.manuscript()?;

    if job.split {
        print_report(&compiler.report);
    }
    messages::successful(&job.outfile, "docx, tex and pdf");

    Ok(())
}

struct Compiler<'a, R: Runner> {
    job: &'a Job,
    layout: &'a Layout,
    settings: &'a Settings,
    tools: Toolchain<'a, R>,
    template: TexFile,

    /// Every segment written so far and what kind it is.
    report: Vec<(&'static str, Written)>,
}

impl<'a, R: Runner> Compiler<'a, R> {
    /// Converts the manuscript and typesets it as one or many tex files.
    fn manuscript(&mut self) -> Result<(), Error> {
        let docx = layout::with_suffix(&self.job.outfile, ".docx");
        self.tools
            .docx(&self.job.mmd, &self.layout.bibfile()?, &docx)?;

        let temp = self.layout.base.join(TEMP_TEX);
        self.tools.latex(&self.job.mmd, &temp)?;

        let generated = TexFile::read(&temp)?;
        let body = assemble::document_body(&generated, &self.settings.markers)?;
        let marker = assemble::insertion_line(&self.template, &self.settings.markers)?;
        let main_tex = layout::with_suffix(&self.job.outfile, ".tex");

        let bibliographies = if self.job.split {
            let (references, bibliographies) = self.chapters(&body)?;
            assemble(&self.template, marker, &references).write(&main_tex)?;

            match self.layout.optional_figure_tex()? {
                Some(figure_tex) => self.figures(&figure_tex)?,
                None => info!("No figures file found, leaving figures as they are"),
            }

            bibliographies
        } else {
            assemble(&self.template, marker, body.lines()).write(&main_tex)?;
            Vec::new()
        };

        info!("Wrote {}", main_tex.display());

        self.typeset(&main_tex, &bibliographies)
    }

    /// Writes chapter and appendix files.
    ///
    /// Returns the references that replace the insertion marker, and the
    /// aux files bibtex has to run on (none for a single bibliography).
    fn chapters(&mut self, body: &TexFile) -> Result<(Vec<String>, Vec<String>), Error> {
        let markers = &self.settings.markers;

        let stray = split::lines_before_chapters(body, markers);
        if stray > 0 {
            warn!(
                "{} lines before the first chapter are not part of any chapter file.",
                stray
            );
        }

        self.unclaimed(body)?;

        let bib_include = if self.job.single_bib {
            None
        } else {
            Some(self.settings.chapter_bib_include_path.clone())
        };

        let chapters = split::split_chapters(
            body,
            markers,
            &ChapterSplit {
                keyword: self.settings.chapter_keyword.clone(),
                bib_include: bib_include.clone(),
            },
            &self.layout.chapters(),
            &self.layout.base,
        )?;

        let appendices = split::split_chapters(
            body,
            markers,
            &ChapterSplit {
                keyword: self.settings.appendix_keyword.clone(),
                bib_include,
            },
            &self.layout.appendix(),
            &self.layout.base,
        )?;

        let references = assemble::chapter_references(
            &references_of(&chapters),
            &references_of(&appendices),
            &markers.back_matter,
        );

        let bibliographies = if self.job.single_bib {
            Vec::new()
        } else {
            chapters
                .iter()
                .chain(appendices.iter())
                .map(|written| split::reference_path(&written.path, &self.layout.base))
                .collect()
        };

        info!(
            "Split {} chapters and {} appendices",
            chapters.len(),
            appendices.len()
        );

        self.report
            .extend(chapters.into_iter().map(|written| ("chapter", written)));
        self.report
            .extend(appendices.into_iter().map(|written| ("appendix", written)));

        Ok((references, bibliographies))
    }

    /// Reports every chapter neither the chapter nor the appendix pass
    /// picks up, or fails on the first one if those must not be dropped.
    fn unclaimed(&self, body: &TexFile) -> Result<(), Error> {
        let keywords = [
            self.settings.chapter_keyword.clone(),
            self.settings.appendix_keyword.clone(),
        ];

        for line in split::unclaimed_chapters(body, &self.settings.markers, &keywords)? {
            let text = &body.lines()[line];

            if !self.settings.drop_unlabeled_chapters {
                return Err(CompileError::LabelFormat {
                    line: line + 1,
                    text: text.clone(),
                }
                .into());
            }

            warn!("{}", messages::unclaimed_chapter(line + 1, text, &keywords));
        }

        Ok(())
    }

    /// Crops figure PDFs, splits the figures file and typesets a document
    /// holding only the figures.
    fn figures(&mut self, figure_tex: &Path) -> Result<(), Error> {
        if self.job.crop {
            self.crop()?;
        }

        let figures = TexFile::read(figure_tex)?;
        let written = split::split_figures(
            &figures,
            &self.settings.markers,
            &self.layout.figure_texs(),
            &self.layout.base,
        )?;

        let marker = assemble::insertion_line(&self.template, &self.settings.markers)?;
        let only_figures = layout::with_suffix(
            &self.job.outfile,
            &format!("{}.tex", ONLY_FIGURES_SUFFIX),
        );

        assemble(&self.template, marker, &references_of(&written)).write(&only_figures)?;
        info!(
            "Wrote {} with {} figures",
            only_figures.display(),
            written.len()
        );

        self.tools.typeset(&relative_tex(&only_figures, &self.layout.base))?;

        self.report
            .extend(written.into_iter().map(|written| ("figure", written)));

        Ok(())
    }

    /// Crops every PDF in the figure source folder into the destination
    /// folder.
    fn crop(&self) -> Result<(), Error> {
        let src = self.layout.figure_src();
        let dst = self.layout.figure_dst();

        let pdfs = layout::files_in(&src, "*.pdf")?;
        if pdfs.is_empty() {
            warn!("{}", messages::nothing_to_crop(&src));
            return Ok(());
        }

        fs::create_dir_all(&dst).with_context(|_| messages::could_not_path("create", &dst))?;

        for pdf in &pdfs {
            if let Some(name) = pdf.file_name() {
                self.tools.crop(pdf, &dst.join(name), &self.job.margins)?;
            }
        }

        info!("Cropped {} figures into {}", pdfs.len(), dst.display());

        Ok(())
    }

    /// Engine, bibtex, engine, engine.
    ///
    /// bibtex runs on every entry of `bibliographies`, or on the main aux
    /// file when there are none.
    fn typeset(&self, main_tex: &Path, bibliographies: &[String]) -> Result<(), Error> {
        let tex = relative_tex(main_tex, &self.layout.base);

        self.tools.typeset(&tex)?;

        if bibliographies.is_empty() {
            let job_name = main_tex
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.tools.bibtex(&job_name)?;
        } else {
            for aux in bibliographies {
                self.tools.bibtex(aux)?;
            }
        }

        self.tools.typeset(&tex)?;
        self.tools.typeset(&tex)?;

        Ok(())
    }
}

fn references_of(written: &[Written]) -> Vec<String> {
    written
        .iter()
        .map(|written| written.reference.clone())
        .collect()
}

fn relative_tex(path: &Path, base: &Path) -> String {
    format!("{}.tex", split::reference_path(path, base))
}

/// Prints every written segment in a table.
///
/// If nothing was written, a helpful message is shown instead.
fn print_report(report: &[(&'static str, Written)]) {
    if report.is_empty() {
        println!("Nothing was split off.");
        println!("Label chapters as `chapter-<name>` or `appendix-<name>`, and figures inside their figure environment.");
        return;
    }

    let mut table = Table::new();

    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    table.set_titles(Row::new(vec![
        Cell::new("Kind").with_style(Attr::Bold),
        Cell::new("Name").with_style(Attr::Bold),
        Cell::new("File").with_style(Attr::Bold),
    ]));

    for (kind, written) in report {
        table.add_row(Row::new(vec![
            Cell::new(kind),
            Cell::new(&written.name),
            Cell::new(&written.path.display().to_string()),
        ]));
    }

    table.printstd();
}
