//! Argument parsing logic

use env_logger::Env;
use failure::{Error, ResultExt};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

use crate::mmdtex::layout::Layout;
use crate::mmdtex::pipeline::{self, Job};
use crate::mmdtex::settings::Settings;
use crate::mmdtex::tools::SystemRunner;

#[derive(Debug, StructOpt)]
#[structopt(name = "mmdtex")]
/// Converts Scrivener multimarkdown exports to docx, tex and pdf
///
/// Splices the generated LaTeX into a main tex file at the line
/// `\input{scrivener-input.tex}`, and can split it into chapter,
/// appendix and figure files.
///
/// Tools and markers are configured in mmdtex.toml, which is stored
/// in the following locations:
///
/// Linux: ~/.config/mmdtex/mmdtex.toml
///
pub struct Args {
    /// Multimarkdown file to be converted
    #[structopt(parse(from_os_str))]
    mmd: PathBuf,

    /// Working directory
    ///
    /// Relative paths are resolved against it. Defaults to the current
    /// directory.
    #[structopt(short, long, parse(from_os_str))]
    location: Option<PathBuf>,

    /// Bibtex file used to generate the docx bibliography
    ///
    /// Defaults to the only *.bib file in the working directory
    #[structopt(short, long, parse(from_os_str))]
    bibfile: Option<PathBuf>,

    /// Main tex file that controls appearance
    ///
    /// Defaults to the only *main.tex file in the working directory
    #[structopt(short, long, parse(from_os_str))]
    maintex: Option<PathBuf>,

    /// Prefix for generated files
    ///
    /// Defaults to the multimarkdown file without its extension
    #[structopt(short, long, parse(from_os_str))]
    outfile: Option<PathBuf>,

    /// Tex file holding every figure environment
    ///
    /// Defaults to the only *figures.tex file in the working directory
    #[structopt(long, parse(from_os_str))]
    figure_tex: Option<PathBuf>,

    /// Folder of figure PDFs to crop [default: figures]
    #[structopt(long, parse(from_os_str))]
    figure_src: Option<PathBuf>,

    /// Folder for cropped figure PDFs [default: figures/cropped]
    #[structopt(long, parse(from_os_str))]
    figure_dst: Option<PathBuf>,

    /// Folder for per-figure tex files [default: figures/texs]
    #[structopt(long, parse(from_os_str))]
    figure_texs: Option<PathBuf>,

    /// Folder for per-chapter tex files [default: chapters]
    #[structopt(long, parse(from_os_str))]
    chapters: Option<PathBuf>,

    /// Folder for per-appendix tex files [default: appendix]
    #[structopt(long, parse(from_os_str))]
    appendix: Option<PathBuf>,

    /// Margins passed to pdfcrop, e.g. "0 20 0 20"
    #[structopt(long)]
    margins: Option<String>,

    /// Split chapters, appendices and figures into separate files
    #[structopt(short, long)]
    split: bool,

    /// Only crop and split figures
    #[structopt(short, long)]
    figures_only: bool,

    /// Do not crop figure PDFs
    #[structopt(long)]
    no_crop: bool,

    /// Use one bibliography for the whole document
    #[structopt(long)]
    single_bib: bool,

    /// Settings file to use instead of the default one
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Print more detail, repeat for even more
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

impl Args {
    /// Sets up logging to stderr.
    ///
    /// The level follows `-v`, unless MMDTEX_LOG is set.
    pub fn init_logger(&self) {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(Env::new().filter_or("MMDTEX_LOG", level))
            .format_timestamp(None)
            .init();
    }

    /// Compiles the multimarkdown file as the arguments describe.
    pub fn execute(&self, program_name: &str) -> Result<(), Error> {
        let settings = match &self.config {
            Some(path) => Settings::load_path(path)?,
            None => Settings::load(program_name)?,
        };

        let current_dir =
            std::env::current_dir().with_context(|_| "Could not access the current directory.")?;

        let layout = self.layout(&current_dir);
        let job = self.job(&layout, &settings);

        pipeline::run(&job, &layout, &settings, &SystemRunner)
    }

    fn layout(&self, current_dir: &Path) -> Layout {
        let base = match &self.location {
            Some(location) => current_dir.join(location),
            None => current_dir.to_path_buf(),
        };

        Layout {
            bibfile: self.bibfile.clone(),
            maintex: self.maintex.clone(),
            figure_tex: self.figure_tex.clone(),
            figure_src: self.figure_src.clone(),
            figure_dst: self.figure_dst.clone(),
            figure_texs: self.figure_texs.clone(),
            chapters: self.chapters.clone(),
            appendix: self.appendix.clone(),
            ..Layout::new(&base)
        }
    }

    fn job(&self, layout: &Layout, settings: &Settings) -> Job {
        let outfile = match &self.outfile {
            Some(outfile) => outfile.clone(),
            None => self.mmd.with_extension(""),
        };

        Job {
            mmd: layout.resolve(&self.mmd),
            outfile: layout.resolve(&outfile),
            margins: self
                .margins
                .clone()
                .unwrap_or_else(|| settings.crop_margins.clone()),
            split: self.split,
            figures_only: self.figures_only,
            crop: !self.no_crop,
            single_bib: self.single_bib,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_the_working_directory() {
        let args = Args::from_iter(&["mmdtex", "thesis.md", "-l", "thesis"]);

        let layout = args.layout(Path::new("/home/me"));
        let job = args.job(&layout, &Settings::default());

        assert_eq!(layout.base, Path::new("/home/me/thesis"));
        assert_eq!(layout.chapters(), Path::new("/home/me/thesis/chapters"));
        assert_eq!(job.mmd, Path::new("/home/me/thesis/thesis.md"));
        assert_eq!(job.outfile, Path::new("/home/me/thesis/thesis"));
        assert_eq!(job.margins, "0 20 0 20");
        assert!(job.crop);
        assert!(!job.split);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::from_iter(&[
            "mmdtex",
            "draft.md",
            "-s",
            "--no-crop",
            "--single-bib",
            "--margins",
            "5 5 5 5",
            "-o",
            "/out/final",
            "--chapters",
            "parts",
        ]);

        let layout = args.layout(Path::new("/thesis"));
        let job = args.job(&layout, &Settings::default());

        assert!(job.split);
        assert!(!job.crop);
        assert!(job.single_bib);
        assert_eq!(job.margins, "5 5 5 5");
        assert_eq!(job.outfile, Path::new("/out/final"));
        assert_eq!(layout.chapters(), Path::new("/thesis/parts"));
    }
}
