//! Calls to pandoc, the LaTeX engine, bibtex and pdfcrop.

use failure::{Error, ResultExt};
use log::{info, warn};
use std::path::Path;
use std::process::Command;

use crate::mmdtex::settings::Settings;

/// Runs external programs.
pub trait Runner {
    /// Runs `program` with `args` inside `dir` and waits for it to finish.
    ///
    /// Returns whether the program exited successfully.
    ///
    /// # Errors
    ///
    /// - The program could not be started.
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<bool, Error>;
}

/// Spawns real processes.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[String], dir: &Path) -> Result<bool, Error> {
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .status()
            .with_context(|_| format!("Could not run `{}`. Is it installed?", program))?;

        Ok(status.success())
    }
}

/// The configured tools, run inside a base directory.
pub struct Toolchain<'a, R: Runner> {
    runner: &'a R,
    settings: &'a Settings,
    base: &'a Path,
}

impl<'a, R: Runner> Toolchain<'a, R> {
    pub fn new(runner: &'a R, settings: &'a Settings, base: &'a Path) -> Self {
        Toolchain {
            runner,
            settings,
            base,
        }
    }

    /// Converts `mmd` to a docx with a table of contents and bibliography.
    pub fn docx(&self, mmd: &Path, bibfile: &Path, out: &Path) -> Result<(), Error> {
        let args = vec![
            "-s".to_string(),
            "--bibliography".to_string(),
            arg(bibfile),
            "--toc".to_string(),
            "-f".to_string(),
            "markdown".to_string(),
            "-t".to_string(),
            "docx".to_string(),
            "-o".to_string(),
            arg(out),
            arg(mmd),
        ];

        self.required(&self.settings.pandoc, &args)
    }

    /// Converts `mmd` to a standalone report-class tex file with natbib
    /// citations.
    pub fn latex(&self, mmd: &Path, out: &Path) -> Result<(), Error> {
        let args = vec![
            "-s".to_string(),
            "--natbib".to_string(),
            "-f".to_string(),
            "markdown".to_string(),
            "-t".to_string(),
            "latex".to_string(),
            "-o".to_string(),
            arg(out),
            arg(mmd),
            "--variable".to_string(),
            "documentclass=report".to_string(),
        ];

        self.required(&self.settings.pandoc, &args)
    }

    /// Crops the white space around a PDF figure.
    pub fn crop(&self, src: &Path, dst: &Path, margins: &str) -> Result<(), Error> {
        let args = vec![
            "--margins".to_string(),
            margins.to_string(),
            arg(src),
            arg(dst),
        ];

        self.optional(&self.settings.pdfcrop, &args)
    }

    /// One pass of the LaTeX engine over `tex`.
    pub fn typeset(&self, tex: &str) -> Result<(), Error> {
        self.optional(&self.settings.engine, &[tex.to_string()])
    }

    /// Runs bibtex on the aux file named `aux`, without its extension.
    pub fn bibtex(&self, aux: &str) -> Result<(), Error> {
        self.optional(&self.settings.bibtex, &[aux.to_string()])
    }

    fn required(&self, program: &str, args: &[String]) -> Result<(), Error> {
        info!("{} {}", program, args.join(" "));

        let success = self.runner.run(program, args, self.base)?;
        failure::ensure!(success, "`{}` failed.", program);

        Ok(())
    }

    fn optional(&self, program: &str, args: &[String]) -> Result<(), Error> {
        info!("{} {}", program, args.join(" "));

        if !self.runner.run(program, args, self.base)? {
            warn!("`{} {}` exited with an error.", program, args.join(" "));
        }

        Ok(())
    }
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
