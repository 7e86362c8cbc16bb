//! Shared steps of `check` and `dump`: locating `weft.toml`, building and
//! elaborating the design, and rendering a failure.

use std::path::{Path, PathBuf};

use weft_config::{load_config, ProjectConfig, CONFIG_FILE};
use weft_diagnostics::{DiagnosticRenderer, TerminalRenderer};
use weft_elaborate::{build_design, ElabError, ElabOptions, Elaborated, Elaborator};
use weft_source::SourceDb;

use crate::GlobalArgs;

/// A failed run, with whatever block sources were registered before it.
#[derive(Debug)]
pub struct Failure {
    /// What went wrong.
    pub error: ElabError,
    /// Sources for locating the error.
    pub sources: SourceDb,
}

impl Failure {
    fn bare(error: ElabError) -> Self {
        Self {
            error,
            sources: SourceDb::new(),
        }
    }

    /// Renders the failure as a diagnostic on stderr.
    pub fn render(&self, color: bool) {
        let renderer = TerminalRenderer::new(color);
        eprintln!(
            "{}",
            renderer.render(&self.error.to_diagnostic(), &self.sources)
        );
    }
}

/// Walks up from `start` looking for the nearest directory containing `weft.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// The config path from `--config`, or the nearest project root.
pub fn resolve_config_path(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref path) => Ok(PathBuf::from(path)),
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Loads `weft.toml` from a file or project directory.
pub fn load(path: &Path) -> Result<ProjectConfig, Failure> {
    load_config(path).map_err(|e| Failure::bare(e.into()))
}

/// Builds, elaborates and (unless disabled) checks the project.
pub fn elaborate(config: &ProjectConfig) -> Result<Elaborated, Failure> {
    let (mut design, root) = build_design(config).map_err(Failure::bare)?;
    let mut elaborator = Elaborator::new(ElabOptions::from(&config.elaborate));
    let result = elaborator.elaborate(&mut design, root).and_then(|()| {
        if config.elaborate.check {
            elaborator.check(&design)
        } else {
            Ok(())
        }
    });
    match result {
        Ok(()) => Ok(Elaborated {
            design,
            root,
            elaborator,
        }),
        Err(error) => Err(Failure {
            error,
            sources: design.sources,
        }),
    }
}

/// Loads and elaborates, printing the `Checking` banner in between.
pub fn run(global: &GlobalArgs) -> Result<Result<Elaborated, Failure>, Box<dyn std::error::Error>> {
    let path = resolve_config_path(global)?;
    tracing::debug!(path = %path.display(), "loading config");
    let config = match load(&path) {
        Ok(config) => config,
        Err(failure) => return Ok(Err(failure)),
    };
    if !global.quiet {
        eprintln!(
            "   Checking {} v{}",
            config.project.name, config.project.version
        );
    }
    Ok(elaborate(&config))
}
