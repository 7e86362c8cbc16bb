//! Elaboration-time static analysis of component designs.
//!
//! Given a component tree whose behavior lives in small update blocks and
//! helper functions, this crate works out exactly which signals every block
//! reads and writes and which functions it reaches, aggregates that across the
//! whole hierarchy, and checks the result against hardware-legality rules.
//!
//! # Usage
//!
//! ```ignore
//! let (mut design, root) = build_design(&config)?;
//! let mut elab = Elaborator::new(ElabOptions::from(&config.elaborate));
//! elab.elaborate(&mut design, root)?;
//! elab.check(&design)?;
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod build;
pub mod cache;
pub mod callgraph;
pub mod check;
pub mod elaborator;
pub mod errors;
pub mod local;
pub mod report;
pub mod resolve;

pub use aggregate::{Aggregate, Summary};
pub use build::build_design;
pub use cache::{ChainCache, DeclKey, ExtractedBody};
pub use check::{LegalityChecker, LegalityRule};
pub use elaborator::{ElabOptions, Elaborator};
pub use errors::{AccessRule, CallPath, ElabError, WriterConflict};
pub use local::{AccessSets, LocalMeta, Owner};
pub use report::render_report;
pub use resolve::{RefSite, Resolver};

use weft_config::ProjectConfig;
use weft_ir::{ComponentId, Design};

/// A constructed, elaborated and (if configured) checked design.
#[derive(Debug)]
pub struct Elaborated {
    /// The object graph.
    pub design: Design,
    /// Its root component.
    pub root: ComponentId,
    /// Elaboration state bound to `root`.
    pub elaborator: Elaborator,
}

/// Builds the design described by `config`, elaborates it and runs the
/// legality checker unless `elaborate.check` is off.
pub fn elaborate_project(config: &ProjectConfig) -> Result<Elaborated, ElabError> {
    let (mut design, root) = build_design(config)?;
    let mut elaborator = Elaborator::new(ElabOptions::from(&config.elaborate));
    elaborator.elaborate(&mut design, root)?;
    if config.elaborate.check {
        elaborator.check(&design)?;
    }
    Ok(Elaborated {
        design,
        root,
        elaborator,
    })
}
