//! Corpus ingestion: path conventions, probing, and per-corpus walkers.
//!
//! `torgo` and `uaspeech` turn their respective directory layouts into the
//! shared [`Dataset`](crate::dataset::Dataset) model; the sibling modules
//! hold the pieces both walkers are built from.

pub mod audio;
pub mod mlf;
pub mod pattern;
pub mod roster;
pub mod stimuli;
pub mod timing;
pub mod torgo;
pub mod uaspeech;

use crate::dataset::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The supported corpus layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    Torgo,
    Uaspeech,
}

impl CorpusKind {
    /// Walk `root` with this corpus's conventions and build the dataset.
    pub fn parse_tree(self, root: &Path) -> Result<Dataset> {
        match self {
            CorpusKind::Torgo => torgo::parse(root),
            CorpusKind::Uaspeech => uaspeech::parse(root),
        }
    }
}

impl std::fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusKind::Torgo => write!(f, "torgo"),
            CorpusKind::Uaspeech => write!(f, "uaspeech"),
        }
    }
}
