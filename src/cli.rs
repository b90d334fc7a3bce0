//! Command-line interface for corpusprep
//!
//! Provides argument parsing using clap derive macros.

use crate::corpus::CorpusKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speech corpus normalization and Kaldi data preparation
#[derive(Parser, Debug)]
#[command(
    name = "corpusprep",
    version,
    about = "Normalize dysarthric speech corpora and emit Kaldi data directories"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a corpus tree and write the normalized dataset as JSON
    Parse {
        /// Root directory of the corpus
        corpus_root: PathBuf,

        /// Path of the dataset JSON artifact to write
        output_json: PathBuf,

        /// Corpus layout (default: from configuration)
        #[arg(long, value_enum)]
        corpus: Option<CorpusKind>,

        /// Overwrite the JSON artifact if it exists
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Filter, split and emit per-subset Kaldi data directories
    PrepareData {
        /// Path of a dataset JSON artifact produced by `parse`
        dataset_json: PathBuf,

        /// Output root; data directories land under <root>/data/<subset>
        output_root: PathBuf,

        /// Corpus layout (default: from configuration)
        #[arg(long, value_enum)]
        corpus: Option<CorpusKind>,

        /// Shuffle seed for the proportional random split
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Build the pronunciation dictionary artifacts
    PrepareDict {
        /// Pronunciation dictionary source (CMUdict format)
        dictionary: PathBuf,

        /// Output directory for the dictionary artifacts
        output_dir: PathBuf,

        /// Phone-symbol inventory file, one symbol per line
        #[arg(long, value_name = "PATH")]
        phone_symbols: Option<PathBuf>,
    },
}
