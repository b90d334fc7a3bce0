use anyhow::Result;
use clap::Parser;
use corpusprep::cli::{Cli, Commands};
use corpusprep::config::Config;
use corpusprep::corpus::CorpusKind;
use corpusprep::dataset::Dataset;
use corpusprep::export::prepare_for_export;
use corpusprep::lexicon::{Lexicon, parse_dictionary, parse_phone_symbols};
use corpusprep::manifest::write_data_dirs;
use corpusprep::split::split;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse {
            corpus_root,
            output_json,
            corpus,
            overwrite,
        } => {
            run_parse(&config, &corpus_root, &output_json, corpus, overwrite, cli.quiet)?;
        }
        Commands::PrepareData {
            dataset_json,
            output_root,
            corpus,
            seed,
        } => {
            run_prepare_data(&config, &dataset_json, &output_root, corpus, seed, cli.quiet)?;
        }
        Commands::PrepareDict {
            dictionary,
            output_dir,
            phone_symbols,
        } => {
            run_prepare_dict(&config, &dictionary, &output_dir, phone_symbols, cli.quiet)?;
        }
    }

    Ok(())
}

/// Initialize tracing with a level derived from the CLI verbosity flags.
/// RUST_LOG directives still take precedence for individual targets.
fn init_tracing(quiet: bool, verbose: u8) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/corpusprep/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}

/// Walk a corpus tree and persist the normalized dataset.
fn run_parse(
    config: &Config,
    corpus_root: &Path,
    output_json: &Path,
    corpus: Option<CorpusKind>,
    overwrite: bool,
    quiet: bool,
) -> Result<()> {
    if output_json.exists() && !overwrite {
        warn!(
            "Dataset artifact {} already exists. Not overwriting.",
            output_json.display()
        );
        return Ok(());
    }

    let kind = corpus.unwrap_or(config.corpus.kind);
    info!("Parsing {} corpus at {}", kind, corpus_root.display());
    let dataset = kind.parse_tree(corpus_root)?;

    info!("Writing dataset artifact to {}", output_json.display());
    dataset.save(output_json)?;

    if !quiet {
        let anomalies = dataset.anomalies.len();
        let anomaly_note = if anomalies > 0 {
            format!("{} anomalies", anomalies).yellow().to_string()
        } else {
            "no anomalies".to_string()
        };
        println!(
            "{} {} utterances from {} speakers ({})",
            "✓".green(),
            dataset.utterances.len(),
            dataset.speakers.len(),
            anomaly_note
        );
    }
    Ok(())
}

/// Filter, split and emit the Kaldi data directories.
fn run_prepare_data(
    config: &Config,
    dataset_json: &Path,
    output_root: &Path,
    corpus: Option<CorpusKind>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let kind = corpus.unwrap_or(config.corpus.kind);
    let dataset = Dataset::load(dataset_json)?;

    let exported = prepare_for_export(&dataset, kind, &config.export_options(kind));
    if exported.utterances.is_empty() {
        anyhow::bail!(
            "No exportable utterances in {} — check the sensor filter and audio paths",
            dataset_json.display()
        );
    }

    let seed = seed.unwrap_or(config.split.seed);
    let subsets = split(&exported, config.split_rules(), seed)?;
    let dirs = write_data_dirs(&exported, &subsets, output_root)?;

    if !quiet {
        println!(
            "{} {} data directories under {}",
            "✓".green(),
            dirs.len(),
            output_root.join("data").display()
        );
        for (name, ids) in &subsets {
            println!("  {name}: {} utterances", ids.len());
        }
    }
    Ok(())
}

/// Build and write the pronunciation dictionary artifacts.
fn run_prepare_dict(
    config: &Config,
    dictionary: &Path,
    output_dir: &Path,
    phone_symbols: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    info!("Parsing dictionary {}", dictionary.display());
    let words = parse_dictionary(dictionary)?;

    let inventory = match &phone_symbols {
        Some(path) => Some(parse_phone_symbols(path)?),
        None => None,
    };

    let lexicon = Lexicon::build(words, inventory.as_deref(), &config.lexicon_options())?;
    lexicon.write(output_dir)?;

    if !quiet {
        println!(
            "{} {} words, {} nonsilence clusters, {} questions → {}",
            "✓".green(),
            lexicon.words.len(),
            lexicon.nonsilence_phones.len(),
            lexicon.extra_questions.len(),
            output_dir.display()
        );
    }
    Ok(())
}
