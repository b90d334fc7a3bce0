use crate::corpus::CorpusKind;
use crate::defaults::{
    DEFAULT_DEV_FRACTION, DEFAULT_OPTIONAL_SILENCE, DEFAULT_SENSOR, DEFAULT_SPLIT_SEED,
    DEFAULT_TEST_FRACTION, DEFAULT_TRAIN_FRACTION, MIN_AUDIO_BYTES,
};
use crate::export::ExportOptions;
use crate::lexicon::LexiconOptions;
use crate::split::SubsetRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusConfig,
    pub export: ExportConfig,
    pub split: SplitConfig,
    pub dict: DictConfig,
}

/// Corpus selection configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorpusConfig {
    pub kind: CorpusKind,
}

/// Export acceptance configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Sensor/microphone filter. Unset applies the corpus default; an empty
    /// string disables filtering.
    pub sensor: Option<String>,
    pub min_audio_bytes: u64,
}

/// Split strategy enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    Random,
    Block,
}

/// Dataset split configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub mode: SplitMode,
    pub train: f64,
    pub test: f64,
    pub dev: f64,
    pub seed: u64,
    pub train_blocks: Vec<String>,
    pub test_blocks: Vec<String>,
}

/// Dictionary preparation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DictConfig {
    pub optional_silence: String,
    pub silence_phones: Vec<String>,
    pub extra_words: BTreeMap<String, String>,
    pub add_silence_question: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            kind: CorpusKind::Torgo,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sensor: None,
            min_audio_bytes: MIN_AUDIO_BYTES,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            mode: SplitMode::Random,
            train: DEFAULT_TRAIN_FRACTION,
            test: DEFAULT_TEST_FRACTION,
            dev: DEFAULT_DEV_FRACTION,
            seed: DEFAULT_SPLIT_SEED,
            train_blocks: vec!["1".to_string(), "2".to_string()],
            test_blocks: vec!["3".to_string()],
        }
    }
}

impl Default for DictConfig {
    fn default() -> Self {
        let mut extra_words = BTreeMap::new();
        extra_words.insert("<SIL>".to_string(), "sil".to_string());
        extra_words.insert("<UNK>".to_string(), "nsn".to_string());
        Self {
            optional_silence: DEFAULT_OPTIONAL_SILENCE.to_string(),
            silence_phones: vec!["nsn".to_string()],
            extra_words,
            add_silence_question: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CORPUSPREP_SENSOR → export.sensor
    /// - CORPUSPREP_SEED → split.seed
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(sensor) = std::env::var("CORPUSPREP_SENSOR")
            && !sensor.is_empty()
        {
            self.export.sensor = Some(sensor);
        }

        if let Ok(seed) = std::env::var("CORPUSPREP_SEED")
            && let Ok(seed) = seed.parse()
        {
            self.split.seed = seed;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/corpusprep/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("corpusprep")
            .join("config.toml")
    }

    /// Export options for a corpus. TORGO defaults to the head-mounted
    /// microphone; an empty sensor string disables filtering.
    pub fn export_options(&self, kind: CorpusKind) -> ExportOptions {
        let sensor = self
            .export
            .sensor
            .clone()
            .or_else(|| match kind {
                CorpusKind::Torgo => Some(DEFAULT_SENSOR.to_string()),
                CorpusKind::Uaspeech => None,
            })
            .filter(|s| !s.is_empty());

        ExportOptions {
            sensor,
            min_audio_bytes: self.export.min_audio_bytes,
        }
    }

    /// Subset rules for the configured split strategy.
    pub fn split_rules(&self) -> Vec<(String, SubsetRule)> {
        match self.split.mode {
            SplitMode::Random => vec![
                ("train".to_string(), SubsetRule::Fraction(self.split.train)),
                ("test".to_string(), SubsetRule::Fraction(self.split.test)),
                ("dev".to_string(), SubsetRule::Fraction(self.split.dev)),
            ],
            SplitMode::Block => vec![
                (
                    "train".to_string(),
                    SubsetRule::block_membership(self.split.train_blocks.clone()),
                ),
                (
                    "test".to_string(),
                    SubsetRule::block_membership(self.split.test_blocks.clone()),
                ),
            ],
        }
    }

    /// Lexicon construction options from the dictionary section.
    pub fn lexicon_options(&self) -> LexiconOptions {
        LexiconOptions {
            optional_silence: self.dict.optional_silence.clone(),
            extra_words: self.dict.extra_words.clone(),
            extra_silence_phones: self.dict.silence_phones.iter().cloned().collect(),
            add_silence_question: self.dict.add_silence_question,
        }
    }
}
