//! Normalized dataset model shared by every corpus.
//!
//! A corpus walk produces one [`Dataset`]: a map of utterance id to
//! [`Utterance`] plus a speaker roster. Records are normalized here so that
//! the split and manifest layers never branch on which corpus they came from.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One time-aligned label, in seconds. Insertion order is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_time: f64,
    pub end_time: f64,
    pub symbol: String,
}

/// The prompt material a speaker was asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stimulus {
    ImageDescription { image_filename: String },
    Instruction { instruction: String },
    Prompt { prompt: String },
}

/// One recorded speech event.
///
/// `audio_sample_rate` and `audio_length` stay `None` whenever
/// `audio_filename` is `None` — timing facts are never fabricated for
/// missing media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub utterance_id: String,
    pub speaker_id: String,
    pub session_or_block: String,
    pub sensor_or_mic: String,
    pub audio_filename: Option<PathBuf>,
    pub audio_sample_rate: Option<u32>,
    pub audio_length: Option<f64>,
    /// Phone-level alignment in seconds, chronological.
    #[serde(default)]
    pub transcription: Vec<Segment>,
    pub stimulus: Option<Stimulus>,
    /// Identifies the physical audio file; shared when segmentation applies.
    pub recording_id: String,
    /// Segment boundaries within the recording, when the utterance does not
    /// span the whole file.
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    /// Word transcription used for export.
    pub text: Option<String>,
    /// Nominal prompt, when sourced independently of the transcription.
    pub prompt_text: Option<String>,
}

/// One corpus participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub speaker_id: String,
    /// Single-letter gender code, lowercase.
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motor_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligibility_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intelligibility_percentage: Option<f64>,
}

impl Speaker {
    pub fn new(speaker_id: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            gender: gender.into(),
            speaker_type: None,
            age: None,
            diagnosis: None,
            motor_control: None,
            intelligibility_class: None,
            intelligibility_percentage: None,
        }
    }
}

/// A data-quality finding recorded during ingestion. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    DuplicateUtteranceId {
        utterance_id: String,
        previous: Box<Utterance>,
        replacement: Box<Utterance>,
    },
    PromptMismatch {
        utterance_id: String,
        prompt: String,
        transcription: String,
    },
    MissingCompanion {
        utterance_id: String,
        path: PathBuf,
    },
}

/// The aggregate root: utterances keyed by id, plus the speaker roster and
/// the anomalies found while building them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub utterances: BTreeMap<String, Utterance>,
    pub speakers: BTreeMap<String, Speaker>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an utterance under its id. A colliding id overwrites the
    /// earlier record (last write wins) and records an anomaly; the walk
    /// never aborts on a duplicate.
    pub fn insert_utterance(&mut self, utterance: Utterance) {
        let id = utterance.utterance_id.clone();
        if let Some(previous) = self.utterances.insert(id.clone(), utterance.clone()) {
            warn!(
                "Duplicate utterance ID: {}.\nPrevious value:\n{}\nNew value:\n{}",
                id,
                pretty(&previous),
                pretty(&utterance)
            );
            self.anomalies.push(Anomaly::DuplicateUtteranceId {
                utterance_id: id,
                previous: Box::new(previous),
                replacement: Box::new(utterance),
            });
        }
    }

    pub fn insert_speaker(&mut self, speaker: Speaker) {
        self.speakers.insert(speaker.speaker_id.clone(), speaker);
    }

    pub fn record_anomaly(&mut self, anomaly: Anomaly) {
        self.anomalies.push(anomaly);
    }

    /// Distinct speaker ids referenced by any utterance.
    pub fn referenced_speaker_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .utterances
            .values()
            .map(|u| u.speaker_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Write the dataset as a JSON artifact. Keys serialize in sorted order,
    /// so the artifact is byte-stable across runs.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a dataset back from a JSON artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let dataset = serde_json::from_str(&contents)?;
        Ok(dataset)
    }
}

fn pretty(utterance: &Utterance) -> String {
    serde_json::to_string_pretty(utterance).unwrap_or_else(|_| format!("{utterance:?}"))
}

/// Bare utterance for tests in this crate.
#[cfg(test)]
pub(crate) fn make_utterance(id: &str, speaker: &str) -> Utterance {
    Utterance {
        utterance_id: id.to_string(),
        speaker_id: speaker.to_string(),
        session_or_block: "1".to_string(),
        sensor_or_mic: "headMic".to_string(),
        audio_filename: None,
        audio_sample_rate: None,
        audio_length: None,
        transcription: Vec::new(),
        stimulus: None,
        recording_id: id.to_string(),
        start_time: None,
        end_time: None,
        text: None,
        prompt_text: None,
    }
}
