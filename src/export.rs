//! Export-time filtering and transcription derivation.
//!
//! Before manifests are written, the dataset is reduced to the utterances
//! that are actually trainable: prompted speech with usable media. TORGO
//! derives its word transcription from the prompt text here; UASpeech
//! arrives with transcriptions already attached.

use crate::corpus::CorpusKind;
use crate::dataset::{Dataset, Stimulus, Utterance};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

static CARRIAGE_RETURNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r").expect("Invalid regex"));
static INSTRUCTION_SPANS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*\]").expect("Invalid regex"));
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,!?;]").expect("Invalid regex"));
static FULL_STOP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.($| )").expect("Invalid regex"));

/// Export acceptance knobs.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Keep only utterances recorded on this sensor/microphone, when set.
    pub sensor: Option<String>,
    /// Reject audio files at or below this size; undersized containers are
    /// truncated recordings.
    pub min_audio_bytes: u64,
}

/// Filter the dataset down to exportable utterances and derive their word
/// transcriptions. Speakers are restricted to those still referenced.
pub fn prepare_for_export(
    dataset: &Dataset,
    kind: CorpusKind,
    options: &ExportOptions,
) -> Dataset {
    let mut exported = Dataset::new();
    exported.anomalies = dataset.anomalies.clone();

    for utterance in dataset.utterances.values() {
        if !accept(utterance, kind, options) {
            continue;
        }
        let mut utterance = utterance.clone();
        if kind == CorpusKind::Torgo {
            utterance.text = prompt_of(&utterance).map(normalize_prompt);
        }
        exported.insert_utterance(utterance);
    }

    for speaker_id in exported.referenced_speaker_ids() {
        if let Some(speaker) = dataset.speakers.get(&speaker_id) {
            exported.insert_speaker(speaker.clone());
        }
    }

    info!(
        "Kept {} of {} utterances for export",
        exported.utterances.len(),
        dataset.utterances.len()
    );
    exported
}

/// The export blacklist: corrupted audio, missing media, off-sensor
/// recordings, non-prompt stimuli.
fn accept(utterance: &Utterance, kind: CorpusKind, options: &ExportOptions) -> bool {
    if let Some(sensor) = &options.sensor
        && &utterance.sensor_or_mic != sensor
    {
        return false;
    }

    let Some(audio) = &utterance.audio_filename else {
        return false;
    };
    if !audio_is_usable(audio, options.min_audio_bytes) {
        return false;
    }

    match kind {
        // Image descriptions and instructions carry no usable transcription.
        CorpusKind::Torgo => prompt_of(utterance).is_some(),
        CorpusKind::Uaspeech => utterance.text.is_some(),
    }
}

fn prompt_of(utterance: &Utterance) -> Option<String> {
    match &utterance.stimulus {
        Some(Stimulus::Prompt { prompt }) => Some(prompt.clone()),
        _ => None,
    }
}

fn audio_is_usable(path: &Path, min_bytes: u64) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > min_bytes)
        .unwrap_or(false)
}

/// Turn a prompt into the uppercase word transcription the manifests carry:
/// carriage returns, bracketed instruction spans, `, ! ? ;`, and sentence
/// full stops are all stripped.
pub fn normalize_prompt(prompt: String) -> String {
    let text = CARRIAGE_RETURNS.replace_all(&prompt, "");
    let text = INSTRUCTION_SPANS.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, "");
    let text = FULL_STOP.replace_all(&text, "");
    text.to_uppercase()
}
