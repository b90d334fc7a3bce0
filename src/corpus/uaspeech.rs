//! UASpeech corpus ingestion.
//!
//! UASpeech carries all metadata in the audio filename itself
//! (`<speaker>_B<block>_<word>_M<mic>.wav` under `audio/` or
//! `audio/control/`). Word transcriptions come from per-speaker HTK MLF
//! files and nominal prompts from the corpus word-list table; the speaker
//! roster is enriched from the speaker table when one is present.

use crate::corpus::{mlf, pattern, roster};
use crate::dataset::{Anomaly, Dataset, Speaker, Stimulus, Utterance};
use crate::error::{CorpusError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{info, warn};
use walkdir::WalkDir;

static WAV_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i).*/audio(?:/control)?/(?P<speaker>[^/]+)/(?P<utterance_id>(?P<file_speaker>[^_/]+)_B(?P<block>[^_/]+)_(?P<word_id>[^_/]+)_M(?P<microphone>[^_./]+))\.wav$",
    )
    .expect("Invalid regex")
});

pub const WORDLIST_FILENAME: &str = "speaker_wordlist.tsv";
pub const SPEAKER_TABLE_FILENAME: &str = "speakers.tsv";

/// Walk a UASpeech tree and build the normalized dataset.
///
/// A `.wav` file that does not match the corpus convention is skipped with
/// a warning; the walk itself never aborts on one.
pub fn parse(root: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    let mut matched = 0usize;

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() || !has_extension(entry.path(), "wav") {
            continue;
        }

        match ingest_wav_file(entry.path()) {
            Ok(utterance) => {
                dataset.insert_utterance(utterance);
                matched += 1;
            }
            Err(CorpusError::PatternMismatch { path, pattern }) => {
                warn!("File {path} did not match the UASpeech pattern ({pattern}). Skipping...");
            }
            Err(e) => return Err(e),
        }
    }

    info!("Matched {} recordings under {}", matched, root.display());

    derive_speakers(&mut dataset);
    enrich_speakers(root, &mut dataset)?;
    attach_transcriptions(root, &mut dataset)?;
    Ok(dataset)
}

fn ingest_wav_file(path: &Path) -> Result<Utterance> {
    let fields = pattern::extract(path, &WAV_PATTERN)?;

    // The filename repeats the speaker directory name; regex backreferences
    // are unavailable, so the repetition is checked after capture.
    if !fields["speaker"].eq_ignore_ascii_case(&fields["file_speaker"]) {
        return Err(CorpusError::PatternMismatch {
            path: path.to_string_lossy().to_string(),
            pattern: WAV_PATTERN.as_str().to_string(),
        });
    }

    let utterance_id = fields["utterance_id"].clone();
    Ok(Utterance {
        utterance_id: utterance_id.clone(),
        speaker_id: fields["speaker"].clone(),
        session_or_block: fields["block"].clone(),
        sensor_or_mic: fields["microphone"].clone(),
        audio_filename: Some(path.to_path_buf()),
        // Headers in this corpus are unreliable; rates and lengths are left
        // unprobed rather than trusted.
        audio_sample_rate: None,
        audio_length: None,
        transcription: Vec::new(),
        stimulus: None,
        recording_id: utterance_id,
        start_time: None,
        end_time: None,
        text: None,
        prompt_text: None,
    })
}

/// Gender sits third from the end of the speaker id (`F02`, `CM04`);
/// a leading `C` marks a control speaker.
fn derive_speakers(dataset: &mut Dataset) {
    for speaker_id in dataset.referenced_speaker_ids() {
        let chars: Vec<char> = speaker_id.chars().collect();
        let gender = chars
            .len()
            .checked_sub(3)
            .and_then(|i| chars.get(i))
            .map(|c| c.to_ascii_lowercase().to_string())
            .unwrap_or_default();

        let mut speaker = Speaker::new(speaker_id.clone(), gender);
        speaker.speaker_type = Some(if speaker_id.starts_with('C') {
            "control".to_string()
        } else {
            "dysarthric".to_string()
        });
        dataset.insert_speaker(speaker);
    }
}

/// Merge clinical metadata from the speaker table, when the corpus has one.
fn enrich_speakers(root: &Path, dataset: &mut Dataset) -> Result<()> {
    let table_path = root.join(SPEAKER_TABLE_FILENAME);
    if !table_path.is_file() {
        return Ok(());
    }

    let details = roster::load_speaker_table(&table_path)?;
    for (speaker_id, speaker) in dataset.speakers.iter_mut() {
        if let Some(d) = details.get(speaker_id) {
            speaker.age = Some(d.age.clone());
            speaker.diagnosis = Some(d.diagnosis.clone());
            speaker.motor_control = Some(d.motor_control.clone());
            speaker.intelligibility_class = Some(d.intelligibility_class.clone());
            speaker.intelligibility_percentage = Some(d.intelligibility_percentage);
        }
    }
    Ok(())
}

/// Attach word transcriptions (MLF) and nominal prompts (word list) to every
/// utterance. Disagreements between the two are anomalies, with the
/// transcription preferred for export.
fn attach_transcriptions(root: &Path, dataset: &mut Dataset) -> Result<()> {
    let mut transcriptions: BTreeMap<String, String> = BTreeMap::new();
    for speaker_id in dataset.speakers.keys() {
        let mlf_path = root
            .join("mlf")
            .join(speaker_id)
            .join(format!("{speaker_id}_word.mlf"));
        if !mlf_path.is_file() {
            warn!("Could not find the MLF file {}", mlf_path.display());
            continue;
        }
        transcriptions.extend(mlf::load_word_labels(&mlf_path)?);
    }

    let wordlist_path = root.join(WORDLIST_FILENAME);
    let words = if wordlist_path.is_file() {
        roster::load_wordlist(&wordlist_path)?
    } else {
        warn!("Could not find the word list {}", wordlist_path.display());
        BTreeMap::new()
    };

    let mut anomalies = Vec::new();
    for utterance in dataset.utterances.values_mut() {
        let key = roster::prompt_key(&utterance.session_or_block, &word_id_of(utterance));
        let prompt = words.get(&key).cloned();
        if prompt.is_none() {
            warn!(
                "No word-list entry {} for utterance {}",
                key, utterance.utterance_id
            );
            anomalies.push(Anomaly::MissingCompanion {
                utterance_id: utterance.utterance_id.clone(),
                path: wordlist_path.clone(),
            });
        }

        let transcription = transcriptions
            .get(&utterance.utterance_id)
            .cloned()
            .or_else(|| prompt.clone());

        if let (Some(t), Some(p)) = (&transcription, &prompt)
            && t != p
        {
            warn!("The transcription does not match the prompt\n{t} != {p}");
            anomalies.push(Anomaly::PromptMismatch {
                utterance_id: utterance.utterance_id.clone(),
                prompt: p.clone(),
                transcription: t.clone(),
            });
        }

        utterance.text = transcription;
        utterance.prompt_text = prompt.clone();
        utterance.stimulus = prompt.map(|p| Stimulus::Prompt { prompt: p });
    }

    for anomaly in anomalies {
        dataset.record_anomaly(anomaly);
    }
    Ok(())
}

/// `F02_B1_CW1_M2` → `CW1`.
fn word_id_of(utterance: &Utterance) -> String {
    utterance
        .utterance_id
        .split('_')
        .nth(2)
        .unwrap_or_default()
        .to_string()
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();
    }

    /// Minimal UASpeech tree: two dysarthric recordings for F02, one control
    /// recording for CM01, word list and MLF transcriptions for F02 only.
    fn make_corpus(root: &Path) {
        let f02 = root.join("audio").join("F02");
        let cm01 = root.join("audio").join("control").join("CM01");
        fs::create_dir_all(&f02).unwrap();
        fs::create_dir_all(&cm01).unwrap();
        write_wav(&f02.join("F02_B1_CW1_M2.wav"));
        write_wav(&f02.join("F02_B1_UW3_M2.wav"));
        write_wav(&cm01.join("CM01_B2_D1_M5.wav"));

        fs::write(
            root.join(WORDLIST_FILENAME),
            "CW1\tbackspace\nB1_UW3\tcopy\nD1\tone\n",
        )
        .unwrap();

        let mlf_dir = root.join("mlf").join("F02");
        fs::create_dir_all(&mlf_dir).unwrap();
        fs::write(
            mlf_dir.join("F02_word.mlf"),
            "#!MLF!#\n\"*/F02_B1_CW1_M2.lab\"\nBACKSPACE\n.\n\"*/F02_B1_UW3_M2.lab\"\nPASTE\n.\n",
        )
        .unwrap();

        fs::write(
            root.join(SPEAKER_TABLE_FILENAME),
            "F02\t30\tLow (29%)\tspastic\tsevere\n",
        )
        .unwrap();
    }

    #[test]
    fn parses_filenames_into_utterances() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();
        assert_eq!(dataset.utterances.len(), 3);

        let utterance = &dataset.utterances["F02_B1_CW1_M2"];
        assert_eq!(utterance.speaker_id, "F02");
        assert_eq!(utterance.session_or_block, "1");
        assert_eq!(utterance.sensor_or_mic, "2");
        assert!(utterance.audio_filename.is_some());
        assert_eq!(utterance.audio_sample_rate, None);
    }

    #[test]
    fn control_speakers_are_typed_and_gendered() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();
        let f02 = &dataset.speakers["F02"];
        assert_eq!(f02.gender, "f");
        assert_eq!(f02.speaker_type.as_deref(), Some("dysarthric"));

        let cm01 = &dataset.speakers["CM01"];
        assert_eq!(cm01.gender, "m");
        assert_eq!(cm01.speaker_type.as_deref(), Some("control"));
    }

    #[test]
    fn roster_table_enriches_speakers() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();
        let f02 = &dataset.speakers["F02"];
        assert_eq!(f02.age.as_deref(), Some("30"));
        assert_eq!(f02.intelligibility_class.as_deref(), Some("low"));
        assert_eq!(f02.intelligibility_percentage, Some(29.0));

        // CM01 has no roster row; base facts only.
        assert_eq!(dataset.speakers["CM01"].age, None);
    }

    #[test]
    fn mlf_transcription_wins_over_prompt_and_mismatch_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();

        // MLF says PASTE where the word list says COPY.
        let utterance = &dataset.utterances["F02_B1_UW3_M2"];
        assert_eq!(utterance.text.as_deref(), Some("PASTE"));
        assert_eq!(utterance.prompt_text.as_deref(), Some("COPY"));
        assert!(dataset.anomalies.iter().any(|a| matches!(
            a,
            Anomaly::PromptMismatch { utterance_id, .. } if utterance_id == "F02_B1_UW3_M2"
        )));
    }

    #[test]
    fn missing_mlf_falls_back_to_prompt() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();
        let utterance = &dataset.utterances["CM01_B2_D1_M5"];
        assert_eq!(utterance.text.as_deref(), Some("ONE"));
        assert_eq!(utterance.prompt_text.as_deref(), Some("ONE"));
    }

    #[test]
    fn nonconforming_wav_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());
        write_wav(&dir.path().join("audio").join("F02").join("notes.wav"));

        let dataset = parse(dir.path()).unwrap();
        assert_eq!(dataset.utterances.len(), 3);
    }

    #[test]
    fn speaker_directory_mismatch_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());
        // File claims M09 but sits in F02's directory.
        write_wav(
            &dir.path()
                .join("audio")
                .join("F02")
                .join("M09_B1_CW1_M2.wav"),
        );

        let dataset = parse(dir.path()).unwrap();
        assert_eq!(dataset.utterances.len(), 3);
        assert!(!dataset.utterances.contains_key("M09_B1_CW1_M2"));
    }

    #[test]
    fn uncommon_word_prompts_are_block_keyed() {
        let dir = tempfile::tempdir().unwrap();
        make_corpus(dir.path());

        let dataset = parse(dir.path()).unwrap();
        // UW3 resolves through the block-qualified key B1_UW3.
        let utterance = &dataset.utterances["F02_B1_UW3_M2"];
        assert_eq!(utterance.prompt_text.as_deref(), Some("COPY"));
    }
}
