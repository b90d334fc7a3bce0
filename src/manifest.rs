//! Kaldi data-directory emission.
//!
//! One directory per named subset, one line per record per file. Every
//! file's lines, and every space-joined id list, are ordered by byte-wise
//! string comparison — the downstream toolkit requires C-locale sorting,
//! and byte order keeps the output identical across environments.

use crate::dataset::{Dataset, Utterance};
use crate::error::{CorpusError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Emit the data directories for every subset under `<output_root>/data/`.
///
/// Returns the directories written, in subset-name order.
pub fn write_data_dirs(
    dataset: &Dataset,
    subsets: &BTreeMap<String, Vec<String>>,
    output_root: &Path,
) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for (name, ids) in subsets {
        let base = output_root.join("data").join(name);
        write_subset(dataset, ids, &base)?;
        info!("Wrote data directory {}", base.display());
        dirs.push(base);
    }
    Ok(dirs)
}

/// Emit one subset's manifest files into `base`.
///
/// All files reference exactly the utterance ids in `ids` and the speakers
/// those utterances name; nothing outside the subset leaks in.
pub fn write_subset(dataset: &Dataset, ids: &[String], base: &Path) -> Result<()> {
    fs::create_dir_all(base)?;

    let utterances = resolve(dataset, ids)?;

    // text (<utterance-id> <transcription>)
    let lines = utterances
        .iter()
        .map(|u| {
            let text = u.text.as_deref().ok_or_else(|| {
                CorpusError::Other(format!("utterance {} has no transcription", u.utterance_id))
            })?;
            Ok(format!("{} {}", u.utterance_id, text))
        })
        .collect::<Result<Vec<_>>>()?;
    write_sorted(base, "text", lines)?;

    // wav.scp (<recording-id> <audio-reference>); recordings shared by
    // several utterances collapse to one line
    let mut lines = utterances
        .iter()
        .map(|u| {
            let audio = u.audio_filename.as_deref().ok_or_else(|| {
                CorpusError::Other(format!("utterance {} has no audio file", u.utterance_id))
            })?;
            Ok(format!("{} {}", u.recording_id, audio.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    lines.sort_unstable();
    lines.dedup();
    write_sorted(base, "wav.scp", lines)?;

    // segments (<utterance-id> <recording-id> <start> <end>), only when the
    // subset carries segment timing at all
    if utterances
        .iter()
        .any(|u| u.start_time.is_some() || u.end_time.is_some())
    {
        let lines = utterances
            .iter()
            .filter_map(|u| match (u.start_time, u.end_time) {
                (Some(start), Some(end)) => Some(format!(
                    "{} {} {} {}",
                    u.utterance_id, u.recording_id, start, end
                )),
                _ => None,
            })
            .collect();
        write_sorted(base, "segments", lines)?;
    }

    // utt2spk (<utterance-id> <speaker-id>)
    let lines = utterances
        .iter()
        .map(|u| format!("{} {}", u.utterance_id, u.speaker_id))
        .collect();
    write_sorted(base, "utt2spk", lines)?;

    // The speaker-derived files share one speaker-set computation so they
    // stay referentially consistent with each other.
    let speaker_ids = subset_speaker_ids(&utterances);

    // spk2gender (<speaker-id> <gender>)
    let lines = speaker_ids
        .iter()
        .map(|speaker_id| {
            let speaker = dataset.speakers.get(speaker_id).ok_or_else(|| {
                CorpusError::Other(format!("speaker {speaker_id} missing from the roster"))
            })?;
            Ok(format!("{} {}", speaker_id, speaker.gender))
        })
        .collect::<Result<Vec<_>>>()?;
    write_sorted(base, "spk2gender", lines)?;

    // spk2utt (<speaker-id> <utterance-id> <utterance-id> ...)
    let lines = speaker_ids
        .iter()
        .map(|speaker_id| {
            let mut utterance_ids: Vec<&str> = utterances
                .iter()
                .filter(|u| &u.speaker_id == speaker_id)
                .map(|u| u.utterance_id.as_str())
                .collect();
            utterance_ids.sort_unstable();
            format!("{} {}", speaker_id, utterance_ids.join(" "))
        })
        .collect();
    write_sorted(base, "spk2utt", lines)?;

    Ok(())
}

/// Look up every subset id in the dataset; an id the dataset does not hold
/// breaks referential consistency and is a hard error.
fn resolve<'a>(dataset: &'a Dataset, ids: &[String]) -> Result<Vec<&'a Utterance>> {
    ids.iter()
        .map(|id| {
            dataset
                .utterances
                .get(id)
                .ok_or_else(|| CorpusError::Other(format!("subset references unknown utterance {id}")))
        })
        .collect()
}

fn subset_speaker_ids(utterances: &[&Utterance]) -> Vec<String> {
    let mut ids: Vec<String> = utterances.iter().map(|u| u.speaker_id.clone()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Write one manifest file, lines sorted by byte-wise ordinal comparison.
fn write_sorted(base: &Path, filename: &str, mut lines: Vec<String>) -> Result<()> {
    lines.sort_unstable();
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(base.join(filename), contents)?;
    Ok(())
}
