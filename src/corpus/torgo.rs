//! TORGO corpus ingestion.
//!
//! TORGO organizes recordings as
//! `<root>/<speaker>/Session<n>/phn_<sensor>/<id>.phn` with companion audio
//! under `wav_<sensor>/` and prompt text under `prompts/`, all keyed by the
//! same zero-padded numeric id. Each alignment file becomes one utterance.

use crate::corpus::{audio, pattern, stimuli, timing};
use crate::dataset::{Anomaly, Dataset, Segment, Speaker, Utterance};
use crate::error::{CorpusError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

static PHN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i).*/(?P<speaker>[^/]+)/Session(?P<session>[^/]+)/phn_(?P<sensor>[^/]+)/(?P<id>\d+)(?: [^/]*)?\.phn$",
    )
    .expect("Invalid regex")
});

/// Walk a TORGO tree and build the normalized dataset.
///
/// A `.phn` file that does not match the corpus convention aborts the parse;
/// unreadable audio and missing companions are recoverable anomalies.
pub fn parse(root: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::new();
    let mut matched = 0usize;

    // Path-sorted walk keeps the duplicate-overwrite order stable.
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() || !has_extension(entry.path(), "phn") {
            continue;
        }

        let utterance = ingest_alignment_file(entry.path(), &mut dataset)?;
        dataset.insert_utterance(utterance);
        matched += 1;
    }

    info!("Matched {} alignment files under {}", matched, root.display());

    derive_speakers(&mut dataset);
    Ok(dataset)
}

fn ingest_alignment_file(path: &Path, dataset: &mut Dataset) -> Result<Utterance> {
    let fields = pattern::extract(path, &PHN_PATTERN)?;
    let speaker = &fields["speaker"];
    let session = &fields["session"];
    let sensor = &fields["sensor"];
    let id = &fields["id"];
    let utterance_id = format!("{speaker}_{session}_{id}");

    // Companion files live beside the phn_<sensor> directory.
    let session_dir = path
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| CorpusError::Other(format!("{} has no session directory", path.display())))?;

    let (audio_filename, audio_info) =
        locate_audio(session_dir, sensor, id, &utterance_id, dataset)?;

    let raw_segments = load_alignment(path)?;
    let resolution = timing::resolve(raw_segments, audio_info.map(|i| i.length_seconds));
    if !resolution.inferred && !resolution.segments.is_empty() {
        debug!(
            "No audio duration for {}; assuming {} Hz alignment timestamps",
            utterance_id, resolution.sample_rate
        );
    }

    let stimulus_path = session_dir.join("prompts").join(padded_name(id, "txt")?);
    let stimulus = if stimulus_path.is_file() {
        Some(stimuli::load(&stimulus_path)?)
    } else {
        warn!(
            "No stimulus file for {} (expected {})",
            utterance_id,
            stimulus_path.display()
        );
        dataset.record_anomaly(Anomaly::MissingCompanion {
            utterance_id: utterance_id.clone(),
            path: stimulus_path,
        });
        None
    };

    Ok(Utterance {
        utterance_id: utterance_id.clone(),
        speaker_id: speaker.clone(),
        session_or_block: session.clone(),
        sensor_or_mic: sensor.clone(),
        audio_filename,
        audio_sample_rate: audio_info.map(|i| i.sample_rate),
        audio_length: audio_info.map(|i| i.length_seconds),
        transcription: resolution.segments,
        stimulus,
        recording_id: utterance_id,
        start_time: None,
        end_time: None,
        text: None,
        prompt_text: None,
    })
}

/// Find and probe the co-located audio file. Unreadable audio keeps the
/// utterance with null audio and timing facts.
fn locate_audio(
    session_dir: &Path,
    sensor: &str,
    id: &str,
    utterance_id: &str,
    dataset: &mut Dataset,
) -> Result<(Option<PathBuf>, Option<audio::AudioInfo>)> {
    let wav_path = session_dir
        .join(format!("wav_{sensor}"))
        .join(padded_name(id, "wav")?);

    if !wav_path.is_file() {
        return Ok((None, None));
    }

    match audio::probe(&wav_path) {
        Ok(info) => Ok((Some(wav_path), Some(info))),
        Err(e) => {
            warn!("Skipping audio for {utterance_id}: {e}");
            dataset.record_anomaly(Anomaly::MissingCompanion {
                utterance_id: utterance_id.to_string(),
                path: wav_path,
            });
            Ok((None, None))
        }
    }
}

/// Parse `start end symbol` lines; timestamps are raw sample-domain values.
fn load_alignment(path: &Path) -> Result<Vec<Segment>> {
    let contents = fs::read_to_string(path)?;
    let mut segments = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = |message: String| CorpusError::MalformedAlignment {
            path: path.to_string_lossy().to_string(),
            line: index + 1,
            message,
        };

        let mut parts = line.splitn(3, ' ');
        let (Some(start), Some(end), Some(symbol)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed("expected start, end and symbol fields".to_string()));
        };

        let start_time: f64 = start
            .parse()
            .map_err(|_| malformed(format!("unparseable start time: {start}")))?;
        let end_time: f64 = end
            .parse()
            .map_err(|_| malformed(format!("unparseable end time: {end}")))?;
        if start_time > end_time {
            return Err(malformed(format!(
                "start time {start_time} after end time {end_time}"
            )));
        }

        segments.push(Segment {
            start_time,
            end_time,
            symbol: symbol.to_string(),
        });
    }

    Ok(segments)
}

/// Speaker roster: the distinct speaker ids of the utterance set, with
/// gender read off the leading letter of the id (F01, M02, FC03).
fn derive_speakers(dataset: &mut Dataset) {
    for speaker_id in dataset.referenced_speaker_ids() {
        let gender = speaker_id
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase().to_string())
            .unwrap_or_default();
        dataset.insert_speaker(Speaker::new(speaker_id, gender));
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn padded_name(id: &str, extension: &str) -> Result<String> {
    let numeric: u64 = id
        .parse()
        .map_err(|_| CorpusError::Other(format!("non-numeric utterance id: {id}")))?;
    Ok(format!("{numeric:04}.{extension}"))
}
