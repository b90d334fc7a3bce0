//! WAV header probing.
//!
//! Reads the container header only — sample rate and frame count — without
//! decoding sample data. Probing never mutates the source file and may be
//! repeated freely.

use crate::error::{CorpusError, Result};
use std::path::Path;

/// Facts recovered from a WAV container header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub length_seconds: f64,
}

/// Probe a WAV file header for its sample rate and duration.
pub fn probe(path: &Path) -> Result<AudioInfo> {
    let reader = hound::WavReader::open(path).map_err(|e| CorpusError::UnreadableAudio {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })?;

    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(CorpusError::UnreadableAudio {
            path: path.to_string_lossy().to_string(),
            message: "header reports a zero sample rate".to_string(),
        });
    }

    // duration() is frames per channel, straight from the header.
    let frames = reader.duration();
    Ok(AudioInfo {
        sample_rate: spec.sample_rate,
        length_seconds: f64::from(frames) / f64::from(spec.sample_rate),
    })
}
