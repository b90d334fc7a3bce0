//! Default configuration constants for corpusprep.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Sample rate assumed for alignment timestamps when no audio duration is
/// available to infer one from.
///
/// 16kHz is the nominal rate for both supported corpora; resolutions that
/// fall back to this value are flagged as low-confidence.
pub const DEFAULT_ALIGNMENT_RATE: u32 = 16000;

/// Candidate sample rates for alignment timestamp inference.
///
/// Some alignment files encode timestamps at a rate other than the nominal
/// corpus rate. When the audio duration is known, the rate is picked from
/// this menu by nearest absolute distance.
pub const CANDIDATE_ALIGNMENT_RATES: [u32; 4] = [16000, 22050, 44100, 48000];

/// Default sensor/microphone channel kept at export time.
///
/// The head-mounted microphone is the cleanest channel in TORGO recordings.
pub const DEFAULT_SENSOR: &str = "headMic";

/// Minimum audio file size in bytes for an utterance to be exported.
///
/// Files below this are truncated or empty containers.
pub const MIN_AUDIO_BYTES: u64 = 1000;

/// Default train/test/dev fractions for the proportional random split.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
pub const DEFAULT_TEST_FRACTION: f64 = 0.1;
pub const DEFAULT_DEV_FRACTION: f64 = 0.1;

/// Default seed for the proportional random split.
///
/// A fixed seed keeps split membership, and therefore every emitted
/// manifest, stable across runs.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Phone used as optional silence in the lexicon transducer.
pub const DEFAULT_OPTIONAL_SILENCE: &str = "sil";

/// Comment prefix in pronunciation dictionary sources.
pub const DICT_COMMENT_PREFIX: &str = ";;;";
