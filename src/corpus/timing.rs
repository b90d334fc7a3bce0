//! Alignment timestamp unit resolution.
//!
//! Alignment files store timestamps in samples at an undeclared rate; some
//! files in the same corpus use 16kHz, others 44.1kHz. When the audio
//! duration is known, the rate is inferred by dividing the largest end
//! timestamp by the duration and snapping to the nearest standard rate.
//! Without a duration the nominal corpus rate is assumed and the result is
//! flagged so callers can treat it as low-confidence.

use crate::dataset::Segment;
use crate::defaults::{CANDIDATE_ALIGNMENT_RATES, DEFAULT_ALIGNMENT_RATE};

/// Segments converted to seconds, with the rate that was used.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingResolution {
    pub segments: Vec<Segment>,
    pub sample_rate: u32,
    /// True when the rate was inferred from a known audio duration; false
    /// when the default rate was assumed.
    pub inferred: bool,
}

/// Convert raw sample-domain segments to seconds.
///
/// Entry order is preserved exactly.
pub fn resolve(raw: Vec<Segment>, known_length_seconds: Option<f64>) -> TimingResolution {
    let max_end = raw.iter().map(|s| s.end_time).fold(f64::MIN, f64::max);

    let (sample_rate, inferred) = match known_length_seconds {
        Some(length) if !raw.is_empty() => {
            let approx = max_end / length;
            let nearest = CANDIDATE_ALIGNMENT_RATES
                .iter()
                .copied()
                .min_by(|a, b| {
                    (f64::from(*a) - approx)
                        .abs()
                        .total_cmp(&(f64::from(*b) - approx).abs())
                })
                .unwrap_or(DEFAULT_ALIGNMENT_RATE);
            (nearest, true)
        }
        _ => (DEFAULT_ALIGNMENT_RATE, false),
    };

    let rate = f64::from(sample_rate);
    let segments = raw
        .into_iter()
        .map(|s| Segment {
            start_time: s.start_time / rate,
            end_time: s.end_time / rate,
            symbol: s.symbol,
        })
        .collect();

    TimingResolution {
        segments,
        sample_rate,
        inferred,
    }
}
