//! Stimulus file classification.
//!
//! A prompt file either names an image the speaker described, carries a
//! bracketed instruction, or holds the prompted text itself. Classification
//! is best-effort and total: anything that is neither an image reference nor
//! a bracketed instruction is a prompt.

use crate::dataset::Stimulus;
use crate::error::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static INSTRUCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*)\]$").expect("Invalid regex"));

/// Classify stimulus text. Precedence: image extension, then bracketed
/// instruction, then prompt fallthrough.
pub fn classify(text: &str) -> Stimulus {
    if text.ends_with(".jpg") || text.ends_with(".png") {
        return Stimulus::ImageDescription {
            image_filename: text.to_string(),
        };
    }

    if let Some(captures) = INSTRUCTION.captures(text) {
        return Stimulus::Instruction {
            instruction: captures[1].to_string(),
        };
    }

    Stimulus::Prompt {
        prompt: text.to_string(),
    }
}

/// Read a stimulus file and classify its content, embedded newlines stripped.
pub fn load(path: &Path) -> Result<Stimulus> {
    let data = fs::read_to_string(path)?;
    Ok(classify(&data.replace('\n', "")))
}
