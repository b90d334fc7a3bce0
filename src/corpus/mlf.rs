//! HTK master label file (MLF) parsing.
//!
//! UASpeech ships word transcriptions as per-speaker MLF files. Only the
//! subset of the format those files use is handled: a `#!MLF!#` header,
//! quoted `"*/<name>.lab"` entry headers, label lines (bare symbol or
//! `start end symbol`), and a `.` terminator per entry. The first label of
//! each entry is the word transcription.

use crate::error::{CorpusError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const MLF_HEADER: &str = "#!MLF!#";

/// Load an MLF file into a map from utterance id to word symbol.
pub fn load_word_labels(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path)?;
    parse_word_labels(&contents, path)
}

fn parse_word_labels(contents: &str, path: &Path) -> Result<BTreeMap<String, String>> {
    let mut lines = contents.lines().enumerate();

    match lines.next() {
        Some((_, header)) if header.trim() == MLF_HEADER => {}
        _ => {
            return Err(CorpusError::MalformedAlignment {
                path: path.to_string_lossy().to_string(),
                line: 1,
                message: format!("expected {MLF_HEADER} header"),
            });
        }
    }

    let mut labels = BTreeMap::new();
    let mut current: Option<String> = None;

    for (index, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('"') {
            let name = line.trim_matches('"');
            current = Some(entry_name_to_id(name).to_string());
            continue;
        }

        if line == "." {
            current = None;
            continue;
        }

        let Some(id) = current.as_ref() else {
            return Err(CorpusError::MalformedAlignment {
                path: path.to_string_lossy().to_string(),
                line: index + 1,
                message: "label line outside of an entry".to_string(),
            });
        };

        // Only the first label of an entry is the word transcription.
        if !labels.contains_key(id) {
            labels.insert(id.clone(), label_symbol(line).to_string());
        }
    }

    Ok(labels)
}

/// `"*/F02_B1_CW1_M2.lab"` → `F02_B1_CW1_M2`.
fn entry_name_to_id(name: &str) -> &str {
    let name = name.strip_prefix("*/").unwrap_or(name);
    let name = name.strip_suffix(".lab").unwrap_or(name);
    name.strip_suffix(".rec").unwrap_or(name)
}

/// A label line is either a bare symbol or `start end symbol [score]`.
fn label_symbol(line: &str) -> &str {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() >= 3
        && fields[0].parse::<f64>().is_ok()
        && fields[1].parse::<f64>().is_ok()
    {
        fields[2]
    } else {
        fields[0]
    }
}
