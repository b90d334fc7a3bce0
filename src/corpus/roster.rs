//! External roster tables for UASpeech.
//!
//! The corpus distributes speaker metadata and the prompt word list as a
//! spreadsheet; corpusprep consumes them as tab-separated exports:
//!
//! - `speaker_wordlist.tsv` — `word_id<TAB>prompt` per line
//! - `speakers.tsv` — `speaker<TAB>age<TAB>intelligibility<TAB>diagnosis<TAB>motor_control`
//!
//! Lines starting with `#` are skipped in both.

use crate::error::{CorpusError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static INTELLIGIBILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<class>.*) \((?P<percentage>\d+(?:\.\d+)?)%\)$").expect("Invalid regex")
});

/// Clinical metadata for one speaker, straight from the roster table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerDetails {
    pub age: String,
    pub diagnosis: String,
    pub motor_control: String,
    pub intelligibility_class: String,
    pub intelligibility_percentage: f64,
}

/// Load the word-list table mapping word id to its prompt text.
///
/// Prompts are canonicalized the way the corpus sheet is: uppercased,
/// comma-space collapsed to a space, trimmed.
pub fn load_wordlist(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = fs::read_to_string(path)?;
    let mut words = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (word_id, prompt) =
            line.split_once('\t')
                .ok_or_else(|| CorpusError::MalformedTable {
                    path: path.to_string_lossy().to_string(),
                    message: format!("expected word_id<TAB>prompt, got: {line}"),
                })?;
        words.insert(word_id.trim().to_string(), clean_prompt(prompt));
    }

    Ok(words)
}

/// Load the speaker roster table.
pub fn load_speaker_table(path: &Path) -> Result<BTreeMap<String, SpeakerDetails>> {
    let contents = fs::read_to_string(path)?;
    let mut speakers = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            return Err(CorpusError::MalformedTable {
                path: path.to_string_lossy().to_string(),
                message: format!("expected 5 tab-separated fields, got {}: {line}", fields.len()),
            });
        }

        let (class, percentage) = parse_intelligibility(fields[2]).ok_or_else(|| {
            CorpusError::MalformedTable {
                path: path.to_string_lossy().to_string(),
                message: format!("unparseable intelligibility value: {}", fields[2]),
            }
        })?;

        speakers.insert(
            fields[0].trim().to_string(),
            SpeakerDetails {
                age: fields[1].trim().to_string(),
                diagnosis: fields[3].trim().to_string(),
                motor_control: fields[4].trim().to_string(),
                intelligibility_class: class,
                intelligibility_percentage: percentage,
            },
        );
    }

    Ok(speakers)
}

/// Word-list lookup key for an utterance. Uncommon words are repeated per
/// block, so their ids are qualified with the block they belong to.
pub fn prompt_key(block: &str, word_id: &str) -> String {
    if word_id.starts_with("UW") {
        format!("B{block}_{word_id}")
    } else {
        word_id.to_string()
    }
}

fn clean_prompt(prompt: &str) -> String {
    prompt.to_uppercase().replace(", ", " ").trim().to_string()
}

/// `"Low (15%)"` → `("low", 15.0)`.
fn parse_intelligibility(value: &str) -> Option<(String, f64)> {
    let captures = INTELLIGIBILITY.captures(value.trim())?;
    let class = captures.name("class")?.as_str().to_lowercase();
    let percentage = captures.name("percentage")?.as_str().parse().ok()?;
    Some((class, percentage))
}
