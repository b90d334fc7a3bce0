//! Structured metadata recovery from corpus path conventions.
//!
//! Each corpus names its speakers, sessions, and channels through directory
//! and file naming conventions. A single regular expression with named
//! capture groups per corpus turns a path back into a flat field map.

use crate::error::{CorpusError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Extract the named capture groups of `pattern` from `path`.
///
/// Matching is expected to be case-insensitive; patterns carry an inline
/// `(?i)` flag since file extensions vary in case across the corpora.
pub fn extract(path: &Path, pattern: &Regex) -> Result<HashMap<String, String>> {
    let path_str = path.to_string_lossy();
    let captures = pattern
        .captures(&path_str)
        .ok_or_else(|| CorpusError::PatternMismatch {
            path: path_str.to_string(),
            pattern: pattern.as_str().to_string(),
        })?;

    let mut fields = HashMap::new();
    for name in pattern.capture_names().flatten() {
        if let Some(value) = captures.name(name) {
            fields.insert(name.to_string(), value.as_str().to_string());
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session_pattern() -> Regex {
        Regex::new(
            r"(?i).*/(?P<speaker>[^/]+)/Session(?P<session>[^/]+)/phn_(?P<sensor>[^/]+)/(?P<id>\d+)(?: .*)?\.phn",
        )
        .unwrap()
    }

    #[test]
    fn extracts_all_named_groups() {
        let path = PathBuf::from("/data/TORGO/F04/Session2/phn_headMic/0098.phn");
        let fields = extract(&path, &session_pattern()).unwrap();

        assert_eq!(fields["speaker"], "F04");
        assert_eq!(fields["session"], "2");
        assert_eq!(fields["sensor"], "headMic");
        assert_eq!(fields["id"], "0098");
    }

    #[test]
    fn matching_is_case_insensitive_on_extension() {
        let path = PathBuf::from("/data/TORGO/M01/Session2_3/phn_arrayMic/0080.PHN");
        let fields = extract(&path, &session_pattern()).unwrap();

        assert_eq!(fields["speaker"], "M01");
        assert_eq!(fields["session"], "2_3");
        assert_eq!(fields["sensor"], "arrayMic");
        assert_eq!(fields["id"], "0080");
    }

    #[test]
    fn tolerates_trailing_annotation_in_filename() {
        // Some corpus files carry a trailing note after the numeric id.
        let path = PathBuf::from("/data/TORGO/F03/Session1/phn_headMic/0133 (copy).phn");
        let fields = extract(&path, &session_pattern()).unwrap();

        assert_eq!(fields["id"], "0133");
    }

    #[test]
    fn mismatch_names_path_and_pattern() {
        let path = PathBuf::from("/data/TORGO/readme.txt");
        let err = extract(&path, &session_pattern()).unwrap_err();

        match err {
            CorpusError::PatternMismatch { path, pattern } => {
                assert!(path.contains("readme.txt"));
                assert!(pattern.contains("Session"));
            }
            other => panic!("Expected PatternMismatch, got {other:?}"),
        }
    }

    #[test]
    fn extraction_is_deterministic_across_calls() {
        let path = PathBuf::from("/data/TORGO/F04/Session2/phn_headMic/0098.phn");
        let pattern = session_pattern();
        let first = extract(&path, &pattern).unwrap();
        let second = extract(&path, &pattern).unwrap();
        assert_eq!(first, second);
    }
}
