//! Error types for corpusprep.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CorpusError {
    // Ingestion errors
    #[error("Path {path} did not match the corpus pattern {pattern}")]
    PatternMismatch { path: String, pattern: String },

    #[error("Could not read audio file {path}: {message}")]
    UnreadableAudio { path: String, message: String },

    #[error("Malformed alignment file {path} at line {line}: {message}")]
    MalformedAlignment {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Malformed table file {path}: {message}")]
    MalformedTable { path: String, message: String },

    // Lexicon errors
    #[error("Lexicon contains phones covered by neither the silence nor the nonsilence sets: {}", phones.join(" "))]
    UncoveredPhones { phones: Vec<String> },

    // Split errors
    #[error("Invalid split specification: {message}")]
    InvalidSplitSpec { message: String },

    // Dataset artifact errors
    #[error("Dataset artifact error: {0}")]
    Artifact(#[from] serde_json::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CorpusError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_pattern_mismatch_display() {
        let error = CorpusError::PatternMismatch {
            path: "/data/TORGO/notes.txt".to_string(),
            pattern: ".*\\.phn".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Path /data/TORGO/notes.txt did not match the corpus pattern .*\\.phn"
        );
    }

    #[test]
    fn test_unreadable_audio_display() {
        let error = CorpusError::UnreadableAudio {
            path: "/data/0001.wav".to_string(),
            message: "missing fmt chunk".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Could not read audio file /data/0001.wav: missing fmt chunk"
        );
    }

    #[test]
    fn test_uncovered_phones_display_joins_phones() {
        let error = CorpusError::UncoveredPhones {
            phones: vec!["zz".to_string(), "qq".to_string()],
        };
        assert!(error.to_string().contains("zz qq"));
    }

    #[test]
    fn test_invalid_split_spec_display() {
        let error = CorpusError::InvalidSplitSpec {
            message: "mixed fraction and predicate rules".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid split specification: mixed fraction and predicate rules"
        );
    }

    #[test]
    fn test_malformed_alignment_display() {
        let error = CorpusError::MalformedAlignment {
            path: "0001.phn".to_string(),
            line: 3,
            message: "expected three fields".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed alignment file 0001.phn at line 3: expected three fields"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: CorpusError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: CorpusError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<CorpusError>();
        assert_sync::<CorpusError>();
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
