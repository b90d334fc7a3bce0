//! Pronunciation lexicon construction and artifact emission.
//!
//! Parses a CMUdict-style dictionary source, partitions the phone inventory
//! into silence and non-silence clusters, derives stress-based question
//! clusters, and writes the five dictionary artifacts the downstream
//! toolkit expects. Full phone coverage is validated: a phone used by any
//! pronunciation that belongs to neither phone set is an internal
//! inconsistency, not a data-quality warning.

use crate::defaults::{DEFAULT_OPTIONAL_SILENCE, DICT_COMMENT_PREFIX};
use crate::error::{CorpusError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Knobs for lexicon construction.
#[derive(Debug, Clone)]
pub struct LexiconOptions {
    /// Phone padded before word pronunciations in the lexicon transducer.
    pub optional_silence: String,
    /// Words injected on top of the dictionary source; same-named entries
    /// are overridden.
    pub extra_words: BTreeMap<String, String>,
    /// Silence phones beyond the optional-silence phone.
    pub extra_silence_phones: BTreeSet<String>,
    /// Emit the silence phones as one additional question cluster.
    pub add_silence_question: bool,
}

impl Default for LexiconOptions {
    fn default() -> Self {
        Self {
            optional_silence: DEFAULT_OPTIONAL_SILENCE.to_string(),
            extra_words: BTreeMap::new(),
            extra_silence_phones: BTreeSet::new(),
            add_silence_question: true,
        }
    }
}

/// Word pronunciations plus the derived phone groupings.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    /// Uppercase word to lowercase space-joined phone sequence.
    pub words: BTreeMap<String, String>,
    pub optional_silence: String,
    pub silence_phones: BTreeSet<String>,
    /// Phone-variant clusters sharing an alphabetic root, members sorted.
    pub nonsilence_phones: Vec<Vec<String>>,
    /// Phone-variant clusters sharing a stress marker, members sorted.
    pub extra_questions: Vec<Vec<String>>,
}

/// Parse a dictionary source: `;;;` comment lines skipped, word separated
/// from its phone sequence by two spaces.
///
/// Canonical CMUdict releases are Latin-1; their non-ASCII bytes only occur
/// in comment lines, so lossy decoding never corrupts an entry.
pub fn parse_dictionary(path: &Path) -> Result<BTreeMap<String, String>> {
    let contents = String::from_utf8_lossy(&fs::read(path)?).into_owned();
    let mut words = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with(DICT_COMMENT_PREFIX) {
            continue;
        }

        // Canonical sources use a double-space separator; tolerate a single
        // whitespace run as some hand-edited dictionaries do.
        let (word, pronunciation) = line
            .split_once("  ")
            .or_else(|| line.split_once(char::is_whitespace))
            .ok_or_else(|| CorpusError::MalformedTable {
                path: path.to_string_lossy().to_string(),
                message: format!("no pronunciation on line: {line}"),
            })?;

        words.insert(
            word.trim().to_uppercase(),
            pronunciation.trim().to_lowercase(),
        );
    }

    Ok(words)
}

/// Parse a phone-symbol inventory file, one phone symbol per line.
pub fn parse_phone_symbols(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with(DICT_COMMENT_PREFIX))
        .map(str::to_lowercase)
        .collect())
}

impl Lexicon {
    /// Build the lexicon from parsed words.
    ///
    /// With a phone inventory, the non-silence clusters derive from it and
    /// coverage can fail; without one, the inventory is taken from the
    /// pronunciations themselves.
    pub fn build(
        words: BTreeMap<String, String>,
        phone_inventory: Option<&[String]>,
        options: &LexiconOptions,
    ) -> Result<Self> {
        let mut words = words;
        for (word, pronunciation) in &options.extra_words {
            words.insert(word.to_uppercase(), pronunciation.to_lowercase());
        }

        let mut silence_phones = options.extra_silence_phones.clone();
        silence_phones.insert(options.optional_silence.clone());

        let mut used_phones = BTreeSet::new();
        for pronunciation in words.values() {
            used_phones.extend(pronunciation.split_whitespace().map(str::to_string));
        }

        let inventory: BTreeSet<String> = match phone_inventory {
            Some(symbols) => symbols.iter().map(|s| s.to_lowercase()).collect(),
            None => used_phones
                .iter()
                .filter(|p| !silence_phones.contains(*p))
                .cloned()
                .collect(),
        };

        let uncovered: Vec<String> = used_phones
            .iter()
            .filter(|p| !silence_phones.contains(*p) && !inventory.contains(*p))
            .cloned()
            .collect();
        if !uncovered.is_empty() {
            return Err(CorpusError::UncoveredPhones { phones: uncovered });
        }

        let nonsilence_phones = cluster_by(&inventory, phone_root);
        let mut extra_questions = Vec::new();
        if options.add_silence_question {
            extra_questions.push(silence_phones.iter().cloned().collect());
        }
        extra_questions.extend(cluster_by(&inventory, phone_stress));

        Ok(Self {
            words,
            optional_silence: options.optional_silence.clone(),
            silence_phones,
            nonsilence_phones,
            extra_questions,
        })
    }

    /// Write the five dictionary artifacts into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<()> {
        fs::create_dir_all(output_dir)?;

        write_lines_sorted(
            output_dir,
            "lexicon.txt",
            self.words
                .iter()
                .map(|(word, pronunciation)| format!("{word} {pronunciation}"))
                .collect(),
        )?;

        write_lines_sorted(
            output_dir,
            "optional_silence.txt",
            vec![self.optional_silence.clone()],
        )?;

        write_lines_sorted(
            output_dir,
            "silence_phones.txt",
            self.silence_phones.iter().cloned().collect(),
        )?;

        write_lines_sorted(
            output_dir,
            "nonsilence_phones.txt",
            self.nonsilence_phones
                .iter()
                .map(|cluster| cluster.join(" "))
                .collect(),
        )?;

        write_lines_sorted(
            output_dir,
            "extra_questions.txt",
            self.extra_questions
                .iter()
                .map(|cluster| cluster.join(" "))
                .collect(),
        )?;

        Ok(())
    }
}

/// Group phones by a key and return the groups as sorted clusters, ordered
/// by key.
fn cluster_by(phones: &BTreeSet<String>, key: fn(&str) -> &str) -> Vec<Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for phone in phones {
        groups
            .entry(key(phone).to_string())
            .or_default()
            .push(phone.clone());
    }
    groups
        .into_values()
        .map(|mut cluster| {
            cluster.sort_unstable();
            cluster
        })
        .collect()
}

/// `aa1` → `aa`; the alphabetic root with the stress marker stripped.
fn phone_root(phone: &str) -> &str {
    phone.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// `aa1` → `1`; the trailing stress marker, empty for unstressed symbols.
fn phone_stress(phone: &str) -> &str {
    let root_len = phone_root(phone).len();
    &phone[root_len..]
}

fn write_lines_sorted(dir: &Path, filename: &str, mut lines: Vec<String>) -> Result<()> {
    lines.sort_unstable();
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(dir.join(filename), contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(w, p)| (w.to_string(), p.to_string()))
            .collect()
    }

    fn default_options() -> LexiconOptions {
        let mut options = LexiconOptions::default();
        options
            .extra_words
            .insert("<SIL>".to_string(), "sil".to_string());
        options
            .extra_words
            .insert("<UNK>".to_string(), "nsn".to_string());
        options.extra_silence_phones.insert("nsn".to_string());
        options
    }

    #[test]
    fn parse_skips_comments_and_canonicalizes_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmudict-0.7b");
        fs::write(
            &path,
            ";;; comment line\nhello  HH AH0 L OW1\nWORLD  W ER1 L D\n",
        )
        .unwrap();

        let words = parse_dictionary(&path).unwrap();
        assert_eq!(words["HELLO"], "hh ah0 l ow1");
        assert_eq!(words["WORLD"], "w er1 l d");
        assert!(!words.contains_key(";;; comment line"));
    }

    #[test]
    fn parse_tolerates_single_space_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict");
        fs::write(&path, "yes Y EH1 S\n").unwrap();

        let words = parse_dictionary(&path).unwrap();
        assert_eq!(words["YES"], "y eh1 s");
    }

    #[test]
    fn parse_rejects_entry_without_pronunciation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dict");
        fs::write(&path, "orphan\n").unwrap();

        assert!(matches!(
            parse_dictionary(&path),
            Err(CorpusError::MalformedTable { .. })
        ));
    }

    #[test]
    fn extra_words_override_dictionary_entries() {
        let mut options = default_options();
        options
            .extra_words
            .insert("HELLO".to_string(), "sil".to_string());

        let lexicon = Lexicon::build(
            words_of(&[("HELLO", "hh ah0 l ow1")]),
            None,
            &options,
        )
        .unwrap();

        assert_eq!(lexicon.words["HELLO"], "sil");
        assert_eq!(lexicon.words["<SIL>"], "sil");
        assert_eq!(lexicon.words["<UNK>"], "nsn");
    }

    #[test]
    fn silence_set_includes_optional_silence() {
        let lexicon = Lexicon::build(
            words_of(&[("YES", "y eh1 s")]),
            None,
            &default_options(),
        )
        .unwrap();

        assert!(lexicon.silence_phones.contains("sil"));
        assert!(lexicon.silence_phones.contains("nsn"));
    }

    #[test]
    fn nonsilence_clusters_group_stress_variants_by_root() {
        let inventory: Vec<String> = ["aa", "aa0", "aa1", "ae", "ae1", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let lexicon = Lexicon::build(
            words_of(&[("BAA", "b aa1")]),
            Some(&inventory),
            &default_options(),
        )
        .unwrap();

        assert_eq!(
            lexicon.nonsilence_phones,
            vec![
                vec!["aa".to_string(), "aa0".to_string(), "aa1".to_string()],
                vec!["ae".to_string(), "ae1".to_string()],
                vec!["b".to_string()],
            ]
        );
    }

    #[test]
    fn extra_questions_group_by_stress_marker() {
        let inventory: Vec<String> = ["aa", "aa0", "aa1", "ae1", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut options = default_options();
        options.add_silence_question = false;

        let lexicon = Lexicon::build(
            words_of(&[("BAA", "b aa1")]),
            Some(&inventory),
            &options,
        )
        .unwrap();

        // Unstressed, stress-0 and stress-1 clusters.
        assert_eq!(
            lexicon.extra_questions,
            vec![
                vec!["aa".to_string(), "b".to_string()],
                vec!["aa0".to_string()],
                vec!["aa1".to_string(), "ae1".to_string()],
            ]
        );
    }

    #[test]
    fn silence_question_is_prepended_when_enabled() {
        let inventory: Vec<String> = vec!["y".to_string(), "eh1".to_string(), "s".to_string()];
        let lexicon = Lexicon::build(
            words_of(&[("YES", "y eh1 s")]),
            Some(&inventory),
            &default_options(),
        )
        .unwrap();

        assert_eq!(
            lexicon.extra_questions[0],
            vec!["nsn".to_string(), "sil".to_string()]
        );
    }

    #[test]
    fn uncovered_phone_is_a_hard_error_naming_the_phone() {
        let inventory: Vec<String> = vec!["y".to_string(), "s".to_string()];
        let err = Lexicon::build(
            words_of(&[("YES", "y eh1 s")]),
            Some(&inventory),
            &default_options(),
        )
        .unwrap_err();

        match err {
            CorpusError::UncoveredPhones { phones } => {
                assert_eq!(phones, vec!["eh1".to_string()]);
            }
            other => panic!("Expected UncoveredPhones, got {other:?}"),
        }
    }

    #[test]
    fn coverage_holds_trivially_without_an_inventory() {
        let lexicon = Lexicon::build(
            words_of(&[("YES", "y eh1 s"), ("NO", "n ow1")]),
            None,
            &default_options(),
        )
        .unwrap();

        let clustered: BTreeSet<String> = lexicon
            .nonsilence_phones
            .iter()
            .flatten()
            .cloned()
            .collect();
        for phone in ["y", "eh1", "s", "n", "ow1"] {
            assert!(clustered.contains(phone), "{phone} missing from clusters");
        }
    }

    #[test]
    fn write_emits_all_five_artifacts_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let inventory: Vec<String> = vec![
            "y".to_string(),
            "eh1".to_string(),
            "eh2".to_string(),
            "s".to_string(),
        ];
        let lexicon = Lexicon::build(
            words_of(&[("YES", "y eh1 s"), ("ESS", "eh2 s")]),
            Some(&inventory),
            &default_options(),
        )
        .unwrap();

        lexicon.write(dir.path()).unwrap();

        let lexicon_txt = fs::read_to_string(dir.path().join("lexicon.txt")).unwrap();
        assert_eq!(
            lexicon_txt,
            "<SIL> sil\n<UNK> nsn\nESS eh2 s\nYES y eh1 s\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("silence_phones.txt")).unwrap(),
            "nsn\nsil\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("optional_silence.txt")).unwrap(),
            "sil\n"
        );
        let nonsilence = fs::read_to_string(dir.path().join("nonsilence_phones.txt")).unwrap();
        assert_eq!(nonsilence, "eh1 eh2\ns\ny\n");
        let questions = fs::read_to_string(dir.path().join("extra_questions.txt")).unwrap();
        assert_eq!(questions, "eh1\neh2\nnsn sil\ns y\n");
    }

    #[test]
    fn writing_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = Lexicon::build(
            words_of(&[("YES", "y eh1 s")]),
            None,
            &default_options(),
        )
        .unwrap();

        let first = dir.path().join("first");
        let second = dir.path().join("second");
        lexicon.write(&first).unwrap();
        lexicon.write(&second).unwrap();

        for name in [
            "lexicon.txt",
            "silence_phones.txt",
            "optional_silence.txt",
            "nonsilence_phones.txt",
            "extra_questions.txt",
        ] {
            assert_eq!(
                fs::read(first.join(name)).unwrap(),
                fs::read(second.join(name)).unwrap(),
                "{name} differs between runs"
            );
        }
    }
}
