//! Dictionary Module
//!
//! Loads the word list once at startup and answers membership queries for
//! the rest of the process lifetime. The set is immutable after load, so
//! every worker shares one `Arc<Dictionary>` with no locking at all.
//!
//! Membership is ordinary exact-match lookup: `"cat"` in the dictionary
//! does not make `"cats"` or `"ca"` correct.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while loading a dictionary.
///
/// These are fatal at startup: a server without a dictionary cannot
/// answer anything.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The word file could not be opened or read
    #[error("failed to read dictionary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable set of known words.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
}

impl Dictionary {
    /// Loads a dictionary from a file with one word per line.
    ///
    /// Trailing `\r` is stripped so word lists with Windows line endings
    /// load cleanly; empty lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DictionaryError::Io`] if the file cannot be opened or read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let words: HashSet<String> = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();

        info!(path = %path.display(), words = words.len(), "Dictionary loaded");

        Ok(Self { words })
    }

    /// Builds a dictionary from an iterator of words.
    ///
    /// Mostly useful in tests and embedding scenarios.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `word` is in the dictionary (exact match).
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Returns the number of words in the dictionary.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` if the dictionary holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_words_membership() {
        let dict = Dictionary::from_words(["cat", "dog"]);
        assert_eq!(dict.len(), 2);
        assert!(dict.contains("cat"));
        assert!(dict.contains("dog"));
        assert!(!dict.contains("bird"));
    }

    #[test]
    fn prefix_is_not_a_match() {
        let dict = Dictionary::from_words(["cat"]);
        assert!(!dict.contains("ca"));
        assert!(!dict.contains("cats"));
        assert!(!dict.contains("c"));
    }

    #[test]
    fn loads_words_file() {
        let path = std::env::temp_dir().join(format!("spellserv-dict-{}", std::process::id()));
        std::fs::write(&path, "cat\r\ndog\n\nbird\n").unwrap();

        let dict = Dictionary::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(dict.len(), 3);
        assert!(dict.contains("cat"), "CR stripped from word");
        assert!(dict.contains("dog"));
        assert!(dict.contains("bird"));
        assert!(!dict.contains(""), "empty lines skipped");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Dictionary::load("/definitely/not/a/real/words/file").unwrap_err();
        assert!(matches!(err, DictionaryError::Io { .. }));
    }
}
