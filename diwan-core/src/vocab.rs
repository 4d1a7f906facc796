//! Word-level vocabulary mapping tokens to dense integer ids.
//!
//! Id 0 is reserved for padding and never names a word, so a vocabulary of
//! `n` words produced by a word-index export occupies ids `1..=n`.

use crate::error::{DiwanError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Characters stripped from text before it is split into words.
const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// What [`Vocabulary::encode`] does with a word it has never seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OovPolicy {
    /// Leave the word out of the id sequence. The remaining words still
    /// reach the model, in order.
    #[default]
    Drop,
    /// Replace the word with the given id, which must belong to the
    /// vocabulary (typically an `<oov>` entry).
    MapTo(usize),
}

/// Bidirectional word/id lookup.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    word_to_id: HashMap<String, usize>,
    id_to_word: HashMap<usize, String>,
    oov: OovPolicy,
}

impl Vocabulary {
    /// Build a vocabulary from `(word, id)` pairs.
    ///
    /// Rejects id 0, duplicate ids, duplicate words and empty words.
    pub fn from_word_index<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut word_to_id = HashMap::new();
        let mut id_to_word = HashMap::new();
        for (word, id) in entries {
            let word = word.into();
            if word.is_empty() {
                return Err(DiwanError::Vocabulary(format!("empty word for id {}", id)));
            }
            if id == 0 {
                return Err(DiwanError::Vocabulary(format!(
                    "word {:?} uses id 0, which is reserved for padding",
                    word
                )));
            }
            if let Some(other) = id_to_word.get(&id) {
                return Err(DiwanError::Vocabulary(format!(
                    "id {} is shared by {:?} and {:?}",
                    id, other, word
                )));
            }
            if word_to_id.contains_key(&word) {
                return Err(DiwanError::Vocabulary(format!("word {:?} appears twice", word)));
            }
            word_to_id.insert(word.clone(), id);
            id_to_word.insert(id, word);
        }
        Ok(Self { word_to_id, id_to_word, oov: OovPolicy::Drop })
    }

    /// Build a vocabulary from an ordered word list, assigning ids from 1.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_word_index(words.into_iter().zip(1..))
    }

    /// Load a JSON object of the form `{"word": id, ...}`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let index: HashMap<String, usize> = serde_json::from_str(&raw)?;
        Self::from_word_index(index)
    }

    /// Switch the unknown-word policy. `MapTo` ids must already be present.
    pub fn with_oov_policy(mut self, policy: OovPolicy) -> Result<Self> {
        if let OovPolicy::MapTo(id) = policy {
            if !self.id_to_word.contains_key(&id) {
                return Err(DiwanError::Vocabulary(format!(
                    "out-of-vocabulary id {} is not in the vocabulary",
                    id
                )));
            }
        }
        self.oov = policy;
        Ok(self)
    }

    pub fn oov_policy(&self) -> OovPolicy {
        self.oov
    }

    /// Length of the probability vector a model over this vocabulary emits,
    /// padding slot included.
    pub fn size(&self) -> usize {
        self.id_to_word.keys().max().map_or(1, |&max| max + 1)
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.word_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_to_id.is_empty()
    }

    pub fn id(&self, word: &str) -> Option<usize> {
        self.word_to_id.get(word).copied()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.id_to_word.get(&id).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.word_to_id.contains_key(word)
    }

    /// Encode text into ids.
    ///
    /// Text is lowercased, punctuation in [`FILTERS`] becomes whitespace and
    /// the rest is split on whitespace. Unknown words follow the
    /// [`OovPolicy`].
    pub fn encode(&self, text: &str) -> Vec<usize> {
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if FILTERS.contains(c) { ' ' } else { c })
            .collect();

        normalized
            .split_whitespace()
            .filter_map(|w| match (self.word_to_id.get(w), self.oov) {
                (Some(&id), _) => Some(id),
                (None, OovPolicy::MapTo(id)) => Some(id),
                (None, OovPolicy::Drop) => None,
            })
            .collect()
    }

    /// Decode ids back into a space separated string, skipping ids with no
    /// word (padding included).
    pub fn decode(&self, ids: &[usize]) -> String {
        ids.iter()
            .filter_map(|&id| self.word(id))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
