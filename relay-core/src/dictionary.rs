use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;

use crate::choseong;
use relay_types::GameError;

/// A dictionary hit: whether the word exists is implied by presence, and a
/// winning word ends the round when accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub definition: Option<String>,
    pub winning_word: bool,
}

/// Keyed read against the partitioned word store.
#[async_trait]
pub trait WordLookup: Send + Sync {
    async fn lookup(&self, partition: &str, word: &str) -> Result<Option<WordEntry>, GameError>;
}

/// File-backed dictionary: one `<partition>.txt` per leading-consonant
/// class, loaded once at startup. Line format is `word<TAB>definition`, with
/// a trailing `<TAB>!` flagging a winning word. `#` lines and blanks are
/// skipped.
#[derive(Debug, Default)]
pub struct DictionaryIndex {
    partitions: HashMap<String, HashMap<String, WordEntry>>,
}

impl DictionaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every allow-listed partition file present in `dir`. Fails when
    /// the directory holds no partition file at all.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut index = Self::new();
        let mut loaded = 0;

        for partition in choseong::all_partitions() {
            let path = dir.join(format!("{}.txt", partition));
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading partition file {}", path.display()))?;
            index.load_partition_text(partition, &text);
            loaded += 1;
        }

        if loaded == 0 {
            return Err(anyhow!(
                "no partition files (dict_*.txt) found in {}",
                dir.display()
            ));
        }
        tracing::info!(partitions = loaded, "dictionary index loaded");
        Ok(index)
    }

    pub fn load_partition_text(&mut self, partition: &str, text: &str) {
        let words = self.partitions.entry(partition.to_string()).or_default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let Some(word) = fields.next().map(str::trim).filter(|w| !w.is_empty()) else {
                continue;
            };
            let definition = fields
                .next()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string);
            let winning_word = fields.next().map(str::trim) == Some("!");

            words.insert(
                word.to_string(),
                WordEntry {
                    word: word.to_string(),
                    definition,
                    winning_word,
                },
            );
        }
    }

    /// Test/builder convenience for inserting a single entry.
    pub fn insert(&mut self, partition: &str, word: &str, winning_word: bool) {
        self.partitions.entry(partition.to_string()).or_default().insert(
            word.to_string(),
            WordEntry {
                word: word.to_string(),
                definition: None,
                winning_word,
            },
        );
    }

    pub fn word_count(&self) -> usize {
        self.partitions.values().map(|words| words.len()).sum()
    }
}

#[async_trait]
impl WordLookup for DictionaryIndex {
    async fn lookup(&self, partition: &str, word: &str) -> Result<Option<WordEntry>, GameError> {
        if !choseong::is_allowed_partition(partition) {
            return Err(GameError::InvalidPartition {
                partition: partition.to_string(),
            });
        }
        Ok(self
            .partitions
            .get(partition)
            .and_then(|words| words.get(word))
            .cloned())
    }
}
