// Storage for the two maps behind a spell model: the library of dictionary
// entries and the deletes index mapping hashed delete variants back to the
// words they were derived from. Both are guarded by reader/writer locks so
// lookups can run concurrently with dictionary updates.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Arbitrary per-word annotation carried alongside the frequency.
pub type WordData = serde_json::Map<String, serde_json::Value>;

/// A word in a dictionary together with its frequency count and metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Frequency", default, skip_serializing_if = "frequency_is_zero")]
    pub frequency: u64,
    #[serde(rename = "WordData", default, skip_serializing_if = "WordData::is_empty")]
    pub metadata: WordData,
}

fn frequency_is_zero(frequency: &u64) -> bool {
    *frequency == 0
}

impl Entry {
    pub fn new(word: impl Into<String>, frequency: u64) -> Entry {
        Entry {
            word: word.into(),
            frequency,
            metadata: WordData::new(),
        }
    }
}

/// Identifies the dictionary word a delete variant was derived from. One
/// descriptor is allocated per word and shared by every bucket its delete
/// neighborhood hashes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDescriptor {
    /// The original dictionary word, not the delete variant.
    pub word: String,
    pub runes: Vec<char>,
    pub len: usize,
}

impl DeleteDescriptor {
    pub fn new(word: &str) -> DeleteDescriptor {
        let runes: Vec<char> = word.chars().collect();
        DeleteDescriptor {
            word: word.to_string(),
            len: runes.len(),
            runes,
        }
    }
}

/// 32-bit FNV-1a over a raw byte sequence. Keys the deletes index; persisted
/// buckets and test fixtures depend on it being byte-exact.
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

/// Collection of named dictionaries, each mapping a word to its entry.
#[derive(Debug, Default)]
pub struct Library {
    dictionaries: RwLock<AHashMap<String, AHashMap<String, Entry>>>,
}

impl Library {
    pub fn new() -> Library {
        Library::default()
    }

    /// Returns a copy of the entry for `word`, if present.
    pub fn load(&self, dict: &str, word: &str) -> Option<Entry> {
        self.dictionaries.read().get(dict)?.get(word).cloned()
    }

    /// Upserts the entry under its own word, creating the dictionary as
    /// needed.
    pub fn store(&self, dict: &str, entry: Entry) {
        self.dictionaries
            .write()
            .entry(dict.to_string())
            .or_default()
            .insert(entry.word.clone(), entry);
    }

    /// Deletes the mapping for `word`. Returns whether a mapping existed.
    pub fn remove(&self, dict: &str, word: &str) -> bool {
        match self.dictionaries.write().get_mut(dict) {
            Some(dictionary) => dictionary.remove(word).is_some(),
            None => false,
        }
    }

    pub(crate) fn snapshot(&self) -> AHashMap<String, AHashMap<String, Entry>> {
        self.dictionaries.read().clone()
    }
}

/// Maps hashed delete variants to the descriptors of the words they came
/// from, per dictionary. Multiple descriptors share a key when words
/// legitimately share a delete variant or when hashes collide; both are
/// resolved by distance verification at lookup time.
#[derive(Debug, Default)]
pub struct DeletesIndex {
    dictionaries: RwLock<AHashMap<String, AHashMap<u32, Vec<Arc<DeleteDescriptor>>>>>,
}

impl DeletesIndex {
    pub fn new() -> DeletesIndex {
        DeletesIndex::default()
    }

    /// Returns a snapshot of the bucket under `key`, if present.
    pub fn load(&self, dict: &str, key: u32) -> Option<Vec<Arc<DeleteDescriptor>>> {
        self.dictionaries.read().get(dict)?.get(&key).cloned()
    }

    /// Appends a descriptor to the bucket under `key`, creating the
    /// dictionary map and the bucket as needed.
    pub fn add(&self, dict: &str, key: u32, descriptor: Arc<DeleteDescriptor>) {
        self.dictionaries
            .write()
            .entry(dict.to_string())
            .or_default()
            .entry(key)
            .or_default()
            .push(descriptor);
    }
}
