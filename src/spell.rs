// Symmetric delete spelling correction.
//
// The index stores, for every dictionary word, the hashes of all variants
// obtained by deleting up to maxEditDistance code points from the word's
// prefix. A lookup generates the same delete variants of the query and
// intersects them with the index: transposes, replaces and inserts of the
// query all surface as deletes on one side or the other, so only deletions
// ever need to be generated. Candidates reached through the intersection are
// verified with a capped Damerau-Levenshtein distance, which also weeds out
// hash collisions.

use std::cmp::{max, min};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::edit_distance::{damerau_levenshtein_runes, DistanceFn};
use crate::error::SpellError;
use crate::index::{fnv1a_32, DeleteDescriptor, DeletesIndex, Entry, Library, WordData};

pub(crate) const DEFAULT_DICTIONARY: &str = "default";
const DEFAULT_EDIT_DISTANCE: u32 = 2;
const DEFAULT_PREFIX_LENGTH: u32 = 7;

fn len(s: &str) -> usize {
    s.chars().count()
}

fn remove(s: &str, index: usize) -> String {
    s.chars()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, ch)| ch)
        .collect()
}

fn slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end - start).collect()
}

/// Controls the closeness/quantity of returned spelling suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionLevel {
    /// At most one suggestion: smallest edit distance, ties broken by higher
    /// frequency.
    Best,
    /// All suggestions tied at the smallest edit distance found.
    Closest,
    /// Every suggestion within the edit distance cap.
    All,
}

/// A suggested word from a lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Edit distance between the input and the suggested word.
    pub distance: i64,
    pub entry: Entry,
}

/// Sorts a suggestion list in place; replaces the default ordering of
/// ascending distance, then descending frequency.
pub type SortFn = fn(&mut [Suggestion]);

/// Selects the dictionary an operation applies to and how an existing entry
/// is merged on re-insertion.
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    pub name: String,
    /// Replace the stored frequency instead of accumulating into it.
    pub override_frequency: bool,
    /// Replace the stored metadata instead of preserving it.
    pub override_metadata: bool,
}

impl Default for DictionaryConfig {
    fn default() -> DictionaryConfig {
        DictionaryConfig {
            name: DEFAULT_DICTIONARY.to_string(),
            override_frequency: false,
            override_metadata: false,
        }
    }
}

/// Controls how a lookup is performed. `None` fields fall back to the
/// model's own values.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub dictionary: String,
    pub distance_fn: DistanceFn,
    pub edit_distance: Option<u32>,
    pub prefix_length: Option<u32>,
    pub sort_fn: Option<SortFn>,
    pub level: SuggestionLevel,
}

impl Default for LookupConfig {
    fn default() -> LookupConfig {
        LookupConfig {
            dictionary: DEFAULT_DICTIONARY.to_string(),
            distance_fn: damerau_levenshtein_runes,
            edit_distance: None,
            prefix_length: None,
            sort_fn: None,
            level: SuggestionLevel::Best,
        }
    }
}

/// Controls how a segmentation is performed; the lookup config applies to
/// every per-part sub-lookup.
#[derive(Debug, Clone, Default)]
pub struct SegmentConfig {
    pub lookup: LookupConfig,
}

/// Bulk insertion form: every word gets frequency 1 and shares the metadata.
#[derive(Debug, Clone, Default)]
pub struct Entries {
    pub words: Vec<String>,
    pub metadata: WordData,
}

/// An individual segment of a segmented input.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The slice of the input this segment covers.
    pub input: String,
    /// The corrected word.
    pub word: String,
    /// The dictionary entry for the corrected word, when one exists.
    pub entry: Option<Entry>,
}

/// The result of a segmentation: the chosen split and the total number of
/// correction edits it required.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentResult {
    pub distance: i64,
    pub segments: Vec<Segment>,
}

impl SegmentResult {
    /// The corrected words of the segmentation, in order.
    pub fn words(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.word.as_str()).collect()
    }
}

impl std::fmt::Display for SegmentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.words().join(" "))
    }
}

// DP cell for segmentation: the best composition ending at some position.
// distance_sum ranks compositions and counts inserted separators; edit_sum
// counts correction edits only and is what the result reports.
#[derive(Debug, Clone, Default)]
struct Composition {
    segmented: String,
    corrected: String,
    distance_sum: i64,
    edit_sum: i64,
    probability_log_sum: f64,
}

/// Spelling correction and word segmentation over named dictionaries of
/// frequency-weighted words.
///
/// All operations take `&self`; the model may be shared across threads, and
/// lookups may interleave with dictionary updates.
pub struct SpellModel {
    /// Maximum edit distance the deletes index is built for.
    pub max_edit_distance: u32,
    /// Length of the word prefix delete variants are generated from.
    pub prefix_length: u32,
    cumulative_frequency: AtomicU64,
    longest_word: AtomicUsize,
    deletes: DeletesIndex,
    library: Library,
}

impl Default for SpellModel {
    fn default() -> SpellModel {
        SpellModel::new()
    }
}

impl SpellModel {
    /// Creates an empty model with an edit distance cap of 2 and a prefix
    /// length of 7.
    pub fn new() -> SpellModel {
        SpellModel {
            max_edit_distance: DEFAULT_EDIT_DISTANCE,
            prefix_length: DEFAULT_PREFIX_LENGTH,
            cumulative_frequency: AtomicU64::new(0),
            longest_word: AtomicUsize::new(0),
            deletes: DeletesIndex::new(),
            library: Library::new(),
        }
    }

    /// Sum of the frequencies of all entries across all dictionaries.
    pub fn cumulative_frequency(&self) -> u64 {
        self.cumulative_frequency.load(Ordering::Relaxed)
    }

    /// Code-point length of the longest word ever inserted. A high-water
    /// mark: it is not decreased when entries are removed.
    pub fn longest_word_length(&self) -> usize {
        self.longest_word.load(Ordering::Relaxed)
    }

    /// Adds an entry to a dictionary. If the word already exists its stored
    /// frequency and metadata are merged according to the config. Returns
    /// whether a new word was added.
    pub fn add_entry(&self, mut entry: Entry, cfg: &DictionaryConfig) -> bool {
        let word = entry.word.clone();

        self.cumulative_frequency
            .fetch_add(entry.frequency, Ordering::Relaxed);

        // The word already exists: refresh the stored entry and leave the
        // deletes index alone, since the word itself has not changed.
        if let Some(existing) = self.library.load(&cfg.name, &word) {
            self.cumulative_frequency
                .fetch_sub(entry.frequency, Ordering::Relaxed);
            if !cfg.override_frequency {
                entry.frequency = entry.frequency.saturating_add(existing.frequency);
            }
            if !cfg.override_metadata {
                entry.metadata = existing.metadata.clone();
            }
            // net change against what was stored; wrapping keeps the update
            // a single commutative add
            self.cumulative_frequency.fetch_add(
                entry.frequency.wrapping_sub(existing.frequency),
                Ordering::Relaxed,
            );
            self.library.store(&cfg.name, entry);
            return false;
        }

        self.library.store(&cfg.name, entry);
        self.longest_word.fetch_max(len(&word), Ordering::Relaxed);

        // One descriptor per word, shared by every bucket its delete
        // neighborhood hashes into.
        let descriptor = Arc::new(DeleteDescriptor::new(&word));
        for hash in self.delete_hashes(&word) {
            self.deletes.add(&cfg.name, hash, Arc::clone(&descriptor));
        }

        true
    }

    /// Adds multiple words sharing the same metadata, each with frequency 1.
    /// Only the first word honors `override_frequency`; all honor
    /// `override_metadata`.
    pub fn add_entries(&self, entries: &Entries, cfg: &DictionaryConfig) -> bool {
        let mut entry_cfg = cfg.clone();
        for (i, word) in entries.words.iter().enumerate() {
            if i > 0 {
                entry_cfg.override_frequency = false;
            }
            let entry = Entry {
                word: word.clone(),
                frequency: 1,
                metadata: entries.metadata.clone(),
            };
            self.add_entry(entry, &entry_cfg);
        }
        true
    }

    /// Returns the entry for `word`, if present.
    pub fn get_entry(&self, word: &str, cfg: &DictionaryConfig) -> Option<Entry> {
        self.library.load(&cfg.name, word)
    }

    /// Removes an entry from a dictionary. Returns whether the entry was
    /// present. The deletes index is not scrubbed; stale descriptors are
    /// rejected or surface default entries at lookup time.
    pub fn remove_entry(&self, word: &str, cfg: &DictionaryConfig) -> bool {
        self.library.remove(&cfg.name, word)
    }

    /// Removes multiple entries.
    pub fn remove_entries(&self, words: &[String], cfg: &DictionaryConfig) -> bool {
        for word in words {
            self.remove_entry(word, cfg);
        }
        true
    }

    fn dict_suggestion(&self, dict: &str, word: &str, distance: i64) -> Suggestion {
        // a removed word can still be reachable through the deletes index;
        // it surfaces with a default entry
        let entry = self.library.load(dict, word).unwrap_or_default();
        Suggestion { distance, entry }
    }

    /// Returns suggestions from the dictionary for a possibly misspelled
    /// input word. By default returns the best suggestion if one exists
    /// within the model's edit distance cap.
    pub fn lookup(&self, input: &str, cfg: &LookupConfig) -> Result<Vec<Suggestion>, SpellError> {
        let prefix_length = cfg.prefix_length.unwrap_or(self.prefix_length);
        if prefix_length < 1 {
            return Err(SpellError::InvalidPrefixLength);
        }
        let prefix_length = i64::from(prefix_length);
        let mut edit_distance = i64::from(cfg.edit_distance.unwrap_or(self.max_edit_distance));
        let dict = cfg.dictionary.as_str();

        let mut results: Vec<Suggestion> = Vec::new();

        if self.library.load(dict, input).is_some() {
            results.push(self.dict_suggestion(dict, input, 0));
            // an exact match short-circuits unless the caller wants all
            // matches
            if cfg.level != SuggestionLevel::All {
                return Ok(results);
            }
        }

        if edit_distance == 0 {
            return Ok(results);
        }

        let input_runes: Vec<char> = input.chars().collect();
        let input_len = input_runes.len() as i64;

        let mut considered_deletes: AHashSet<String> = AHashSet::new();
        let mut considered_suggestions: AHashSet<String> = AHashSet::new();
        considered_suggestions.insert(input.to_string());

        let input_prefix_len = min(input_len, prefix_length);
        let mut candidates: Vec<String> = vec![slice(input, 0, input_prefix_len as usize)];

        let mut candidate_pointer = 0;
        while candidate_pointer < candidates.len() {
            let candidate = candidates[candidate_pointer].clone();
            candidate_pointer += 1;
            let candidate_len = len(&candidate) as i64;
            let length_diff = input_prefix_len - candidate_len;

            if length_diff > edit_distance {
                // candidates are produced in order of non-increasing length,
                // so nothing closer remains unless every candidate is wanted
                if cfg.level == SuggestionLevel::All {
                    continue;
                }
                break;
            }

            if let Some(bucket) = self.deletes.load(dict, fnv1a_32(candidate.as_bytes())) {
                for descriptor in &bucket {
                    let suggestion_len = descriptor.len as i64;

                    if descriptor.word == input {
                        continue;
                    }

                    // length difference beyond the cap, or a collision
                    // artifact: a bucket word shorter than the delete
                    // variant, or of equal length without being it
                    if (suggestion_len - input_len).abs() > edit_distance
                        || suggestion_len < candidate_len
                        || (suggestion_len == candidate_len && descriptor.word != candidate)
                    {
                        continue;
                    }

                    let sugg_prefix_len = min(suggestion_len, prefix_length);
                    if sugg_prefix_len > input_prefix_len
                        && sugg_prefix_len - candidate_len > edit_distance
                    {
                        continue;
                    }

                    let distance;
                    if candidate_len == 0 {
                        // no code points in common with the input; only the
                        // length difference remains
                        distance = max(input_len, suggestion_len);
                        if distance > edit_distance
                            || !considered_suggestions.insert(descriptor.word.clone())
                        {
                            continue;
                        }
                    } else if suggestion_len == 1 {
                        distance = if input.contains(descriptor.runes[0]) {
                            input_len - 1
                        } else {
                            input_len
                        };
                        if distance > edit_distance
                            || !considered_suggestions.insert(descriptor.word.clone())
                        {
                            continue;
                        }
                    } else {
                        if !considered_suggestions.insert(descriptor.word.clone()) {
                            continue;
                        }
                        distance = (cfg.distance_fn)(&input_runes, &descriptor.runes, edit_distance);
                        if distance < 1 {
                            continue;
                        }
                    }

                    if distance <= edit_distance {
                        if !results.is_empty() {
                            match cfg.level {
                                SuggestionLevel::Closest => {
                                    // only ever verify down to the smallest
                                    // distance found so far
                                    if distance < edit_distance {
                                        results.clear();
                                    }
                                }
                                SuggestionLevel::Best => {
                                    let current_frequency = self
                                        .library
                                        .load(dict, &descriptor.word)
                                        .map_or(0, |e| e.frequency);
                                    let closest_frequency = results[0].entry.frequency;

                                    if distance < edit_distance
                                        || current_frequency > closest_frequency
                                    {
                                        edit_distance = distance;
                                        results[0] =
                                            self.dict_suggestion(dict, &descriptor.word, distance);
                                    }
                                    continue;
                                }
                                SuggestionLevel::All => {}
                            }
                        }

                        if cfg.level != SuggestionLevel::All {
                            edit_distance = distance;
                        }

                        results.push(self.dict_suggestion(dict, &descriptor.word, distance));
                    }
                }
            }

            // derive further delete variants from this candidate, down to
            // the edit distance cap
            if length_diff < edit_distance && candidate_len <= prefix_length {
                for i in 0..candidate_len as usize {
                    let delete = remove(&candidate, i);
                    if considered_deletes.insert(delete.clone()) {
                        candidates.push(delete);
                    }
                }
            }
        }

        match cfg.sort_fn {
            Some(sort) => sort(&mut results),
            None => results.sort_by(|a, b| {
                a.distance
                    .cmp(&b.distance)
                    .then_with(|| b.entry.frequency.cmp(&a.entry.frequency))
            }),
        }

        Ok(results)
    }

    /// Divides an input which may have word concatenations into the most
    /// probable set of dictionary words, correcting spelling along the way.
    /// Existing spaces are allowed and considered for the optimum
    /// segmentation.
    pub fn segment(&self, input: &str, cfg: &SegmentConfig) -> Result<SegmentResult, SpellError> {
        let longest_word = self.longest_word.load(Ordering::Relaxed);
        if longest_word == 0 {
            return Err(SpellError::EmptyDictionary);
        }
        let cumulative_frequency = self.cumulative_frequency.load(Ordering::Relaxed) as f64;
        if cumulative_frequency == 0.0 {
            return Err(SpellError::ZeroCumulativeFrequency);
        }

        let input_runes: Vec<char> = input.chars().collect();
        let input_len = input_runes.len();
        if input_len == 0 {
            return Ok(SegmentResult {
                distance: 0,
                segments: Vec::new(),
            });
        }

        // Triangular DP over a circular buffer: cell (p - 1) mod array_size
        // holds the best composition ending at position p, and cells are
        // recycled as the window of reachable positions slides.
        let array_size = min(input_len, longest_word);
        let mut compositions: Vec<Composition> = vec![Composition::default(); array_size];
        // trails one position behind i
        let mut circular_idx = array_size - 1;

        for i in 0..input_len {
            let j_max = min(input_len - i, longest_word);
            for j in 1..=j_max {
                let mut separator_length = 0;
                let mut top_ed: i64 = 0;

                // a part starting on whitespace keeps its separator from the
                // input; anywhere else a separator has to be inserted
                let mut part: String = if input_runes[i].is_whitespace() {
                    input_runes[i + 1..i + j].iter().collect()
                } else {
                    separator_length = 1;
                    input_runes[i..i + j].iter().collect()
                };

                // spaces inside the part count as edits
                top_ed += len(&part) as i64;
                part = part.replace(' ', "");
                top_ed -= len(&part) as i64;

                let suggestions = self.lookup(&part, &cfg.lookup)?;

                let top_result;
                let top_probability_log;
                if let Some(best) = suggestions.first() {
                    top_result = best.entry.word.clone();
                    top_ed += best.distance;
                    top_probability_log =
                        (best.entry.frequency as f64 / cumulative_frequency).log10();
                } else {
                    // unknown word: the probability penalty grows with the
                    // part length so a long unknown run cannot beat a split
                    let part_len = len(&part) as i64;
                    top_result = part.clone();
                    top_ed += part_len;
                    top_probability_log =
                        (10.0 / (cumulative_frequency * 10f64.powf(part_len as f64))).log10();
                }

                let destination_idx = (j + circular_idx) % array_size;

                if i == 0 {
                    compositions[destination_idx] = Composition {
                        segmented: part,
                        corrected: top_result,
                        distance_sum: top_ed,
                        edit_sum: top_ed,
                        probability_log_sum: top_probability_log,
                    };
                } else if j == longest_word
                    || ((compositions[circular_idx].distance_sum + top_ed
                        == compositions[destination_idx].distance_sum
                        || compositions[circular_idx].distance_sum + separator_length + top_ed
                            == compositions[destination_idx].distance_sum)
                        && compositions[destination_idx].probability_log_sum
                            < compositions[circular_idx].probability_log_sum + top_probability_log)
                    || compositions[circular_idx].distance_sum + separator_length + top_ed
                        < compositions[destination_idx].distance_sum
                {
                    compositions[destination_idx] = Composition {
                        segmented: format!("{} {}", compositions[circular_idx].segmented, part),
                        corrected: format!("{} {}", compositions[circular_idx].corrected, top_result),
                        distance_sum: compositions[circular_idx].distance_sum
                            + separator_length
                            + top_ed,
                        edit_sum: compositions[circular_idx].edit_sum + top_ed,
                        probability_log_sum: compositions[circular_idx].probability_log_sum
                            + top_probability_log,
                    };
                }
            }

            circular_idx += 1;
            if circular_idx == array_size {
                circular_idx = 0;
            }
        }

        let final_composition = &compositions[circular_idx];
        let segmented_words: Vec<&str> = final_composition.segmented.split(' ').collect();
        let corrected_words: Vec<&str> = final_composition.corrected.split(' ').collect();

        let mut segments = Vec::with_capacity(corrected_words.len());
        for (i, word) in corrected_words.iter().enumerate() {
            segments.push(Segment {
                input: segmented_words.get(i).copied().unwrap_or("").to_string(),
                word: (*word).to_string(),
                entry: self.library.load(&cfg.lookup.dictionary, word),
            });
        }

        Ok(SegmentResult {
            distance: final_composition.edit_sum,
            segments,
        })
    }

    // Hashes of the prefix-restricted delete neighborhood: the prefix itself
    // plus every variant reachable by deleting up to maxEditDistance code
    // points from it, deduplicated by hash.
    fn delete_hashes(&self, word: &str) -> AHashSet<u32> {
        let mut hashes = AHashSet::new();

        let prefix = if len(word) > self.prefix_length as usize {
            slice(word, 0, self.prefix_length as usize)
        } else {
            word.to_string()
        };

        hashes.insert(fnv1a_32(prefix.as_bytes()));
        self.generate_deletes(&prefix, 0, &mut hashes);
        hashes
    }

    fn generate_deletes(&self, word: &str, depth: u32, hashes: &mut AHashSet<u32>) {
        let depth = depth + 1;
        let word_len = len(word);

        if word_len > 1 {
            for i in 0..word_len {
                let delete = remove(word, i);
                if hashes.insert(fnv1a_32(delete.as_bytes())) && depth < self.max_edit_distance {
                    self.generate_deletes(&delete, depth, hashes);
                }
            }
        }
    }

    pub(crate) fn library_snapshot(&self) -> AHashMap<String, AHashMap<String, Entry>> {
        self.library.snapshot()
    }
}
