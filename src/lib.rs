/*!

Spelling correction & word segmentation based on the symmetric delete algorithm.

#### Spelling correction

```rust
use spellkit::{DictionaryConfig, Entry, LookupConfig, SpellModel, SuggestionLevel};

let model = SpellModel::new();
let dict = DictionaryConfig::default();
model.add_entry(Entry::new("hello", 10), &dict);
model.add_entry(Entry::new("help", 5), &dict);
model.add_entry(Entry::new("world", 1), &dict);

// best suggestion for a single misspelled word
let suggestions = model.lookup("helo", &LookupConfig::default()).unwrap();
assert_eq!(suggestions[0].entry.word, "hello");
assert_eq!(suggestions[0].distance, 1);

// every suggestion within the edit distance cap
let all = model
    .lookup(
        "helo",
        &LookupConfig {
            level: SuggestionLevel::All,
            ..LookupConfig::default()
        },
    )
    .unwrap();
assert!(all.iter().any(|s| s.entry.word == "help"));
```

#### Word segmentation of unspaced text

```rust
use spellkit::{DictionaryConfig, Entry, SegmentConfig, SpellModel};

let model = SpellModel::new();
let dict = DictionaryConfig::default();
for (word, frequency) in [("the", 100), ("quick", 50), ("brown", 40), ("fox", 30)] {
    model.add_entry(Entry::new(word, frequency), &dict);
}

let result = model.segment("thequickbrownfox", &SegmentConfig::default()).unwrap();
assert_eq!(result.to_string(), "the quick brown fox");
assert_eq!(result.distance, 0);
```

#### Named dictionaries

```rust
use spellkit::{DictionaryConfig, Entry, LookupConfig, SpellModel};

let model = SpellModel::new();
let medical = DictionaryConfig {
    name: "medical".to_string(),
    ..DictionaryConfig::default()
};
model.add_entry(Entry::new("ibuprofen", 42), &medical);

let found = model
    .lookup(
        "ibuprofen",
        &LookupConfig {
            dictionary: "medical".to_string(),
            ..LookupConfig::default()
        },
    )
    .unwrap();
assert_eq!(found.len(), 1);
```

*/

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

mod edit_distance;
mod error;
mod index;
mod persistence;
mod spell;

pub use edit_distance::{
    damerau_levenshtein, damerau_levenshtein_runes, levenshtein, levenshtein_runes, DistanceFn,
};
pub use error::SpellError;
pub use index::{fnv1a_32, DeleteDescriptor, DeletesIndex, Entry, Library, WordData};
pub use spell::{
    DictionaryConfig, Entries, LookupConfig, Segment, SegmentConfig, SegmentResult, SortFn,
    SpellModel, Suggestion, SuggestionLevel,
};
