// On-disk form of a model: a gzip-compressed JSON document holding the index
// options and every dictionary's entries. Loading replays the entries through
// add_entry, so the deletes index is rebuilt rather than persisted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpellError;
use crate::index::Entry;
use crate::spell::{DictionaryConfig, SpellModel};

#[derive(Serialize, Deserialize)]
struct ModelOptions {
    #[serde(rename = "editDistance")]
    edit_distance: u32,
    #[serde(rename = "prefixLength")]
    prefix_length: u32,
}

#[derive(Serialize, Deserialize)]
struct ModelDocument {
    options: ModelOptions,
    words: AHashMap<String, AHashMap<String, Entry>>,
}

impl SpellModel {
    /// Saves a representation of the model to `path`.
    pub fn save(&self, path: &Path) -> Result<(), SpellError> {
        let document = ModelDocument {
            options: ModelOptions {
                edit_distance: self.max_edit_distance,
                prefix_length: self.prefix_length,
            },
            words: self.library_snapshot(),
        };

        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut encoder, &document)?;
        encoder.finish()?;

        debug!(path = %path.display(), "saved model");
        Ok(())
    }

    /// Loads a model previously written by [`SpellModel::save`]. The saved
    /// options are applied before the entries are replayed, so the deletes
    /// index is rebuilt at the persisted depth and prefix length.
    pub fn load(path: &Path) -> Result<SpellModel, SpellError> {
        let file = File::open(path)?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let document: ModelDocument = serde_json::from_reader(decoder)?;

        let mut model = SpellModel::new();
        model.max_edit_distance = document.options.edit_distance;
        model.prefix_length = document.options.prefix_length;

        let mut count = 0usize;
        for (dictionary, entries) in document.words {
            let cfg = DictionaryConfig {
                name: dictionary,
                ..DictionaryConfig::default()
            };
            for (_, entry) in entries {
                model.add_entry(entry, &cfg);
                count += 1;
            }
        }

        debug!(path = %path.display(), words = count, "loaded model");
        Ok(model)
    }

    /// Loads dictionary entries from a file of words, one per line, each
    /// with frequency 1. Merges with any dictionary data already loaded.
    /// Words added before an I/O error are kept.
    pub fn create_dictionary(
        &self,
        path: &Path,
        cfg: &DictionaryConfig,
    ) -> Result<bool, SpellError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut count = 0usize;
        for line in reader.lines() {
            let word = line?;
            self.add_entry(Entry::new(word, 1), cfg);
            count += 1;
        }

        debug!(path = %path.display(), dictionary = %cfg.name, words = count, "created dictionary");
        Ok(true)
    }
}
