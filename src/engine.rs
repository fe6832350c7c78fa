//! `SymspellEngine`: the top-level handle gluing the stores, optional
//! keyboard layout and configuration together behind the five
//! programmatic-surface operations (spec.md §6.3).

use crate::autocorrect::AutoCorrector;
use crate::compound;
use crate::error::Error;
use crate::keyboard::KeyboardLayout;
use crate::lookup::LookupEngine;
use crate::scorer::Scorer;
use crate::segment;
use crate::deletes::DeletesIndex;
use crate::store::{BigramStore, WordStore};
use crate::types::{AutoCorrectConfig, Composition, RankingMode, ScoreWeights, SuggestItem, Verbosity};
use std::path::Path;

/// Flat options record, following the teacher's `SearchParameters`
/// builder-method pattern (spec.md §3 ambient additions).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub max_edit_distance: u32,
    pub prefix_length: u32,
    pub verbosity: Verbosity,
    pub ranking_mode: RankingMode,
    pub score_weights: Option<ScoreWeights>,
    pub autocorrect: AutoCorrectConfig,
    pub cache_capacity: usize,
    pub beam_width: usize,
    pub max_segment_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: 2,
            prefix_length: 7,
            verbosity: Verbosity::Closest,
            ranking_mode: RankingMode::Balanced,
            score_weights: None,
            autocorrect: AutoCorrectConfig::default(),
            cache_capacity: 1000,
            beam_width: 10,
            max_segment_len: 20,
        }
    }
}

impl EngineConfig {
    /// Favors precision: smaller edit distance, distance-dominated
    /// ranking, a stricter auto-correct threshold.
    pub fn conservative() -> Self {
        Self {
            max_edit_distance: 1,
            ranking_mode: RankingMode::DistanceFirst,
            autocorrect: AutoCorrectConfig {
                min_confidence: 0.85,
                ..AutoCorrectConfig::default()
            },
            ..Self::default()
        }
    }

    /// Favors recall: larger edit distance, frequency-weighted ranking, a
    /// looser auto-correct threshold.
    pub fn aggressive() -> Self {
        Self {
            max_edit_distance: 3,
            ranking_mode: RankingMode::FrequencyBoosted,
            autocorrect: AutoCorrectConfig {
                min_confidence: 0.6,
                ..AutoCorrectConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn with_max_edit_distance(mut self, value: u32) -> Self {
        self.max_edit_distance = value;
        self
    }

    pub fn with_prefix_length(mut self, value: u32) -> Self {
        self.prefix_length = value;
        self
    }

    pub fn with_verbosity(mut self, value: Verbosity) -> Self {
        self.verbosity = value;
        self
    }

    pub fn with_ranking_mode(mut self, value: RankingMode) -> Self {
        self.ranking_mode = value;
        self
    }

    pub fn with_score_weights(mut self, value: ScoreWeights) -> Self {
        self.score_weights = Some(value);
        self
    }

    pub fn with_autocorrect(mut self, value: AutoCorrectConfig) -> Self {
        self.autocorrect = value;
        self
    }

    pub fn with_cache_capacity(mut self, value: usize) -> Self {
        self.cache_capacity = value;
        self
    }

    pub fn with_beam_width(mut self, value: usize) -> Self {
        self.beam_width = value;
        self
    }

    pub fn with_max_segment_len(mut self, value: usize) -> Self {
        self.max_segment_len = value;
        self
    }

    fn build_scorer(&self) -> Scorer {
        match self.score_weights {
            Some(weights) => Scorer::with_weights(self.ranking_mode, weights),
            None => Scorer::new(self.ranking_mode),
        }
    }
}

pub struct SymspellEngine {
    store: WordStore,
    deletes: DeletesIndex,
    bigrams: Option<BigramStore>,
    keyboard: Option<KeyboardLayout>,
    config: EngineConfig,
    scorer: Scorer,
}

/// spec.md §7 `InvalidConfig`: `prefix_length` must exceed
/// `max(1, max_edit_distance)`, and must be checked before any file is
/// opened or built so a bad config never produces a half-constructed
/// engine.
fn validate_config(config: &EngineConfig) -> Result<(), Error> {
    let floor = config.max_edit_distance.max(1);
    if config.prefix_length <= floor {
        return Err(Error::InvalidConfig {
            reason: format!(
                "prefix_length ({}) must be greater than max(1, max_edit_distance) ({})",
                config.prefix_length, floor
            ),
        });
    }
    Ok(())
}

impl SymspellEngine {
    /// Open pre-built `words.bin`/`deletes.bin` files.
    pub fn open<P1: AsRef<Path>, P2: AsRef<Path>>(words_path: P1, deletes_path: P2, config: EngineConfig) -> Result<Self, Error> {
        validate_config(&config)?;
        let store = WordStore::open_with_cache_capacity(words_path, config.cache_capacity)?;
        let deletes = DeletesIndex::open(deletes_path)?;
        let scorer = config.build_scorer();
        tracing::info!(words = store.len(), "opened symspell engine");
        Ok(Self {
            store,
            deletes,
            bigrams: None,
            keyboard: None,
            config,
            scorer,
        })
    }

    /// Run the offline build pipeline (spec.md §4.13: `WordStore::build`
    /// then `DeletesIndex::build` against the just-written store) and
    /// open the result.
    pub fn build_and_open<P1: AsRef<Path>, P2: AsRef<Path>>(
        words: &[(String, u64)],
        words_path: P1,
        deletes_path: P2,
        config: EngineConfig,
    ) -> Result<Self, Error> {
        validate_config(&config)?;
        WordStore::build(words, &words_path)?;
        let store = WordStore::open_with_cache_capacity(&words_path, config.cache_capacity)?;
        DeletesIndex::build(&store, config.prefix_length, config.max_edit_distance, &deletes_path)?;
        let deletes = DeletesIndex::open(&deletes_path)?;
        let scorer = config.build_scorer();
        tracing::info!(words = store.len(), "built and opened symspell engine");
        Ok(Self {
            store,
            deletes,
            bigrams: None,
            keyboard: None,
            config,
            scorer,
        })
    }

    pub fn with_bigram_store<P: AsRef<Path>>(mut self, path: P) -> Result<Self, Error> {
        self.bigrams = Some(BigramStore::open_with_cache_capacity(path, self.config.cache_capacity)?);
        Ok(self)
    }

    pub fn with_keyboard<P: AsRef<Path>>(mut self, path: P) -> Result<Self, Error> {
        self.keyboard = Some(KeyboardLayout::open(path)?);
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lookup_engine(&self) -> LookupEngine<'_> {
        LookupEngine {
            store: &self.store,
            deletes: &self.deletes,
            bigrams: self.bigrams.as_ref(),
            keyboard: self.keyboard.as_ref(),
            prefix_length: self.config.prefix_length,
            scorer: &self.scorer,
        }
    }

    fn clamp_max_edit_distance(&self, override_max_edit_distance: Option<u32>) -> u32 {
        override_max_edit_distance
            .unwrap_or(self.config.max_edit_distance)
            .min(self.config.max_edit_distance)
    }

    pub fn lookup(
        &self,
        phrase: &str,
        verbosity: Verbosity,
        override_max_edit_distance: Option<u32>,
        include_unknown: bool,
        transfer_casing: bool,
        previous_word: Option<&str>,
    ) -> Vec<SuggestItem> {
        let max = self.clamp_max_edit_distance(override_max_edit_distance);
        self.lookup_engine().lookup(phrase, verbosity, max, include_unknown, transfer_casing, previous_word)
    }

    /// Adaptive frequency threshold by prefix length (spec.md §6.3).
    pub fn prefix_lookup(&self, prefix: &str, limit: usize, min_frequency: Option<u64>) -> Vec<SuggestItem> {
        let threshold = min_frequency.unwrap_or_else(|| match prefix.chars().count() {
            0..=2 => 10_000,
            3 => 1_000,
            4 => 100,
            _ => 10,
        });
        self.store
            .prefix_scan(prefix, limit)
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(term, count)| SuggestItem::new(term, 0, count))
            .collect()
    }

    pub fn auto_correction(&self, word: &str, min_confidence: Option<f64>) -> Option<(String, f64)> {
        let corrector = AutoCorrector {
            store: &self.store,
            deletes: &self.deletes,
            bigrams: self.bigrams.as_ref(),
            keyboard: self.keyboard.as_ref(),
            prefix_length: self.config.prefix_length,
            config: self.config.autocorrect,
        };
        corrector.auto_correction(word, self.config.max_edit_distance, min_confidence.unwrap_or(self.config.autocorrect.min_confidence))
    }

    pub fn lookup_compound(&self, phrase: &str, override_max_edit_distance: Option<u32>, transfer_casing: bool) -> SuggestItem {
        let max = self.clamp_max_edit_distance(override_max_edit_distance);
        compound::lookup_compound(phrase, &self.lookup_engine(), max, transfer_casing)
    }

    pub fn segment(
        &self,
        phrase: &str,
        override_max_edit_distance: Option<u32>,
        beam_width: Option<usize>,
        max_segment_len: Option<usize>,
    ) -> Composition {
        let max = self.clamp_max_edit_distance(override_max_edit_distance);
        segment::segment(
            phrase,
            &self.lookup_engine(),
            self.bigrams.as_ref(),
            max,
            beam_width.unwrap_or(self.config.beam_width),
            max_segment_len.unwrap_or(self.config.max_segment_len),
        )
    }
}
