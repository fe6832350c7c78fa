use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single scored spelling suggestion.
///
/// Natural order is ascending distance, then descending count; equality is
/// by term only (two items for the same term but different bookkeeping are
/// considered the same suggestion).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestItem {
    pub term: String,
    pub distance: u32,
    pub count: u64,
}

impl SuggestItem {
    pub fn new(term: impl Into<String>, distance: u32, count: u64) -> Self {
        Self {
            term: term.into(),
            distance,
            count,
        }
    }
}

impl PartialEq for SuggestItem {
    fn eq(&self, other: &Self) -> bool {
        self.term == other.term
    }
}
impl Eq for SuggestItem {}

impl PartialOrd for SuggestItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SuggestItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.count.cmp(&self.count))
    }
}

/// Controls how many and which suggestions a lookup returns, per spec.md
/// §4.5's verbosity policy table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// Keep a single best item, tightening the distance bound as better
    /// matches are found.
    Top,
    /// Keep all items tied at the current best distance.
    Closest,
    /// Keep everything within `max_edit_distance`.
    All,
}

/// Selects which scoring formula `Scorer` uses to rank candidates of
/// equal-or-different distance (spec.md §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RankingMode {
    /// Distance dominates; frequency/bigram only break ties within a tier.
    DistanceFirst,
    /// Blend of distance, frequency and bigram context.
    Balanced,
    /// Like `Balanced` but frequency is weighted more heavily.
    FrequencyBoosted,
}

/// Weights for `Balanced`/`FrequencyBoosted` scoring. Not used by
/// `DistanceFirst`, which has its own fixed formula (see `scorer::DISTANCE_FIRST_BIGRAM_MULTIPLIER`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub w_d: f64,
    pub w_f: f64,
    pub w_b: f64,
}

impl RankingMode {
    /// Default weights for this mode, per spec.md §4.6. `DistanceFirst`
    /// returns a nominal weighting since it does not consult `ScoreWeights`
    /// at all (it has its own fixed formula).
    pub fn default_weights(&self) -> ScoreWeights {
        match self {
            RankingMode::DistanceFirst => ScoreWeights {
                w_d: 1.0,
                w_f: 0.0,
                w_b: 0.0,
            },
            RankingMode::Balanced => ScoreWeights {
                w_d: 0.5,
                w_f: 0.3,
                w_b: 0.2,
            },
            RankingMode::FrequencyBoosted => ScoreWeights {
                w_d: 0.3,
                w_f: 0.4,
                w_b: 0.3,
            },
        }
    }
}

/// Knobs for the auto-correction policy (spec.md §4.7). Field names and
/// defaults are exactly those named in the spec.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutoCorrectConfig {
    pub min_confidence: f64,
    pub distance_penalty_per_edit: f64,
    pub ambiguity_mult: f64,
    pub short_word_threshold: usize,
    pub short_word_penalty_per_char: f64,
    pub high_freq_bonus: f64,
    pub high_freq_threshold: u64,
    pub valid_word_max_confidence: f64,
    pub valid_word_min_freq_ratio: f64,
}

impl Default for AutoCorrectConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
            distance_penalty_per_edit: 0.2,
            ambiguity_mult: 0.6,
            short_word_threshold: 4,
            short_word_penalty_per_char: 0.07,
            high_freq_bonus: 0.05,
            high_freq_threshold: 100_000,
            valid_word_max_confidence: 0.6,
            valid_word_min_freq_ratio: 10.0,
        }
    }
}

/// The segmenter's result: original segmentation, corrected form, total
/// edit distance and cumulative log-bigram-probability (spec.md §3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub segmented: String,
    pub corrected: String,
    pub distance: u32,
    pub log_prob_sum: f64,
}

/// The four casing classes a source token can fall into, used by the
/// casing-transfer step (C12).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasingClass {
    AllUpper,
    AllLower,
    Title,
    /// Character-by-character upper/lower flags of the source token.
    Mixed(Vec<bool>),
}
