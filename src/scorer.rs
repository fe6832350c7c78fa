//! Scorer (C8): combines edit distance, unigram frequency and bigram
//! context into a single rank, per spec.md §4.6.

use crate::types::{RankingMode, ScoreWeights, SuggestItem};

/// Constant from spec.md §4.6's `DistanceFirst` formula: bigram frequency
/// only ever acts as an in-tier tiebreaker since the distance term
/// dominates by `10^9` (spec.md §9, Open Question 1).
pub const DISTANCE_FIRST_BIGRAM_MULTIPLIER: f64 = 10.0;

/// The exact-match bonus for `Balanced`/`FrequencyBoosted`. Kept small and
/// named so nobody "fixes" scenario 6 from spec.md §8 by enlarging it
/// (spec.md §9, Open Question 2).
pub const EXACT_MATCH_BONUS: f64 = 0.01;

/// A scored candidate prior to ranking. `bigram_freq` is the frequency of
/// `"previous_word candidate.term"` in the bigram store, or 0 when there
/// is no previous word or no such bigram.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub term: String,
    pub distance: u32,
    pub count: u64,
    pub bigram_freq: u64,
}

pub struct Scorer {
    pub mode: RankingMode,
    pub weights: ScoreWeights,
}

impl Scorer {
    pub fn new(mode: RankingMode) -> Self {
        Self {
            weights: mode.default_weights(),
            mode,
        }
    }

    pub fn with_weights(mode: RankingMode, weights: ScoreWeights) -> Self {
        Self { mode, weights }
    }

    fn score_one(&self, candidate: &Candidate, max_edit_distance: u32, max_count: u64, max_bigram: u64) -> f64 {
        match self.mode {
            RankingMode::DistanceFirst => {
                let tier = (max_edit_distance as f64 + 1.0 - candidate.distance as f64) * 1e9;
                tier + candidate.count as f64 + candidate.bigram_freq as f64 * DISTANCE_FIRST_BIGRAM_MULTIPLIER
            }
            RankingMode::Balanced | RankingMode::FrequencyBoosted => {
                let dist_pen = candidate.distance as f64 / (max_edit_distance.max(1) as f64);
                let norm_freq = if max_count == 0 {
                    0.0
                } else {
                    (candidate.count as f64 + 1.0).log10() / (max_count as f64 + 1.0).log10()
                };
                let norm_bi = if candidate.bigram_freq > 0 && max_bigram > 0 {
                    (candidate.bigram_freq as f64 + 1.0).log10() / (max_bigram as f64 + 1.0).log10()
                } else {
                    0.0
                };
                let exact_bonus = if candidate.distance == 0 { EXACT_MATCH_BONUS } else { 0.0 };
                exact_bonus + (1.0 - dist_pen) * self.weights.w_d + norm_freq * self.weights.w_f + norm_bi * self.weights.w_b
            }
        }
    }

    /// Rank candidates, returning `SuggestItem`s sorted descending by
    /// score, ties broken by descending count then ascending term
    /// (spec.md §4.6, §5 "Ordering guarantees").
    ///
    /// `max_count`/`max_bigram` are the normalization denominators for
    /// `norm_freq`/`norm_bi` (spec.md §4.6) and must be the dict/bigram
    /// store's *global* max-frequency estimate (C1's `estimate_max_count`,
    /// spec.md §4.1/§2) -- not the max over this particular candidate set,
    /// which would inflate the normalized score whenever every candidate
    /// happens to be low-frequency.
    pub fn rank(&self, candidates: Vec<Candidate>, max_edit_distance: u32, max_count: u64, max_bigram: u64) -> Vec<SuggestItem> {
        let mut scored: Vec<(f64, Candidate)> = candidates
            .into_iter()
            .map(|c| {
                let score = self.score_one(&c, max_edit_distance, max_count, max_bigram);
                (score, c)
            })
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| a.term.cmp(&b.term))
        });

        scored
            .into_iter()
            .map(|(_, c)| SuggestItem::new(c.term, c.distance, c.count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(term: &str, distance: u32, count: u64, bigram_freq: u64) -> Candidate {
        Candidate {
            term: term.to_string(),
            distance,
            count,
            bigram_freq,
        }
    }

    #[test]
    fn distance_first_keeps_distance_primary() {
        let scorer = Scorer::new(RankingMode::DistanceFirst);
        let candidates = vec![
            candidate("the", 1, 10_000_000, 1_000),
            candidate("tie", 1, 5_000, 0),
        ];
        let ranked = scorer.rank(candidates, 2, 10_000_000, 1_000);
        assert_eq!(ranked[0].term, "the");
    }

    #[test]
    fn distance_first_never_lets_bigram_cross_tiers() {
        let scorer = Scorer::new(RankingMode::DistanceFirst);
        // a distance-2 candidate with a huge bigram frequency must never
        // outrank a distance-1 candidate with a tiny count.
        let candidates = vec![candidate("far", 2, 1, 1_000_000_000), candidate("near", 1, 1, 0)];
        let ranked = scorer.rank(candidates, 2, 1, 1_000_000_000);
        assert_eq!(ranked[0].term, "near");
    }

    #[test]
    fn bigram_context_can_override_exact_match_under_frequency_boosted() {
        // scenario 6 from spec.md §8
        let scorer = Scorer::new(RankingMode::FrequencyBoosted);
        let candidates = vec![
            candidate("bow", 0, 50_000, 100),
            candidate("how", 1, 500_000, 1_000_000),
        ];
        let ranked = scorer.rank(candidates, 2, 500_000, 1_000_000);
        assert_eq!(ranked[0].term, "how");
    }

    #[test]
    fn tie_break_by_count_then_term() {
        let scorer = Scorer::new(RankingMode::DistanceFirst);
        let candidates = vec![candidate("zeta", 1, 10, 0), candidate("alpha", 1, 10, 0)];
        let ranked = scorer.rank(candidates, 2, 10, 0);
        assert_eq!(ranked[0].term, "alpha");
    }
}
