//! Beam segmenter (C10): joint word-boundary search and per-segment
//! correction under bigram constraints (spec.md §4.8).

use crate::lookup::LookupEngine;
use crate::store::BigramStore;
use crate::types::{Composition, Verbosity};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Edit-distance penalty applied to a hypothesis's score. Not exposed on
/// the programmatic surface (spec.md §6.3 only parameterizes
/// `max_edit_distance`/`beam_width`/`max_segment_len`); this is the fixed
/// internal constant spec.md §4.8 calls `P`.
const EDIT_PENALTY: f64 = 5.0;

/// `bigram("p c.word") == 0` with no previous word fallback: when a
/// bigram store is missing entirely, there is no way to score boundaries
/// at all, so segmentation degrades to reporting the input unchanged
/// (spec.md §4.8).
const NO_BIGRAM_STORE_LOG_PROB: f64 = -50.0;

const TERMINAL_FALLBACK_PENALTY: f64 = -5.0;

struct SegCandidate {
    word: String,
    distance: u32,
    freq: u64,
}

#[derive(Clone)]
struct Hypothesis {
    position: usize,
    words: Vec<String>,
    original_segments: Vec<String>,
    log_prob_sum: f64,
    edit_distance: u32,
}

impl Hypothesis {
    fn score(&self) -> f64 {
        self.log_prob_sum - self.edit_distance as f64 * EDIT_PENALTY
    }
}

fn candidates_for_segment(seg: &str, l: usize, max_edit_distance: u32, lookup: &LookupEngine) -> Vec<SegCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    let exact_count = lookup.store.get(seg);
    if exact_count > 0 && seen.insert(seg.to_string()) {
        out.push(SegCandidate {
            word: seg.to_string(),
            distance: 0,
            freq: exact_count,
        });
    }

    if l >= 3 {
        let suggestions = lookup.lookup(seg, Verbosity::Closest, max_edit_distance, false, false, None);
        for s in suggestions {
            let len_diff = (s.term.chars().count() as i64 - l as i64).unsigned_abs() as u32;
            if len_diff > max_edit_distance {
                continue;
            }
            if seen.insert(s.term.clone()) {
                out.push(SegCandidate {
                    word: s.term,
                    distance: s.distance,
                    freq: s.count,
                });
            }
        }
    }

    out.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| b.freq.cmp(&a.freq)));
    out.truncate(3);

    if out.is_empty() {
        out.push(SegCandidate {
            word: seg.to_string(),
            distance: max_edit_distance + 1,
            freq: 0,
        });
    }
    out
}

pub fn segment(
    phrase: &str,
    lookup: &LookupEngine,
    bigrams: Option<&BigramStore>,
    max_edit_distance: u32,
    beam_width: usize,
    max_segment_len: usize,
) -> Composition {
    let Some(bigrams) = bigrams else {
        return Composition {
            segmented: phrase.to_string(),
            corrected: phrase.to_string(),
            distance: 0,
            log_prob_sum: NO_BIGRAM_STORE_LOG_PROB,
        };
    };

    let input: Vec<char> = phrase.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    if input.is_empty() {
        return Composition {
            segmented: phrase.to_string(),
            corrected: phrase.to_string(),
            distance: 0,
            log_prob_sum: NO_BIGRAM_STORE_LOG_PROB,
        };
    }
    let input_len = input.len();

    let mut beam = vec![Hypothesis {
        position: 0,
        words: Vec::new(),
        original_segments: Vec::new(),
        log_prob_sum: 0.0,
        edit_distance: 0,
    }];

    loop {
        if !beam.iter().any(|h| h.position < input_len) {
            break;
        }

        let mut next_beam = Vec::new();
        for h in &beam {
            if h.position >= input_len {
                next_beam.push(h.clone());
                continue;
            }
            let remaining = input_len - h.position;
            let max_l = max_segment_len.min(remaining);
            for l in 1..=max_l {
                let seg: String = input[h.position..h.position + l].iter().collect();
                let is_last_segment = h.position + l == input_len;
                let segcands = candidates_for_segment(&seg, l, max_edit_distance, lookup);
                for c in &segcands {
                    let (allowed, log_prob_add) = match h.words.last() {
                        None => {
                            let mut lp = (c.freq as f64 + 1.0).ln();
                            if c.distance == 0 && l > 3 {
                                lp += 0.5 * l as f64;
                            }
                            (true, lp)
                        }
                        Some(prev) => {
                            let bigram_count = bigrams.get(&format!("{prev} {}", c.word));
                            if bigram_count > 0 {
                                (true, (bigram_count as f64 + 1.0).ln())
                            } else if is_last_segment && c.distance == 0 {
                                (true, TERMINAL_FALLBACK_PENALTY)
                            } else {
                                (false, 0.0)
                            }
                        }
                    };
                    if !allowed {
                        continue;
                    }
                    let mut words = h.words.clone();
                    words.push(c.word.clone());
                    let mut segs = h.original_segments.clone();
                    segs.push(seg.clone());
                    next_beam.push(Hypothesis {
                        position: h.position + l,
                        words,
                        original_segments: segs,
                        log_prob_sum: h.log_prob_sum + log_prob_add,
                        edit_distance: h.edit_distance + c.distance,
                    });
                }
            }
        }

        if next_beam.is_empty() {
            beam = next_beam;
            break;
        }
        next_beam.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
        next_beam.truncate(beam_width);
        beam = next_beam;
    }

    let best = beam
        .iter()
        .filter(|h| h.position >= input_len)
        .max_by(|a, b| a.score().partial_cmp(&b.score()).unwrap_or(Ordering::Equal));

    let Some(best) = best else {
        return Composition {
            segmented: phrase.to_string(),
            corrected: phrase.to_string(),
            distance: 0,
            log_prob_sum: NO_BIGRAM_STORE_LOG_PROB,
        };
    };

    let joined_input: String = input.iter().collect();
    let whole_input_count = lookup.store.get(&joined_input);
    if whole_input_count > 0 {
        let single_word_score = (whole_input_count as f64 + 1.0).ln();
        let word_count = best.words.len().max(1);
        let segmented_avg_score = best.log_prob_sum / word_count as f64;
        let clearly_better = best.words.len() > 1 && single_word_score < segmented_avg_score * 0.8 && best.edit_distance == 0;
        if !clearly_better {
            return Composition {
                segmented: joined_input.clone(),
                corrected: joined_input,
                distance: 0,
                log_prob_sum: single_word_score,
            };
        }
    }

    Composition {
        segmented: best.original_segments.join(" "),
        corrected: best.words.join(" "),
        distance: best.edit_distance,
        log_prob_sum: best.log_prob_sum,
    }
}
