//! Lookup engine (C7): candidate generation from prefix deletes, distance
//! filtering with early pruning, verbosity policy, bigram-aware override
//! and casing transfer (spec.md §4.5).

use crate::casing;
use crate::distance::damerau_levenshtein;
use crate::keyboard::KeyboardLayout;
use crate::scorer::{Candidate, Scorer};
use crate::deletes::DeletesIndex;
use crate::store::{BigramStore, WordStore};
use crate::types::{SuggestItem, Verbosity};
use std::collections::{HashSet, VecDeque};

/// Borrows everything a single `lookup` call needs. Built fresh by
/// `SymspellEngine` for every call rather than stored, since all of its
/// fields are themselves borrowed from the engine's owned stores.
pub struct LookupEngine<'a> {
    pub store: &'a WordStore,
    pub deletes: &'a DeletesIndex,
    pub bigrams: Option<&'a BigramStore>,
    pub keyboard: Option<&'a KeyboardLayout>,
    pub prefix_length: u32,
    pub scorer: &'a Scorer,
}

impl<'a> LookupEngine<'a> {
    fn bigram_freq(&self, previous_word: &str, term: &str) -> u64 {
        match self.bigrams {
            Some(store) => store.get(&format!("{previous_word} {term}")),
            None => 0,
        }
    }

    fn make_candidate(&self, term: &str, distance: u32, count: u64, previous_word: Option<&str>) -> Candidate {
        Candidate {
            term: term.to_string(),
            distance,
            count,
            bigram_freq: previous_word.map(|p| self.bigram_freq(p, term)).unwrap_or(0),
        }
    }

    fn apply_casing(&self, items: Vec<SuggestItem>, phrase: &str, transfer_casing: bool) -> Vec<SuggestItem> {
        if !transfer_casing {
            return items;
        }
        items
            .into_iter()
            .map(|mut item| {
                item.term = casing::transfer_case(phrase, &item.term);
                item
            })
            .collect()
    }

    fn finish(&self, kept: Vec<Candidate>, phrase: &str, max_edit_distance: u32, transfer_casing: bool) -> Vec<SuggestItem> {
        let max_count = self.store.estimate_max_count();
        let max_bigram = self.bigrams.map(|b| b.estimate_max_count()).unwrap_or(0);
        let ranked = self.scorer.rank(kept, max_edit_distance, max_count, max_bigram);
        self.apply_casing(ranked, phrase, transfer_casing)
    }

    /// `phrase` may carry original casing; `previous_word`, if present, is
    /// assumed already normalized by the caller.
    pub fn lookup(
        &self,
        phrase: &str,
        verbosity: Verbosity,
        max_edit_distance: u32,
        include_unknown: bool,
        transfer_casing: bool,
        previous_word: Option<&str>,
    ) -> Vec<SuggestItem> {
        let query = if transfer_casing { phrase.to_lowercase() } else { phrase.to_string() };
        if query.is_empty() {
            return Vec::new();
        }

        let mut current_max = max_edit_distance;
        let mut kept: Vec<Candidate> = Vec::new();
        let mut found_exact = false;

        let exact_count = self.store.get(&query);
        if exact_count > 0 {
            found_exact = true;
            kept.push(self.make_candidate(&query, 0, exact_count, previous_word));
            if verbosity != Verbosity::All && previous_word.is_none() {
                return self.finish(kept, phrase, max_edit_distance, transfer_casing);
            }
            if previous_word.is_some() {
                // an exact match already beats any distance-2+ alternative by context alone
                current_max = current_max.min(1);
            }
        }

        if max_edit_distance == 0 {
            if !found_exact && include_unknown {
                kept.push(Candidate {
                    term: query.clone(),
                    distance: max_edit_distance + 1,
                    count: 0,
                    bigram_freq: 0,
                });
            }
            return self.finish(kept, phrase, max_edit_distance, transfer_casing);
        }

        let collect_all = previous_word.is_some();
        let query_len = query.chars().count() as i64;
        // spec.md §4.5 step 4 prunes on `prefix_len(phrase) - |C|`, where
        // `prefix_len(phrase)` is the length of the prefix actually seeded
        // (`min(|phrase|, prefix_length)`), not the full query length --
        // using `query_len` directly here would prune the seed itself for
        // any query longer than `prefix_length`.
        let input_prefix_len = query_len.min(self.prefix_length as i64);

        let mut queue: VecDeque<String> = VecDeque::new();
        let mut queued: HashSet<String> = HashSet::new();
        let seed: String = query.chars().take(self.prefix_length as usize).collect();
        queued.insert(seed.clone());
        queue.push_back(seed);

        let mut considered: HashSet<u32> = HashSet::new();
        let mut best_distance_found: Option<u32> = kept.first().map(|c| c.distance);

        while let Some(c) = queue.pop_front() {
            let c_len = c.chars().count() as i64;
            if input_prefix_len - c_len > current_max as i64 {
                continue;
            }

            for idx in self.deletes.get(&c) {
                if !considered.insert(idx) {
                    continue;
                }
                let Some((sugg, count)) = self.store.at(idx as usize) else {
                    continue;
                };
                if sugg == query {
                    continue;
                }
                let sugg_len = sugg.chars().count() as i64;
                if (sugg_len - query_len).unsigned_abs() as u32 > current_max {
                    continue;
                }
                if sugg_len < c_len {
                    continue;
                }
                if sugg_len == c_len && sugg != c {
                    continue;
                }
                let Some(dist) = damerau_levenshtein(&query, sugg, current_max, self.keyboard) else {
                    continue;
                };
                let candidate = Candidate {
                    term: sugg.to_string(),
                    distance: dist,
                    count,
                    bigram_freq: previous_word.map(|p| self.bigram_freq(p, sugg)).unwrap_or(0),
                };

                if collect_all {
                    if best_distance_found.map_or(true, |b| dist < b) {
                        best_distance_found = Some(dist);
                    }
                    kept.push(candidate);
                } else {
                    match verbosity {
                        Verbosity::Top => {
                            let replace = match kept.first() {
                                None => true,
                                Some(top) => dist < top.distance || (dist == top.distance && count > top.count),
                            };
                            if replace {
                                kept.clear();
                                kept.push(candidate);
                                current_max = dist;
                            }
                        }
                        Verbosity::Closest => match best_distance_found {
                            None => {
                                current_max = dist;
                                best_distance_found = Some(dist);
                                kept.push(candidate);
                            }
                            Some(best) if dist < best => {
                                kept.clear();
                                current_max = dist;
                                best_distance_found = Some(dist);
                                kept.push(candidate);
                            }
                            Some(best) if dist == best => kept.push(candidate),
                            _ => {}
                        },
                        Verbosity::All => kept.push(candidate),
                    }
                }
            }

            if c_len <= self.prefix_length as i64 && input_prefix_len - c_len < current_max as i64 {
                let chars: Vec<char> = c.chars().collect();
                for i in 0..chars.len() {
                    let mut child_chars = chars.clone();
                    child_chars.remove(i);
                    let child: String = child_chars.into_iter().collect();
                    if queued.insert(child.clone()) {
                        queue.push_back(child);
                    }
                }
            }
        }

        if collect_all {
            // the bigram-aware override collects like All, then ranks, then
            // caps the report to however many items the requested verbosity
            // would have kept -- but the *selection* comes from the
            // post-rank order, so context can promote a worse-distance
            // candidate into the reported slice (spec.md §4.5, §8 scenario 6).
            let cap = match verbosity {
                Verbosity::Top => 1,
                Verbosity::Closest => {
                    let best = best_distance_found.unwrap_or(max_edit_distance);
                    kept.iter().filter(|c| c.distance == best).count().max(1)
                }
                Verbosity::All => kept.len(),
            };
            let max_count = self.store.estimate_max_count();
            let max_bigram = self.bigrams.map(|b| b.estimate_max_count()).unwrap_or(0);
            let mut ranked = self.scorer.rank(kept, max_edit_distance, max_count, max_bigram);
            ranked.truncate(cap);
            return self.apply_casing(ranked, phrase, transfer_casing);
        }

        self.finish(kept, phrase, max_edit_distance, transfer_casing)
    }
}
