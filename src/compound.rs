//! Compound corrector (C11): whitespace-split per-token correction
//! (spec.md §4.9). The simple phrase path -- it never merges or splits
//! adjacent tokens, unlike the beam segmenter (C10).

use crate::lookup::LookupEngine;
use crate::types::{SuggestItem, Verbosity};

pub fn lookup_compound(phrase: &str, lookup: &LookupEngine, max_edit_distance: u32, transfer_casing: bool) -> SuggestItem {
    let mut corrected_words = Vec::new();
    let mut total_distance: u32 = 0;
    let mut total_count: u64 = 0;

    for token in phrase.split_whitespace() {
        let suggestions = lookup.lookup(token, Verbosity::Top, max_edit_distance, false, transfer_casing, None);
        match suggestions.first() {
            Some(best) => {
                corrected_words.push(best.term.clone());
                total_distance += best.distance;
                total_count += best.count;
            }
            None => {
                corrected_words.push(token.to_string());
                total_distance += max_edit_distance + 1;
            }
        }
    }

    SuggestItem::new(corrected_words.join(" "), total_distance, total_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::Scorer;
    use crate::deletes::DeletesIndex;
    use crate::store::WordStore;
    use crate::types::RankingMode;

    #[test]
    fn corrects_each_token_independently() {
        let dir = tempfile::tempdir().unwrap();
        let words_path = dir.path().join("words.bin");
        let deletes_path = dir.path().join("deletes.bin");
        let owned: Vec<(String, u64)> = vec![("whats".into(), 1000), ("up".into(), 900)];
        WordStore::build(&owned, &words_path).unwrap();
        let store = WordStore::open(&words_path).unwrap();
        DeletesIndex::build(&store, 7, 2, &deletes_path).unwrap();
        let deletes = DeletesIndex::open(&deletes_path).unwrap();
        let scorer = Scorer::new(RankingMode::DistanceFirst);
        let lookup = LookupEngine {
            store: &store,
            deletes: &deletes,
            bigrams: None,
            keyboard: None,
            prefix_length: 7,
            scorer: &scorer,
        };
        let result = lookup_compound("whts upp", &lookup, 2, false);
        assert_eq!(result.term, "whats up");
        assert_eq!(result.distance, 2);
    }

    #[test]
    fn unresolvable_token_reports_max_plus_one_distance() {
        let dir = tempfile::tempdir().unwrap();
        let words_path = dir.path().join("words.bin");
        let deletes_path = dir.path().join("deletes.bin");
        let owned: Vec<(String, u64)> = vec![("hello".into(), 1000)];
        WordStore::build(&owned, &words_path).unwrap();
        let store = WordStore::open(&words_path).unwrap();
        DeletesIndex::build(&store, 7, 2, &deletes_path).unwrap();
        let deletes = DeletesIndex::open(&deletes_path).unwrap();
        let scorer = Scorer::new(RankingMode::DistanceFirst);
        let lookup = LookupEngine {
            store: &store,
            deletes: &deletes,
            bigrams: None,
            keyboard: None,
            prefix_length: 7,
            scorer: &scorer,
        };
        let result = lookup_compound("hello zzzzzzzzzzzz", &lookup, 2, false);
        assert_eq!(result.distance, 0 + 3);
    }
}
