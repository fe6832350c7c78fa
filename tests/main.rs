use symspell_core::{EngineConfig, SymspellEngine, Verbosity};
use tempfile::tempdir;

fn build_engine(words: &[(&str, u64)], bigrams: &[(&str, u64)], config: EngineConfig) -> (tempfile::TempDir, SymspellEngine) {
    let dir = tempdir().unwrap();
    let words_path = dir.path().join("words.bin");
    let deletes_path = dir.path().join("deletes.bin");
    let owned: Vec<(String, u64)> = words.iter().map(|(t, c)| (t.to_string(), *c)).collect();
    let mut engine = SymspellEngine::build_and_open(&owned, &words_path, &deletes_path, config).unwrap();
    if !bigrams.is_empty() {
        let bigrams_path = dir.path().join("bigrams.bin");
        let owned_bigrams: Vec<(String, u64)> = bigrams.iter().map(|(t, c)| (t.to_string(), *c)).collect();
        symspell_core::BigramStore::build(&owned_bigrams, &bigrams_path).unwrap();
        engine = engine.with_bigram_store(&bigrams_path).unwrap();
    }
    (dir, engine)
}

#[test]
fn scenario1_single_edit_suggestion() {
    let (_dir, engine) = build_engine(&[("hello", 1000), ("world", 900), ("help", 800), ("held", 700)], &[], EngineConfig::default());
    let result = engine.lookup("helo", Verbosity::Top, None, false, false, None);
    assert_eq!(result[0].term, "hello");
    assert_eq!(result[0].distance, 1);
}

#[test]
fn scenario2_verbosity_widens_monotonically() {
    let (_dir, engine) = build_engine(&[("steam", 100), ("steams", 200), ("steem", 150)], &[], EngineConfig::default());
    assert_eq!(engine.lookup("steems", Verbosity::Top, None, false, false, None).len(), 1);
    assert_eq!(engine.lookup("steems", Verbosity::Closest, None, false, false, None).len(), 2);
    assert_eq!(engine.lookup("steems", Verbosity::All, None, false, false, None).len(), 3);
}

#[test]
fn scenario3_unknown_word_without_fallback_is_empty() {
    let (_dir, engine) = build_engine(&[("hello", 1000)], &[], EngineConfig::default().with_max_edit_distance(1));
    let result = engine.lookup("zzzzzzzzzzzz", Verbosity::Top, None, false, false, None);
    assert!(result.is_empty());
}

#[test]
fn scenario5_auto_correction_respects_min_confidence() {
    let (_dir, engine) = build_engine(&[("hello", 1_000_000), ("help", 500), ("held", 400)], &[], EngineConfig::default());
    let confident = engine.auto_correction("helo", Some(0.5));
    assert_eq!(confident.unwrap().0, "hello");
    let strict = engine.auto_correction("helo", Some(0.999));
    assert!(strict.is_none());
}

#[test]
fn scenario6_bigram_override_promotes_context_word() {
    let (_dir, engine) = build_engine(
        &[("bow", 50_000), ("how", 500_000), ("wonder", 100_000)],
        &[("wonder how", 1_000_000), ("wonder bow", 100)],
        EngineConfig::default().with_ranking_mode(symspell_core::RankingMode::FrequencyBoosted),
    );
    let without_context = engine.lookup("bow", Verbosity::Closest, None, false, false, None);
    assert_eq!(without_context[0].term, "bow");
    let with_context = engine.lookup("bow", Verbosity::Closest, None, false, false, Some("wonder"));
    assert_eq!(with_context[0].term, "how");
}

#[test]
fn lookup_compound_corrects_each_word_independently() {
    let (_dir, engine) = build_engine(&[("whats", 1000), ("up", 900)], &[], EngineConfig::default());
    let result = engine.lookup_compound("whts upp", None, false);
    assert_eq!(result.term, "whats up");
}

#[test]
fn segment_splits_concatenated_words() {
    let (_dir, engine) = build_engine(
        &[("the", 1_000_000), ("quick", 100_000), ("brown", 90_000), ("fox", 80_000)],
        &[("the quick", 500_000), ("quick brown", 400_000), ("brown fox", 300_000)],
        EngineConfig::default().with_max_edit_distance(1),
    );
    let result = engine.segment("thequickbrownfox", None, None, None);
    assert_eq!(result.corrected, "the quick brown fox");
}

#[test]
fn prefix_lookup_filters_by_adaptive_frequency_threshold() {
    let (_dir, engine) = build_engine(&[("helsinki", 5_000), ("help", 50)], &[], EngineConfig::default());
    let result = engine.prefix_lookup("hel", 10, None);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].term, "helsinki");
}
