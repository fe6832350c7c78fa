//! Dict store (C1) and, by reuse, bigram store (C3): a sorted (word ->
//! count) map backed by a memory-mapped binary file, queried by binary
//! search (spec.md §4.1, §6.1).

use crate::cache::WordCache;
use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER_LEN: usize = 4;
const OFFSET_LEN: usize = 4;

/// A sorted, mmap-backed (term -> count) store. Used directly as the
/// dict store (C1) and, unchanged, as the bigram store (C3) -- spec.md
/// §4.1 says the bigram store "reuses C1".
pub struct Store {
    mmap: Mmap,
    num_entries: u32,
    path: PathBuf,
    cache: WordCache,
}

/// `BigramStore` is the same on-disk shape and the same reader as
/// `WordStore`; only the caller's convention for the term (`"w1 w2"`)
/// differs.
pub type WordStore = Store;
pub type BigramStore = Store;

/// Common words probed by `estimate_max_count` (spec.md §4.1).
const PROBE_WORDS: &[&str] = &["the", "of", "and", "a", "to", "in", "is", "you", "that", "it"];

impl Store {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::open_with_cache_capacity(path, 1000)
    }

    pub fn open_with_cache_capacity<P: AsRef<Path>>(path: P, cache_capacity: usize) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        if mmap.len() < HEADER_LEN {
            return Err(Error::MalformedFile {
                path,
                reason: "file too short for header".into(),
            });
        }
        let num_entries = LittleEndian::read_u32(&mmap[0..4]);
        Ok(Self {
            mmap,
            num_entries,
            path,
            cache: WordCache::new(cache_capacity),
        })
    }

    /// Build a fresh store file from an in-memory word list. Terms are
    /// sorted and deduplicated (last write for a duplicate term wins,
    /// satisfying spec.md §3's "terms are unique").
    pub fn build<P: AsRef<Path>>(words: &[(String, u64)], path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let mut deduped: std::collections::HashMap<String, u64> = std::collections::HashMap::new();
        for (term, count) in words {
            deduped.insert(term.clone(), *count); // last write for a duplicate term wins
        }
        let mut sorted: Vec<(String, u64)> = deduped.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut records = Vec::with_capacity(sorted.len());
        for (term, count) in &sorted {
            if term.len() > 255 || term.is_empty() {
                return Err(Error::InvalidConfig {
                    reason: format!("term '{term}' must be 1..=255 bytes"),
                });
            }
            let mut record = Vec::with_capacity(1 + term.len() + 8);
            record.push(term.len() as u8);
            record.extend_from_slice(term.as_bytes());
            record
                .write_u64::<LittleEndian>(*count)
                .expect("writing to a Vec cannot fail");
            records.push(record);
        }

        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        writer
            .write_u32::<LittleEndian>(records.len() as u32)
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut offset = HEADER_LEN as u32 + (records.len() as u32) * OFFSET_LEN as u32;
        for record in &records {
            writer.write_u32::<LittleEndian>(offset).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            offset += record.len() as u32;
        }
        for record in &records {
            writer.write_all(record).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        writer.flush().map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(entries = records.len(), path = %path.display(), "wrote store");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.num_entries as usize
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    fn offset_table_entry(&self, index: usize) -> Option<u32> {
        if index >= self.num_entries as usize {
            return None;
        }
        let pos = HEADER_LEN + index * OFFSET_LEN;
        self.mmap.get(pos..pos + 4).map(LittleEndian::read_u32)
    }

    /// Read the record at ordinal `index`. Returns `None` on any
    /// malformed/truncated record or out-of-range index rather than
    /// propagating an error (spec.md §4.1, §7).
    pub fn at(&self, index: usize) -> Option<(&str, u64)> {
        let offset = self.offset_table_entry(index)? as usize;
        let term_len = *self.mmap.get(offset)? as usize;
        let term_start = offset + 1;
        let term_bytes = self.mmap.get(term_start..term_start + term_len)?;
        let term = std::str::from_utf8(term_bytes).ok()?;
        let count_start = term_start + term_len;
        let count_bytes = self.mmap.get(count_start..count_start + 8)?;
        let count = LittleEndian::read_u64(count_bytes);
        Some((term, count))
    }

    fn term_at(&self, index: usize) -> Option<&str> {
        self.at(index).map(|(term, _)| term)
    }

    fn binary_search(&self, term: &str) -> Option<usize> {
        let mut lo = 0usize;
        let mut hi = self.num_entries as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.term_at(mid) {
                Some(candidate) => match candidate.cmp(term) {
                    std::cmp::Ordering::Equal => return Some(mid),
                    std::cmp::Ordering::Less => lo = mid + 1,
                    std::cmp::Ordering::Greater => hi = mid,
                },
                None => return None,
            }
        }
        None
    }

    /// First index whose term is `>= term` (for prefix scanning).
    fn lower_bound(&self, term: &str) -> usize {
        let mut lo = 0usize;
        let mut hi = self.num_entries as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.term_at(mid) {
                Some(candidate) if candidate < term => lo = mid + 1,
                _ => hi = mid,
            }
        }
        lo
    }

    pub fn get(&self, term: &str) -> u64 {
        if let Some(cached) = self.cache.get(term) {
            return cached;
        }
        let count = match self.binary_search(term) {
            Some(idx) => match self.at(idx) {
                Some((_, count)) => count,
                None => {
                    tracing::warn!(term, index = idx, path = %self.path.display(), "malformed record at matched index, degrading to 0");
                    0
                }
            },
            None => 0,
        };
        self.cache.insert(term, count);
        count
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term) > 0
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.binary_search(term)
    }

    /// Prefix-match terms, returning at most `limit` results sorted by
    /// count descending (spec.md §4.1).
    pub fn prefix_scan(&self, prefix: &str, limit: usize) -> Vec<(String, u64)> {
        if limit == 0 {
            return Vec::new();
        }
        let overcollect = limit.saturating_mul(10).max(limit);
        let mut collected: Vec<(String, u64)> = Vec::new();
        let mut idx = self.lower_bound(prefix);
        while collected.len() < overcollect {
            let Some((term, count)) = self.at(idx) else {
                break;
            };
            if !term.starts_with(prefix) {
                break;
            }
            collected.push((term.to_string(), count));
            idx += 1;
        }
        collected.sort_by(|a, b| b.1.cmp(&a.1));
        collected.truncate(limit);
        collected
    }

    /// Estimate the highest frequency count in the store, probing a fixed
    /// set of common words first and falling back to a scan of the first
    /// 100 entries (spec.md §4.1).
    pub fn estimate_max_count(&self) -> u64 {
        let mut max = 0u64;
        for word in PROBE_WORDS {
            max = max.max(self.get(word));
        }
        if max > 0 {
            return max;
        }
        for i in 0..self.num_entries.min(100) as usize {
            if let Some((_, count)) = self.at(i) {
                max = max.max(count);
            }
        }
        max
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_store(words: &[(&str, u64)]) -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.bin");
        let owned: Vec<(String, u64)> = words.iter().map(|(t, c)| (t.to_string(), *c)).collect();
        Store::build(&owned, &path).unwrap();
        let store = Store::open(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn build_open_query_roundtrip() {
        let (_dir, store) = build_store(&[("hello", 1000), ("help", 800), ("held", 700), ("world", 900)]);
        assert_eq!(store.get("hello"), 1000);
        assert_eq!(store.get("missing"), 0);
        assert!(store.contains("help"));
        assert!(!store.contains("missing"));
        let idx = store.index_of("held").unwrap();
        assert_eq!(store.at(idx), Some(("held", 700)));
    }

    #[test]
    fn terms_read_in_strictly_ascending_order() {
        let (_dir, store) = build_store(&[("zebra", 1), ("apple", 2), ("mango", 3)]);
        let mut prev: Option<&str> = None;
        for i in 0..store.len() {
            let (term, _) = store.at(i).unwrap();
            if let Some(p) = prev {
                assert!(p < term);
            }
            prev = Some(term);
        }
    }

    #[test]
    fn prefix_scan_sorted_by_count_desc() {
        let (_dir, store) = build_store(&[("steam", 100), ("steams", 200), ("steem", 150), ("other", 999)]);
        let results = store.prefix_scan("ste", 10);
        let terms: Vec<&str> = results.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, vec!["steams", "steem", "steam"]);
    }

    #[test]
    fn estimate_max_count_uses_probe_words() {
        let (_dir, store) = build_store(&[("the", 99_999), ("banana", 5)]);
        assert_eq!(store.estimate_max_count(), 99_999);
    }

    #[test]
    fn estimate_max_count_falls_back_to_scan() {
        let (_dir, store) = build_store(&[("banana", 5), ("zzyzx", 40)]);
        assert_eq!(store.estimate_max_count(), 40);
    }

    #[test]
    fn duplicate_terms_last_write_wins() {
        let owned = vec![("dup".to_string(), 1u64), ("dup".to_string(), 2u64)];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.bin");
        Store::build(&owned, &path).unwrap();
        let store = Store::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("dup"), 2);
    }
}
