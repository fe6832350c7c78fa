//! Deletes index (C2) and its offline delete generator (C5): a sorted
//! (delete-key -> word ordinals) multimap, mmap-backed for lookup,
//! precomputed once at build time (spec.md §4.2, §4.3, §6.1).

use crate::error::Error;
use crate::store::WordStore;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::{Mmap, MmapOptions};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER_LEN: usize = 4;
const OFFSET_LEN: usize = 4;

/// All distinct strings reachable from `prefix` via 0..=`max_edit_distance`
/// single-character deletions (spec.md §4.3 step 2), including `prefix`
/// itself.
pub fn delete_closure(prefix: &str, max_edit_distance: u8) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(prefix.to_string());
    let mut frontier = vec![prefix.to_string()];
    for _ in 0..max_edit_distance {
        let mut next_frontier = Vec::new();
        for s in &frontier {
            let chars: Vec<char> = s.chars().collect();
            for i in 0..chars.len() {
                let mut deleted: Vec<char> = chars.clone();
                deleted.remove(i);
                let deleted: String = deleted.into_iter().collect();
                if seen.insert(deleted.clone()) {
                    next_frontier.push(deleted);
                }
            }
        }
        frontier = next_frontier;
    }
    seen
}

/// Mmap-backed reader for `deletes.bin`.
pub struct DeletesIndex {
    mmap: Mmap,
    num_entries: u32,
    path: PathBuf,
}

impl DeletesIndex {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
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
        Ok(Self { mmap, num_entries, path })
    }

    /// Build `deletes.bin` for every word in `store`, using the store's own
    /// ordinals so `deletes.get(key)` resolves through `store.at(index)`
    /// consistently (spec.md §4.13).
    pub fn build<P: AsRef<Path>>(store: &WordStore, prefix_length: u32, max_edit_distance: u32, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let mut multimap: HashMap<String, Vec<u32>> = HashMap::new();

        for i in 0..store.len() {
            let Some((term, _count)) = store.at(i) else {
                continue;
            };
            let char_count = term.chars().count();
            let prefix: String = if char_count <= prefix_length as usize {
                term.to_string()
            } else {
                term.chars().take(prefix_length as usize).collect()
            };
            for key in delete_closure(&prefix, max_edit_distance as u8) {
                multimap.entry(key).or_default().push(i as u32);
            }
            if char_count <= max_edit_distance as usize {
                multimap.entry(String::new()).or_default().push(i as u32);
            }
        }

        let mut entries: Vec<(String, Vec<u32>)> = multimap.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut records = Vec::with_capacity(entries.len());
        for (key, indices) in &entries {
            if key.len() > 255 {
                return Err(Error::InvalidConfig {
                    reason: format!("delete key '{key}' exceeds 255 bytes"),
                });
            }
            if indices.len() > u16::MAX as usize {
                return Err(Error::InvalidConfig {
                    reason: format!("delete key '{key}' has more than {} suggestions", u16::MAX),
                });
            }
            let mut record = Vec::with_capacity(1 + key.len() + 2 + indices.len() * 4);
            record.push(key.len() as u8);
            record.extend_from_slice(key.as_bytes());
            record
                .write_u16::<LittleEndian>(indices.len() as u16)
                .expect("writing to a Vec cannot fail");
            for idx in indices {
                record
                    .write_u32::<LittleEndian>(*idx)
                    .expect("writing to a Vec cannot fail");
            }
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
        tracing::info!(entries = records.len(), path = %path.display(), "wrote deletes index");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.num_entries as usize
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    fn record_at(&self, index: usize) -> Option<(&str, &[u8])> {
        if index >= self.num_entries as usize {
            return None;
        }
        let offset_pos = HEADER_LEN + index * OFFSET_LEN;
        let offset = LittleEndian::read_u32(self.mmap.get(offset_pos..offset_pos + 4)?) as usize;
        let key_len = *self.mmap.get(offset)? as usize;
        let key_start = offset + 1;
        let key_bytes = self.mmap.get(key_start..key_start + key_len)?;
        let key = std::str::from_utf8(key_bytes).ok()?;
        let rest_start = key_start + key_len;
        Some((key, &self.mmap[rest_start..]))
    }

    fn key_at(&self, index: usize) -> Option<&str> {
        self.record_at(index).map(|(key, _)| key)
    }

    /// All word ordinals associated with `key`, via binary search.
    /// Returns an empty vector for any malformed or out-of-range record
    /// instead of propagating an error (spec.md §4.2, §7).
    pub fn get(&self, key: &str) -> Vec<u32> {
        let mut lo = 0usize;
        let mut hi = self.num_entries as usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.key_at(mid) {
                Some(candidate) => match candidate.cmp(key) {
                    std::cmp::Ordering::Equal => return self.decode_indices(mid),
                    std::cmp::Ordering::Less => lo = mid + 1,
                    std::cmp::Ordering::Greater => hi = mid,
                },
                None => return Vec::new(),
            }
        }
        Vec::new()
    }

    fn decode_indices(&self, index: usize) -> Vec<u32> {
        let Some((key, rest)) = self.record_at(index) else {
            tracing::warn!(index, path = %self.path.display(), "malformed deletes record, degrading to empty");
            return Vec::new();
        };
        let Some(count_bytes) = rest.get(0..2) else {
            tracing::warn!(index, key, path = %self.path.display(), "truncated deletes record header, degrading to empty");
            return Vec::new();
        };
        let count = LittleEndian::read_u16(count_bytes) as usize;
        let mut result = Vec::with_capacity(count);
        for i in 0..count {
            let start = 2 + i * 4;
            match rest.get(start..start + 4) {
                Some(bytes) => result.push(LittleEndian::read_u32(bytes)),
                None => {
                    tracing::warn!(index, key, path = %self.path.display(), "truncated deletes record body, returning partial list");
                    break;
                }
            }
        }
        result
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_includes_prefix_itself() {
        let closure = delete_closure("help", 0);
        assert_eq!(closure.len(), 1);
        assert!(closure.contains("help"));
    }

    #[test]
    fn closure_one_delete() {
        let closure = delete_closure("abc", 1);
        assert!(closure.contains("abc"));
        assert!(closure.contains("bc"));
        assert!(closure.contains("ac"));
        assert!(closure.contains("ab"));
        assert_eq!(closure.len(), 4);
    }

    fn build_pair(words: &[(&str, u64)], prefix_length: u32, max_edit_distance: u32) -> (tempfile::TempDir, WordStore, DeletesIndex) {
        let dir = tempfile::tempdir().unwrap();
        let words_path = dir.path().join("words.bin");
        let deletes_path = dir.path().join("deletes.bin");
        let owned: Vec<(String, u64)> = words.iter().map(|(t, c)| (t.to_string(), *c)).collect();
        WordStore::build(&owned, &words_path).unwrap();
        let store = WordStore::open(&words_path).unwrap();
        DeletesIndex::build(&store, prefix_length, max_edit_distance, &deletes_path).unwrap();
        let deletes = DeletesIndex::open(&deletes_path).unwrap();
        (dir, store, deletes)
    }

    #[test]
    fn delete_closure_invariant_holds_for_every_word() {
        let (_dir, store, deletes) = build_pair(&[("hello", 1000), ("help", 800), ("held", 700)], 7, 2);
        for i in 0..store.len() {
            let (term, _) = store.at(i).unwrap();
            let char_count = term.chars().count();
            let prefix: String = if char_count <= 7 { term.to_string() } else { term.chars().take(7).collect() };
            for key in delete_closure(&prefix, 2) {
                let indices = deletes.get(&key);
                assert!(indices.contains(&(i as u32)), "key {key} should list word {term}");
            }
        }
    }

    #[test]
    fn short_words_get_empty_key() {
        let (_dir, store, deletes) = build_pair(&[("a", 1), ("longerword", 2)], 7, 2);
        let empty_key_indices = deletes.get("");
        let (_, count_a) = store.at(store.index_of("a").unwrap()).unwrap();
        assert_eq!(count_a, 1);
        assert!(empty_key_indices.contains(&(store.index_of("a").unwrap() as u32)));
        assert!(!empty_key_indices.contains(&(store.index_of("longerword").unwrap() as u32)));
    }
}
