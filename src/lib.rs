//! Low-memory approximate string matching and spelling correction built
//! around the symmetric delete algorithm.
//!
//! The dictionary and delete index are mmap-backed binary files, kept
//! off the heap so large lexicons don't dominate resident memory. See
//! [`SymspellEngine`] for the main entry point.

pub mod autocorrect;
pub mod cache;
pub mod casing;
pub mod compound;
pub mod deletes;
pub mod distance;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod lookup;
pub mod scorer;
pub mod segment;
pub mod store;
pub mod types;

pub use crate::deletes::DeletesIndex;
pub use crate::engine::{EngineConfig, SymspellEngine};
pub use crate::error::{Error, Result};
pub use crate::keyboard::KeyboardLayout;
pub use crate::store::{BigramStore, WordStore};
pub use crate::types::{AutoCorrectConfig, CasingClass, Composition, RankingMode, ScoreWeights, SuggestItem, Verbosity};
