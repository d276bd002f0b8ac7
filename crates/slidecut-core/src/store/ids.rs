//! Crop identity and id generation.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Stable identity of a crop square.
///
/// Ids are issued monotonically by an [`IdSource`] and never reused within
/// one store. Ordering follows issue order, which makes it a stable key for
/// deterministic snapping. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CropId(u64);

impl CropId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CropId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CropId)
    }
}

impl Serialize for CropId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Supplier of fresh crop ids.
pub trait IdSource {
    /// Return an id that has never been returned before.
    fn next_id(&mut self) -> CropId;
}

/// Monotonic counter starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl SequentialIds {
    /// Start counting from `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> CropId {
        let id = CropId(self.next);
        self.next += 1;
        id
    }
}
