use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;

/// Inclusive bounds of the 5-digit id space.
pub const ID_MIN: u32 = 10_000;
pub const ID_MAX: u32 = 99_999;

const ID_SPACE: usize = (ID_MAX - ID_MIN + 1) as usize;

/// Rejection sampling is cheap while the space is sparse; the cap only
/// matters when the catalog is nearly full.
const MAX_ATTEMPTS: usize = ID_SPACE * 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("5-digit id space exhausted ({0} ids allocated)")]
    SpaceExhausted(usize),
}

/// Allocates collision-free 5-digit numeric ids against the set of ids
/// already present in the catalog.
///
/// The allocator owns its id set and records every returned id before
/// handing it out, so consecutive calls can never produce the same value.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    existing: HashSet<String>,
}

impl IdAllocator {
    pub fn new(existing: HashSet<String>) -> Self {
        Self { existing }
    }

    /// Seed the allocator from the ids of an existing catalog.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            existing: ids.into_iter().collect(),
        }
    }

    /// Draw a fresh id absent from the existing set.
    ///
    /// Fails fast with `IdError::SpaceExhausted` when the space is full or
    /// the attempt cap is hit, rather than looping unboundedly.
    pub fn allocate(&mut self) -> Result<String, IdError> {
        if self.existing.len() >= ID_SPACE {
            return Err(IdError::SpaceExhausted(self.existing.len()));
        }

        let mut rng = rand::rng();
        for _ in 0..MAX_ATTEMPTS {
            let candidate = rng.random_range(ID_MIN..=ID_MAX).to_string();
            if !self.existing.contains(&candidate) {
                self.existing.insert(candidate.clone());
                return Ok(candidate);
            }
        }

        Err(IdError::SpaceExhausted(self.existing.len()))
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}
