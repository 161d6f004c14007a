//! ID generation utilities.

use std::sync::{Mutex, PoisonError};

use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Shared by every [`IdGenerator`] so IDs made within one millisecond still
/// increase.
static MONOTONIC: Mutex<Generator> = Mutex::new(Generator::new());

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// IDs sort in creation order, so ordering rows by ID is ordering them
    /// by insertion. Within one millisecond the random part is incremented.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut generator = MONOTONIC.lock().unwrap_or_else(PoisonError::into_inner);
        // Only fails once 2^80 IDs were made in the same millisecond
        let ulid = generator.generate().unwrap_or_else(|_| Ulid::new());
        ulid.to_string().to_lowercase()
    }

    /// Generate an opaque bearer token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // No time component in tokens
        Uuid::new_v4().simple().to_string()
    }
}
