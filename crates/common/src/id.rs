//! ID generation utilities.

use rand::{Rng, distributions::Alphanumeric};
use ulid::Ulid;
use uuid::Uuid;

/// Length of recipe short-link codes.
pub const SHORT_CODE_LEN: usize = 8;

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

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a short alphanumeric code for shareable recipe links.
    ///
    /// Uniqueness is enforced by the database; callers retry on conflict.
    #[must_use]
    pub fn generate_short_code(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SHORT_CODE_LEN)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32); // Simple UUID without hyphens
    }

    #[test]
    fn test_generate_short_code() {
        let id_gen = IdGenerator::new();
        let code = id_gen.generate_short_code();

        assert_eq!(code.len(), SHORT_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
