//! Edge toggle outcomes.
//!
//! An edge (favorite, cart entry, subscription) is either absent or present.
//! Repositories report whether an add or remove changed anything; the
//! configured [`TogglePolicy`] decides whether a no-op is an error.

use foodgram_common::{AppError, AppResult, TogglePolicy};

/// Settle an add. `created` is false when the edge already existed.
pub fn settle_add(policy: TogglePolicy, created: bool, what: &str) -> AppResult<()> {
    match (created, policy) {
        (true, _) | (false, TogglePolicy::Idempotent) => Ok(()),
        (false, TogglePolicy::Strict) => Err(AppError::Conflict(format!("{what} already exists"))),
    }
}

/// Settle a remove. `removed` is false when the edge was absent.
pub fn settle_remove(policy: TogglePolicy, removed: bool, what: &str) -> AppResult<()> {
    match (removed, policy) {
        (true, _) | (false, TogglePolicy::Idempotent) => Ok(()),
        (false, TogglePolicy::Strict) => Err(AppError::NotFound(format!("{what} does not exist"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_add_conflicts() {
        assert!(settle_add(TogglePolicy::Strict, true, "Favorite").is_ok());
        assert!(matches!(
            settle_add(TogglePolicy::Strict, false, "Favorite"),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_strict_remove_not_found() {
        assert!(settle_remove(TogglePolicy::Strict, true, "Favorite").is_ok());
        assert!(matches!(
            settle_remove(TogglePolicy::Strict, false, "Favorite"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_idempotent_never_fails() {
        for changed in [true, false] {
            assert!(settle_add(TogglePolicy::Idempotent, changed, "Cart entry").is_ok());
            assert!(settle_remove(TogglePolicy::Idempotent, changed, "Cart entry").is_ok());
        }
    }
}
