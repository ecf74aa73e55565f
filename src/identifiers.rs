//! Type-safe identifiers.
//!
//! Element handles are keyed by a UUID minted on lookup, so a handle never
//! exposes the driver's own reference format.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ElementId
// ============================================================================

/// Identifier of a located element handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Mints a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(ElementId::generate(), ElementId::generate());
    }

    #[test]
    fn test_display_matches_uuid() {
        let id = ElementId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }
}
