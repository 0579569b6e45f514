//! Light source identity.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Stable identity of a dynamic light source.
///
/// Identities are allocated from a process-wide counter and never reused, so
/// they can key per-source bookkeeping even when the source itself mutates.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct LightSourceId(pub u32);

impl LightSourceId {
    /// Allocate the next unused identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for LightSourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let a = LightSourceId::next();
        let b = LightSourceId::next();
        assert!(b > a);
        assert_ne!(a, b);
    }
}
