//! Per-section rebuild status.

/// Where one light source stands with one chunk-section.
///
/// `Requested → Affected → RequestedAgain → Affected`, and from any state
/// `RemoveRequested` until the section is rebuilt one last time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkRebuildStatus {
    /// The section must be rebuilt, nothing was rendered for this source yet.
    Requested,
    /// The latest effect of the source on the section has been rendered.
    Affected,
    /// A rendered effect changed again and must be rendered once more.
    RequestedAgain,
    /// The source is gone, the section must be rebuilt to erase its light.
    RemoveRequested,
}

impl ChunkRebuildStatus {
    /// Whether the section still owes a rebuild for this source.
    #[inline]
    #[must_use]
    pub const fn needs_rebuild(self) -> bool {
        !matches!(self, Self::Affected)
    }

    /// Whether an effect of this source was already rendered, so dropping
    /// the status would leave stale light on screen.
    #[inline]
    #[must_use]
    pub const fn needs_cleanup(self) -> bool {
        matches!(self, Self::Affected | Self::RequestedAgain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_affected_is_clean() {
        assert!(ChunkRebuildStatus::Requested.needs_rebuild());
        assert!(ChunkRebuildStatus::RequestedAgain.needs_rebuild());
        assert!(ChunkRebuildStatus::RemoveRequested.needs_rebuild());
        assert!(!ChunkRebuildStatus::Affected.needs_rebuild());
    }

    #[test]
    fn rendered_states_need_cleanup() {
        assert!(ChunkRebuildStatus::Affected.needs_cleanup());
        assert!(ChunkRebuildStatus::RequestedAgain.needs_cleanup());
        assert!(!ChunkRebuildStatus::Requested.needs_cleanup());
        assert!(!ChunkRebuildStatus::RemoveRequested.needs_cleanup());
    }
}
