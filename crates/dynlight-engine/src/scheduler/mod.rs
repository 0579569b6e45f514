//! Chunk-section rebuild scheduling.
//!
//! Light sources report which chunk-sections their change affects; a
//! scheduler decides when the renderer actually remeshes them. Two policies
//! exist:
//!
//! - [`SimpleChunkRebuildScheduler`] forwards every request immediately.
//! - [`CullingChunkRebuildScheduler`] deduplicates requests per tick and
//!   defers sections outside the camera frustum until they become visible.

mod culling;
mod simple;
mod status;

use std::sync::Arc;

use dynlight_core::{Aabb, FrustumIntersection, LightSourceId, SchedulerMode, SectionPos};
use tracing::info;

use crate::source::SectionRebuildMap;

pub use culling::CullingChunkRebuildScheduler;
pub use simple::SimpleChunkRebuildScheduler;
pub use status::ChunkRebuildStatus;

/// The renderer side of the lighting engine.
///
/// Called from the simulation thread only.
pub trait LevelRenderer: Send + Sync {
    /// Mark a 16³ chunk-section dirty so it gets remeshed with the current light.
    fn schedule_section_rebuild(&self, section: SectionPos);

    /// Test a world-space box against the current camera frustum.
    fn test_section(&self, bounds: &Aabb) -> FrustumIntersection;
}

/// Policy turning per-source section changes into renderer rebuilds.
pub trait ChunkRebuildScheduler: Send {
    /// Which policy this is.
    fn mode(&self) -> SchedulerMode;

    /// Feed the sections a source changed this tick.
    fn accept(&mut self, source: LightSourceId, chunks: &SectionRebuildMap);

    /// Feed the sections a removed source last lit.
    fn remove(&mut self, source: LightSourceId, chunks: &SectionRebuildMap);

    /// Called before any source is fed for the tick.
    fn start_tick(&mut self) {}

    /// Flush the rebuilds owed this tick to the renderer.
    fn end_tick(&mut self) {}

    /// Forget every pending request.
    fn clear(&mut self) {}

    /// Human readable counters for debug overlays.
    fn debug_lines(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Build the scheduler for a mode.
pub fn create_scheduler(
    mode: SchedulerMode,
    renderer: Arc<dyn LevelRenderer>,
) -> Box<dyn ChunkRebuildScheduler> {
    info!("Using {} chunk rebuild scheduler", mode.name());
    match mode {
        SchedulerMode::Immediate => Box::new(SimpleChunkRebuildScheduler::new(renderer)),
        SchedulerMode::Culling => Box::new(CullingChunkRebuildScheduler::new(renderer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRenderer;

    #[test]
    fn create_scheduler_matches_mode() {
        let renderer = RecordingRenderer::new();
        for mode in [SchedulerMode::Immediate, SchedulerMode::Culling] {
            let scheduler = create_scheduler(mode, renderer.clone());
            assert_eq!(scheduler.mode(), mode);
        }
    }
}
