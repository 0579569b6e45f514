//! Deduplicating, frustum-culled rebuild scheduler.

use std::sync::Arc;

use dynlight_core::{LightSourceId, SchedulerMode, SectionPos};
use hashbrown::HashMap;
use tracing::{debug, trace_span};

use super::{ChunkRebuildScheduler, ChunkRebuildStatus, LevelRenderer};
use crate::source::SectionRebuildMap;

type SectionStatuses = HashMap<LightSourceId, ChunkRebuildStatus>;

/// Collects rebuild requests over a tick and flushes at most one rebuild per
/// section at the end of it.
///
/// Each tracked section keeps the status of every source touching it. A
/// section is only rebuilt once it is inside or intersecting the camera
/// frustum; until then its statuses keep accumulating, so the rebuild it
/// eventually gets reflects the latest state of every source.
pub struct CullingChunkRebuildScheduler {
    renderer: Arc<dyn LevelRenderer>,
    sections: HashMap<SectionPos, SectionStatuses>,
    rebuilds_queued_last_tick: usize,
}

impl CullingChunkRebuildScheduler {
    pub fn new(renderer: Arc<dyn LevelRenderer>) -> Self {
        Self {
            renderer,
            sections: HashMap::new(),
            rebuilds_queued_last_tick: 0,
        }
    }

    /// Status of a source on a section, `None` when untracked.
    #[must_use]
    pub fn status(&self, section: SectionPos, source: LightSourceId) -> Option<ChunkRebuildStatus> {
        self.sections
            .get(&section)
            .and_then(|statuses| statuses.get(&source))
            .copied()
    }

    /// Number of sections with at least one tracked source.
    #[must_use]
    pub fn tracked_sections(&self) -> usize {
        self.sections.len()
    }

    /// Number of sections still owing a rebuild, visible or not.
    #[must_use]
    pub fn pending_sections(&self) -> usize {
        self.sections
            .values()
            .filter(|statuses| statuses.values().any(|s| s.needs_rebuild()))
            .count()
    }

    /// Status a source ends up with when `new` is proposed over `existing`.
    ///
    /// `None` means the entry is dropped.
    fn resolve(
        existing: Option<ChunkRebuildStatus>,
        new: ChunkRebuildStatus,
    ) -> Option<ChunkRebuildStatus> {
        use ChunkRebuildStatus::{RemoveRequested, Requested, RequestedAgain};

        if new == RemoveRequested {
            // Nothing was rendered yet, nothing to erase
            return match existing {
                None | Some(Requested) => None,
                Some(_) => Some(RemoveRequested),
            };
        }

        let owes_render = existing.is_some_and(|s| s.needs_cleanup() || s == RemoveRequested);
        Some(if owes_render { RequestedAgain } else { new })
    }
}

impl ChunkRebuildScheduler for CullingChunkRebuildScheduler {
    fn mode(&self) -> SchedulerMode {
        SchedulerMode::Culling
    }

    fn accept(&mut self, source: LightSourceId, chunks: &SectionRebuildMap) {
        for (&section, &status) in chunks {
            if status == ChunkRebuildStatus::RemoveRequested && !self.sections.contains_key(&section) {
                continue;
            }

            let statuses = self.sections.entry(section).or_default();
            match Self::resolve(statuses.get(&source).copied(), status) {
                Some(resolved) => {
                    statuses.insert(source, resolved);
                }
                None => {
                    statuses.remove(&source);
                }
            }

            if statuses.is_empty() {
                self.sections.remove(&section);
            }
        }
    }

    fn remove(&mut self, source: LightSourceId, chunks: &SectionRebuildMap) {
        for section in chunks.keys() {
            let Some(statuses) = self.sections.get_mut(section) else {
                continue;
            };

            match statuses.get(&source).copied() {
                Some(ChunkRebuildStatus::Requested) => {
                    statuses.remove(&source);
                }
                Some(_) => {
                    statuses.insert(source, ChunkRebuildStatus::RemoveRequested);
                }
                None => {}
            }

            if statuses.is_empty() {
                self.sections.remove(section);
            }
        }
    }

    fn start_tick(&mut self) {
        self.rebuilds_queued_last_tick = 0;
    }

    fn end_tick(&mut self) {
        let _span = trace_span!("culling_end_tick", sections = self.sections.len()).entered();

        let renderer = &self.renderer;
        let mut queued = 0;

        self.sections.retain(|&section, statuses| {
            if !statuses.values().any(|s| s.needs_rebuild()) {
                return true;
            }
            if !renderer.test_section(&section.bounds()).is_visible() {
                return true;
            }

            renderer.schedule_section_rebuild(section);
            queued += 1;

            statuses.retain(|_, status| {
                if *status == ChunkRebuildStatus::RemoveRequested {
                    return false;
                }
                *status = ChunkRebuildStatus::Affected;
                true
            });
            !statuses.is_empty()
        });

        self.rebuilds_queued_last_tick = queued;
        if queued > 0 {
            debug!(queued, tracked = self.sections.len(), "Flushed chunk rebuilds");
        }
    }

    fn clear(&mut self) {
        self.sections.clear();
    }

    fn debug_lines(&self) -> Vec<String> {
        vec![format!(
            "Scheduled Chunk Rebuilds: {} / {}",
            self.rebuilds_queued_last_tick,
            self.pending_sections()
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DynamicLightSource;
    use crate::test_support::{RecordingRenderer, TestEmitter};
    use glam::DVec3;
    use ChunkRebuildStatus::{Affected, RemoveRequested, Requested, RequestedAgain};

    const A: LightSourceId = LightSourceId(1);
    const B: LightSourceId = LightSourceId(2);

    fn origin() -> SectionPos {
        SectionPos::new(0, 0, 0)
    }

    fn chunks(status: ChunkRebuildStatus, sections: &[SectionPos]) -> SectionRebuildMap {
        sections.iter().map(|&s| (s, status)).collect()
    }

    fn tick(scheduler: &mut CullingChunkRebuildScheduler) {
        scheduler.start_tick();
        scheduler.end_tick();
    }

    fn setup() -> (Arc<RecordingRenderer>, CullingChunkRebuildScheduler) {
        let renderer = RecordingRenderer::new();
        let scheduler = CullingChunkRebuildScheduler::new(renderer.clone());
        (renderer, scheduler)
    }

    #[test]
    fn requested_becomes_affected_after_rebuild() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        assert_eq!(scheduler.status(origin(), A), Some(Requested));

        tick(&mut scheduler);
        assert_eq!(renderer.rebuilds(), vec![origin()]);
        assert_eq!(scheduler.status(origin(), A), Some(Affected));

        // Clean sections are not rebuilt again
        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(origin()), 1);
    }

    #[test]
    fn change_over_affected_is_requested_again() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        tick(&mut scheduler);

        scheduler.accept(A, &chunks(Requested, &[origin()]));
        assert_eq!(scheduler.status(origin(), A), Some(RequestedAgain));

        tick(&mut scheduler);
        assert_eq!(scheduler.status(origin(), A), Some(Affected));
        assert_eq!(renderer.rebuild_count(origin()), 2);
    }

    #[test]
    fn remove_request_over_requested_is_dropped() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        scheduler.accept(A, &chunks(RemoveRequested, &[origin()]));

        assert_eq!(scheduler.status(origin(), A), None);
        assert_eq!(scheduler.tracked_sections(), 0);

        tick(&mut scheduler);
        assert!(renderer.rebuilds().is_empty());
    }

    #[test]
    fn remove_request_on_untracked_section_is_skipped() {
        let (_, mut scheduler) = setup();
        scheduler.accept(A, &chunks(RemoveRequested, &[origin()]));
        assert_eq!(scheduler.tracked_sections(), 0);
    }

    #[test]
    fn remove_request_over_affected_is_kept() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        tick(&mut scheduler);

        scheduler.accept(A, &chunks(RemoveRequested, &[origin()]));
        assert_eq!(scheduler.status(origin(), A), Some(RemoveRequested));

        // One more pass erases the light, then the section is forgotten
        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(origin()), 2);
        assert_eq!(scheduler.tracked_sections(), 0);
    }

    #[test]
    fn request_over_pending_removal_keeps_owed_render() {
        let (_, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        tick(&mut scheduler);
        scheduler.accept(A, &chunks(RemoveRequested, &[origin()]));

        scheduler.accept(A, &chunks(Requested, &[origin()]));
        assert_eq!(scheduler.status(origin(), A), Some(RequestedAgain));
    }

    #[test]
    fn removing_never_rebuilt_source_leaves_nothing() {
        let (renderer, mut scheduler) = setup();
        let sections = [origin(), SectionPos::new(-1, 0, 0)];
        scheduler.accept(A, &chunks(Requested, &sections));
        scheduler.remove(A, &chunks(Requested, &sections));

        assert_eq!(scheduler.tracked_sections(), 0);
        tick(&mut scheduler);
        assert!(renderer.rebuilds().is_empty());
    }

    #[test]
    fn removing_rendered_source_rebuilds_once_more() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        tick(&mut scheduler);

        scheduler.remove(A, &chunks(Requested, &[origin()]));
        assert_eq!(scheduler.status(origin(), A), Some(RemoveRequested));

        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(origin()), 2);
        assert_eq!(scheduler.status(origin(), A), None);
    }

    #[test]
    fn overlapping_sources_rebuild_once() {
        let (renderer, mut scheduler) = setup();
        let sources = [A, B, LightSourceId(3)];
        scheduler.start_tick();
        for source in sources {
            scheduler.accept(source, &chunks(Requested, &[origin()]));
        }
        scheduler.end_tick();

        assert_eq!(renderer.rebuild_count(origin()), 1);
        assert_eq!(scheduler.debug_lines(), vec!["Scheduled Chunk Rebuilds: 1 / 0".to_owned()]);
        for source in sources {
            assert_eq!(scheduler.status(origin(), source), Some(Affected));
        }
    }

    #[test]
    fn sections_outside_frustum_are_deferred() {
        let (renderer, mut scheduler) = setup();
        let hidden = SectionPos::new(5, 0, 0);
        renderer.hide(hidden);

        scheduler.accept(A, &chunks(Requested, &[hidden, origin()]));
        tick(&mut scheduler);
        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(hidden), 0);
        assert_eq!(renderer.rebuild_count(origin()), 1);
        assert_eq!(scheduler.status(hidden, A), Some(Requested));

        // Another source lights it while it is still out of view
        scheduler.accept(B, &chunks(Requested, &[hidden]));
        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(hidden), 0);

        renderer.show(hidden);
        tick(&mut scheduler);
        assert_eq!(renderer.rebuild_count(hidden), 1);
        assert_eq!(scheduler.status(hidden, A), Some(Affected));
        assert_eq!(scheduler.status(hidden, B), Some(Affected));
    }

    #[test]
    fn travelling_light_leaves_no_sections_behind() {
        let (renderer, mut scheduler) = setup();
        let emitter = TestEmitter::new(DVec3::ZERO, 12);
        let mut source = DynamicLightSource::point(emitter.clone());
        let id = source.id();

        for step in 0..50_i32 {
            emitter.set_position(DVec3::new(f64::from(step) * 32.0, 0.0, 0.0));
            scheduler.start_tick();
            scheduler.accept(id, &source.chunks_to_rebuild(false));
            scheduler.end_tick();
        }
        // Only the sections around the current position stay tracked
        assert_eq!(scheduler.tracked_sections(), 8);
        assert_eq!(scheduler.status(origin(), id), None);

        source.reset_if_lit();
        scheduler.remove(id, &source.chunks_to_rebuild(true));
        for _ in 0..3 {
            tick(&mut scheduler);
        }
        assert_eq!(scheduler.tracked_sections(), 0);
        assert!(renderer.rebuild_count(origin()) >= 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let (renderer, mut scheduler) = setup();
        scheduler.accept(A, &chunks(Requested, &[origin()]));
        scheduler.clear();
        tick(&mut scheduler);
        assert!(renderer.rebuilds().is_empty());
        assert_eq!(scheduler.tracked_sections(), 0);
    }

    #[test]
    fn debug_lines_report_counters() {
        let (renderer, mut scheduler) = setup();
        renderer.hide(SectionPos::new(1, 0, 0));
        scheduler.accept(A, &chunks(Requested, &[origin(), SectionPos::new(1, 0, 0)]));
        tick(&mut scheduler);

        assert_eq!(
            scheduler.debug_lines(),
            vec!["Scheduled Chunk Rebuilds: 1 / 1".to_owned()]
        );
    }
}
