//! Immediate rebuild scheduler.

use std::sync::Arc;

use dynlight_core::{LightSourceId, SchedulerMode};

use super::{ChunkRebuildScheduler, LevelRenderer};
use crate::source::SectionRebuildMap;

/// Rebuilds every requested section right away.
///
/// Sections lit by several sources may be rebuilt several times per tick.
pub struct SimpleChunkRebuildScheduler {
    renderer: Arc<dyn LevelRenderer>,
    rebuilds_requested_last_tick: usize,
}

impl SimpleChunkRebuildScheduler {
    pub fn new(renderer: Arc<dyn LevelRenderer>) -> Self {
        Self {
            renderer,
            rebuilds_requested_last_tick: 0,
        }
    }

    fn schedule(&mut self, chunks: &SectionRebuildMap) {
        self.rebuilds_requested_last_tick += chunks.len();
        for &section in chunks.keys() {
            self.renderer.schedule_section_rebuild(section);
        }
    }
}

impl ChunkRebuildScheduler for SimpleChunkRebuildScheduler {
    fn mode(&self) -> SchedulerMode {
        SchedulerMode::Immediate
    }

    fn accept(&mut self, _source: LightSourceId, chunks: &SectionRebuildMap) {
        self.schedule(chunks);
    }

    fn remove(&mut self, _source: LightSourceId, chunks: &SectionRebuildMap) {
        self.schedule(chunks);
    }

    fn start_tick(&mut self) {
        self.rebuilds_requested_last_tick = 0;
    }

    fn debug_lines(&self) -> Vec<String> {
        vec![format!(
            "Scheduled Chunk Rebuilds (Immediate): {}",
            self.rebuilds_requested_last_tick
        )]
    }
}
