//! Tick orchestration of the dynamic lighting subsystem.

use std::fmt;
use std::sync::Arc;

use dynlight_core::{BlockPos, DynamicLightsMode, LightSourceId, LightingConfig, Result, SchedulerMode};
use parking_lot::RwLock;
use tracing::{debug, info, trace_span};

use crate::engine::DynamicLightingEngine;
use crate::lightmap::lightmap_with_dynamic_light;
use crate::scheduler::{create_scheduler, ChunkRebuildScheduler, LevelRenderer};
use crate::source::{DynamicLightSource, LightBehavior, PointLightEmitter, SectionRebuildMap};
use crate::tracker::LightSourceTracker;

/// State shared with off-thread light queries.
#[derive(Debug)]
struct LightingState {
    tracker: LightSourceTracker,
    engine: DynamicLightingEngine,
}

/// Owner of the tracked light sources, the spatial grid and the rebuild scheduler.
///
/// The simulation thread calls [`on_start_tick`](Self::on_start_tick) and
/// [`on_end_tick`](Self::on_end_tick) once per tick. Light queries may come
/// from any thread through a [`LightLevelReader`].
pub struct DynamicLights {
    config: LightingConfig,
    state: Arc<RwLock<LightingState>>,
    scheduler: Box<dyn ChunkRebuildScheduler>,
    renderer: Arc<dyn LevelRenderer>,
    tick: u64,
    last_update_tick: Option<u64>,
    should_tick: bool,
    force_refresh: bool,
    last_update_count: usize,
}

impl DynamicLights {
    /// Create the lighting subsystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: LightingConfig, renderer: Arc<dyn LevelRenderer>) -> Result<Self> {
        config.validate()?;

        let scheduler = create_scheduler(config.scheduler, Arc::clone(&renderer));
        let state = LightingState {
            tracker: LightSourceTracker::new(),
            engine: DynamicLightingEngine::new(config.cell_size),
        };

        info!(
            "Dynamic lights initialized: mode={}, tick_mode={:?}, cell_size={}",
            config.mode.name(),
            config.effective_tick_mode(),
            config.cell_size
        );

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(state)),
            scheduler,
            renderer,
            tick: 0,
            last_update_tick: None,
            should_tick: false,
            force_refresh: false,
            last_update_count: 0,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &LightingConfig {
        &self.config
    }

    /// Whether light sources are re-evaluated during the current tick.
    #[must_use]
    pub const fn should_tick(&self) -> bool {
        self.should_tick
    }

    /// Sources that reported changed sections during the last tick.
    #[must_use]
    pub const fn last_update_count(&self) -> usize {
        self.last_update_count
    }

    /// Start a simulation tick, deciding whether sources are re-evaluated.
    pub fn on_start_tick(&mut self) {
        self.tick += 1;

        let tick_mode = self.config.effective_tick_mode();
        let mut should_tick = self.config.mode.is_enabled();
        if should_tick && tick_mode.has_delay() {
            match self.last_update_tick {
                Some(last) if self.tick < last + u64::from(tick_mode.delay()) => should_tick = false,
                _ => self.last_update_tick = Some(self.tick),
            }
        }

        self.should_tick = should_tick || self.force_refresh;
        self.scheduler.start_tick();
    }

    /// End a simulation tick: rebuild the grid, feed source changes to the
    /// scheduler and flush the rebuilds it decides on.
    pub fn on_end_tick(&mut self) {
        let _span = trace_span!("dynamic_lights_end_tick", tick = self.tick).entered();

        let (cleared, changes) = {
            let mut guard = self.state.write();
            let state = &mut *guard;

            if self.config.mode.is_enabled() {
                state.engine.compute_spatial_lookup(state.tracker.iter());
            }

            let cleared: Vec<(LightSourceId, SectionRebuildMap)> = state
                .tracker
                .take_pending_clear()
                .into_iter()
                .map(|mut source| (source.id(), source.chunks_to_rebuild(true)))
                .collect();

            let changes = if self.should_tick {
                // Behaviors are polled for removal; their last rebuild happens next tick
                let removed: Vec<LightSourceId> = state
                    .tracker
                    .iter()
                    .filter(|source| source.is_removed())
                    .map(DynamicLightSource::id)
                    .collect();
                for id in removed {
                    state.tracker.remove(id);
                }

                state.tracker.collect_changes(self.force_refresh)
            } else {
                Vec::new()
            };

            (cleared, changes)
        };

        for (id, chunks) in &cleared {
            self.scheduler.remove(*id, chunks);
        }
        for (id, chunks) in &changes {
            self.scheduler.accept(*id, chunks);
        }
        self.scheduler.end_tick();

        self.last_update_count = changes.len();
        self.force_refresh = false;

        if !cleared.is_empty() || !changes.is_empty() {
            debug!(
                tick = self.tick,
                updated = changes.len(),
                cleared = cleared.len(),
                "Dynamic light sources updated"
            );
        }
    }

    /// Track a light source. Returns `false` if it already was tracked.
    pub fn add_light_source(&self, source: DynamicLightSource) -> bool {
        self.state.write().tracker.add(source)
    }

    /// Track a point light, returning its identity.
    pub fn add_point_light(&self, emitter: Arc<dyn PointLightEmitter>) -> LightSourceId {
        let source = DynamicLightSource::point(emitter);
        let id = source.id();
        self.add_light_source(source);
        id
    }

    /// Track a behavior-driven volume light, returning its identity.
    pub fn add_volume_light(&self, behavior: Arc<dyn LightBehavior>) -> LightSourceId {
        let source = DynamicLightSource::volume(behavior);
        let id = source.id();
        self.add_light_source(source);
        id
    }

    /// Stop tracking a light source. Its sections get one last rebuild next tick.
    pub fn remove_light_source(&self, id: LightSourceId) -> bool {
        self.state.write().tracker.remove(id)
    }

    /// Stop tracking every light source matching the predicate.
    pub fn remove_light_sources(&self, predicate: impl FnMut(&DynamicLightSource) -> bool) -> usize {
        self.state.write().tracker.remove_where(predicate)
    }

    #[must_use]
    pub fn contains_light_source(&self, id: LightSourceId) -> bool {
        self.state.read().tracker.contains(id)
    }

    #[must_use]
    pub fn light_source_count(&self) -> usize {
        self.state.read().tracker.len()
    }

    /// Drop every light source when the world changes.
    pub fn on_change_world(&self) {
        let mut state = self.state.write();
        let cleared = state.tracker.clear_all();
        state.engine.reset_size();
        info!("World changed, cleared {cleared} dynamic light sources");
    }

    /// Replace the rebuild scheduler, re-emitting every source on the next tick.
    pub fn set_scheduler_mode(&mut self, mode: SchedulerMode) {
        if self.scheduler.mode() == mode {
            return;
        }
        self.scheduler = create_scheduler(mode, Arc::clone(&self.renderer));
        self.config.scheduler = mode;
        self.force_refresh = true;
    }

    /// Make the next tick recompute every source as if it had just been added.
    pub fn request_refresh(&mut self) {
        self.force_refresh = true;
    }

    /// Dynamic light level at a block.
    #[must_use]
    pub fn dynamic_light_level(&self, pos: BlockPos) -> f64 {
        self.state.read().engine.dynamic_light_level(pos)
    }

    /// Merge the dynamic light at a block into a packed lightmap coordinate.
    #[must_use]
    pub fn lightmap(&self, pos: BlockPos, lightmap: u32) -> u32 {
        lightmap_with_dynamic_light(self.dynamic_light_level(pos), lightmap)
    }

    /// Cloneable handle for light queries from other threads.
    #[must_use]
    pub fn reader(&self) -> LightLevelReader {
        LightLevelReader {
            state: Arc::clone(&self.state),
        }
    }

    /// Snapshot of the subsystem for crash reports.
    #[must_use]
    pub fn diagnostics(&self) -> LightingDiagnostics {
        let state = self.state.read();
        LightingDiagnostics {
            mode: self.config.mode,
            scheduler: self.scheduler.mode(),
            light_sources: state.tracker.len(),
            spatial_entries: state.engine.entry_count(),
            spatial_capacity: state.engine.capacity(),
            sources_updated_last_tick: self.last_update_count,
        }
    }

    /// Lines for a debug overlay.
    #[must_use]
    pub fn debug_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Dynamic Light Sources: {} (U: {})",
            self.light_source_count(),
            self.last_update_count
        )];
        lines.extend(self.scheduler.debug_lines());
        lines
    }
}

/// Read-only handle on the spatial grid.
#[derive(Clone)]
pub struct LightLevelReader {
    state: Arc<RwLock<LightingState>>,
}

impl LightLevelReader {
    /// Dynamic light level at a block.
    #[must_use]
    pub fn dynamic_light_level(&self, pos: BlockPos) -> f64 {
        self.state.read().engine.dynamic_light_level(pos)
    }

    /// Merge the dynamic light at a block into a packed lightmap coordinate.
    #[must_use]
    pub fn lightmap(&self, pos: BlockPos, lightmap: u32) -> u32 {
        lightmap_with_dynamic_light(self.dynamic_light_level(pos), lightmap)
    }
}

/// Crash report details of the lighting subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightingDiagnostics {
    pub mode: DynamicLightsMode,
    pub scheduler: SchedulerMode,
    pub light_sources: usize,
    pub spatial_entries: usize,
    pub spatial_capacity: usize,
    pub sources_updated_last_tick: usize,
}

impl fmt::Display for LightingDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- Dynamic Lighting --")?;
        writeln!(f, "Mode: {}", self.mode.name())?;
        writeln!(f, "Scheduler: {}", self.scheduler.name())?;
        writeln!(f, "Dynamic Light Sources: {}", self.light_sources)?;
        writeln!(
            f,
            "Spatial Hash Occupancy: {} / {}",
            self.spatial_entries, self.spatial_capacity
        )?;
        write!(f, "Sources Updated Last Tick: {}", self.sources_updated_last_tick)
    }
}
