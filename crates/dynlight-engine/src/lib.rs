//! Dynamic lighting engine.
//!
//! Tracks moving light sources, answers per-block light level queries through
//! a spatial hash rebuilt every tick, and schedules the chunk-section rebuilds
//! needed to show light changes on screen.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dynlight_core::{Aabb, FrustumIntersection, LightingConfig, SectionPos};
//! use dynlight_engine::{DynamicLights, LevelRenderer};
//!
//! struct Renderer;
//!
//! impl LevelRenderer for Renderer {
//!     fn schedule_section_rebuild(&self, _section: SectionPos) {}
//!
//!     fn test_section(&self, _bounds: &Aabb) -> FrustumIntersection {
//!         FrustumIntersection::Inside
//!     }
//! }
//!
//! let mut lights = DynamicLights::new(LightingConfig::default(), Arc::new(Renderer))?;
//! lights.on_start_tick();
//! lights.on_end_tick();
//! # Ok::<(), dynlight_core::Error>(())
//! ```

pub mod engine;
pub mod hasher;
pub mod lightmap;
pub mod lights;
pub mod lookup;
pub mod scheduler;
pub mod source;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use engine::DynamicLightingEngine;
pub use hasher::CellHasher;
pub use lightmap::lightmap_with_dynamic_light;
pub use lights::{DynamicLights, LightLevelReader, LightingDiagnostics};
pub use lookup::{LightPayload, SpatialLookupEntry};
pub use scheduler::{
    create_scheduler, ChunkRebuildScheduler, ChunkRebuildStatus, CullingChunkRebuildScheduler,
    LevelRenderer, SimpleChunkRebuildScheduler,
};
pub use source::{
    DynamicLightSource, LightBehavior, PointLightEmitter, PointLightSource, SectionRebuildMap,
    VolumeLightSource,
};
pub use tracker::LightSourceTracker;
