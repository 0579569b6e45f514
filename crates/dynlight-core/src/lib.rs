//! Core types for the dynamic lighting engine.
//!
//! This crate provides the foundational types shared by the engine and its
//! collaborators:
//! - Block and chunk-section coordinates
//! - Integer light volumes, float AABBs and frustum tests
//! - Light source identities
//! - Lighting configuration and error types

pub mod config;
pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use config::{DynamicLightsMode, LightingConfig, SchedulerMode, TickMode};
pub use coords::{BlockPos, SectionPos};
pub use error::{Error, Result};
pub use math::{Aabb, BlockBox, Frustum, FrustumIntersection};
pub use types::LightSourceId;

/// Engine-wide constants
pub mod constants {
    /// Size of a chunk-section in blocks per axis
    pub const SECTION_SIZE: i32 = 16;
    /// Bits needed to represent a block position within a section (4 bits for 0-15)
    pub const SECTION_BITS: u32 = 4;
    /// Offset within a section at which a light is considered to lean towards the next section
    pub const SECTION_MIDLINE: i32 = SECTION_SIZE / 2;
    /// Highest luminance a light source can emit
    pub const MAX_LUMINANCE: u8 = 15;
    /// Distance in blocks past which a dynamic light contributes nothing
    pub const MAX_RADIUS: f64 = 7.75;
    /// Squared [`MAX_RADIUS`]
    pub const MAX_RADIUS_SQUARED: f64 = MAX_RADIUS * MAX_RADIUS;
    /// Default spatial hash cell size in blocks
    pub const DEFAULT_CELL_SIZE: u32 = 8;
}
