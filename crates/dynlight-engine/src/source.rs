//! Dynamic light sources.
//!
//! A light source is either a point emitted by something with a continuous
//! position (an entity or a particle), or a volume described by a
//! [`LightBehavior`] (a beacon beam, for instance). The engine only talks to
//! the owners of those lights through the two capability traits below.

use std::sync::Arc;

use dynlight_core::constants::SECTION_MIDLINE;
use dynlight_core::{BlockBox, BlockPos, LightSourceId, SectionPos};
use glam::{DVec3, IVec3};
use hashbrown::HashMap;

use crate::hasher::CellHasher;
use crate::lookup::{CellRange, LightPayload, SpatialEntries};
use crate::scheduler::ChunkRebuildStatus;

/// Chunk-sections a source wants rebuilt, with the status each one is proposed at.
pub type SectionRebuildMap = HashMap<SectionPos, ChunkRebuildStatus>;

/// Something with a position that emits light (an entity, a particle).
///
/// Implementations are shared with the simulation that moves them, so every
/// method takes `&self`.
pub trait PointLightEmitter: Send + Sync {
    /// Current position of the light.
    fn position(&self) -> DVec3;

    /// Current luminance in `[0, 15]`.
    fn luminance(&self) -> u8;

    /// Whether this emitter may light up its surroundings at all.
    ///
    /// Invisible entities, for instance, never do.
    fn can_light_up(&self) -> bool {
        true
    }

    /// Turn the light off, called when the source stops being tracked.
    fn reset_dynamic_light(&self);
}

/// Volumetric light whose footprint is driven by game logic.
pub trait LightBehavior: Send + Sync {
    /// Luminance of every block inside the bounding box.
    fn luminance(&self) -> u8;

    /// Current footprint.
    fn bounding_box(&self) -> BlockBox;

    /// Whether the light changed since the last time this was asked.
    fn has_changed(&self) -> bool;

    /// Whether the owner is gone and the light must be untracked.
    fn is_removed(&self) -> bool {
        false
    }
}

/// Point light backed by a [`PointLightEmitter`].
pub struct PointLightSource {
    id: LightSourceId,
    emitter: Arc<dyn PointLightEmitter>,
    /// Block position and luminance of the last computed rebuild set.
    last: Option<(BlockPos, u8)>,
}

impl PointLightSource {
    /// Wrap an emitter, allocating a fresh identity.
    pub fn new(emitter: Arc<dyn PointLightEmitter>) -> Self {
        Self {
            id: LightSourceId::next(),
            emitter,
            last: None,
        }
    }

    fn chunks_to_rebuild(&mut self, forced: bool) -> SectionRebuildMap {
        let block = BlockPos::containing(self.emitter.position());
        let current = (block, self.emitter.luminance());

        if !forced && self.last == Some(current) {
            return SectionRebuildMap::new();
        }

        // Sections only the previous position lit are released, the rest requested
        let mut chunks = SectionRebuildMap::with_capacity(16);
        if let Some((previous, _)) = self.last {
            gather_closest_sections(previous, |section| {
                chunks.insert(section, ChunkRebuildStatus::RemoveRequested);
            });
        }
        gather_closest_sections(block, |section| {
            chunks.insert(section, ChunkRebuildStatus::Requested);
        });

        self.last = Some(current);
        chunks
    }
}

/// Volumetric light backed by a [`LightBehavior`].
pub struct VolumeLightSource {
    id: LightSourceId,
    behavior: Arc<dyn LightBehavior>,
    previous_box: Option<BlockBox>,
}

impl VolumeLightSource {
    /// Wrap a behavior, allocating a fresh identity.
    pub fn new(behavior: Arc<dyn LightBehavior>) -> Self {
        Self {
            id: LightSourceId::next(),
            behavior,
            previous_box: None,
        }
    }

    fn chunks_to_rebuild(&mut self, forced: bool) -> SectionRebuildMap {
        if !forced && !self.behavior.has_changed() {
            return SectionRebuildMap::new();
        }

        let bounds = self.behavior.bounding_box();
        let mut chunks = SectionRebuildMap::new();

        if let Some(previous) = self.previous_box {
            for section in padded_sections(&previous) {
                chunks.insert(section, ChunkRebuildStatus::RemoveRequested);
            }
        }
        for section in padded_sections(&bounds) {
            chunks.insert(section, ChunkRebuildStatus::Requested);
        }

        self.previous_box = Some(bounds);
        chunks
    }
}

/// A tracked dynamic light source.
pub enum DynamicLightSource {
    Point(PointLightSource),
    Volume(VolumeLightSource),
}

impl DynamicLightSource {
    /// New point light source.
    pub fn point(emitter: Arc<dyn PointLightEmitter>) -> Self {
        Self::Point(PointLightSource::new(emitter))
    }

    /// New volumetric light source.
    pub fn volume(behavior: Arc<dyn LightBehavior>) -> Self {
        Self::Volume(VolumeLightSource::new(behavior))
    }

    /// Stable identity of this source.
    #[must_use]
    pub const fn id(&self) -> LightSourceId {
        match self {
            Self::Point(source) => source.id,
            Self::Volume(source) => source.id,
        }
    }

    /// Whether the source contributes to the spatial lookup this tick.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        match self {
            Self::Point(source) => {
                source.emitter.luminance() > 0 && source.emitter.can_light_up()
            }
            Self::Volume(source) => source.behavior.luminance() > 0,
        }
    }

    /// Whether the owner of a behavior-backed light is gone.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        match self {
            Self::Point(_) => false,
            Self::Volume(source) => source.behavior.is_removed(),
        }
    }

    /// Switch a lit point light off. Volumes are owned by their behavior and left alone.
    pub fn reset_if_lit(&self) {
        if let Self::Point(source) = self {
            if source.emitter.luminance() > 0 {
                source.emitter.reset_dynamic_light();
            }
        }
    }

    /// Split this source into grid entries, one per cell it occupies.
    ///
    /// The payload is captured now; cells are produced lazily.
    #[must_use]
    pub fn split_into_entries(&self, hasher: &CellHasher) -> SpatialEntries {
        match self {
            Self::Point(source) => {
                let position = source.emitter.position();
                let block = BlockPos::containing(position);
                SpatialEntries::new(
                    CellRange::single(hasher.cell_at(block.x, block.y, block.z)),
                    *hasher,
                    source.id,
                    LightPayload::Point {
                        position,
                        luminance: source.emitter.luminance(),
                    },
                )
            }
            Self::Volume(source) => {
                let bounds = source.behavior.bounding_box();
                let (start, end) = (bounds.start(), bounds.end());
                SpatialEntries::new(
                    CellRange::new(
                        hasher.cell_at(start.x, start.y, start.z),
                        hasher.cell_at(end.x, end.y, end.z),
                    ),
                    *hasher,
                    source.id,
                    LightPayload::Volume {
                        bounds,
                        luminance: source.behavior.luminance(),
                    },
                )
            }
        }
    }

    /// Chunk-sections whose appearance changed since the last call.
    ///
    /// `forced` returns the relevant sections even when nothing moved, which
    /// is how freshly added and removed sources get their one rebuild pass.
    pub fn chunks_to_rebuild(&mut self, forced: bool) -> SectionRebuildMap {
        match self {
            Self::Point(source) => source.chunks_to_rebuild(forced),
            Self::Volume(source) => source.chunks_to_rebuild(forced),
        }
    }
}

impl std::fmt::Debug for DynamicLightSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Point(source) => f
                .debug_struct("PointLightSource")
                .field("id", &source.id)
                .field("last", &source.last)
                .finish_non_exhaustive(),
            Self::Volume(source) => f
                .debug_struct("VolumeLightSource")
                .field("id", &source.id)
                .field("previous_box", &source.previous_box)
                .finish_non_exhaustive(),
        }
    }
}

/// The eight sections closest to a block: its own section plus the
/// neighbors on the side of the section midline the block sits on.
pub fn gather_closest_sections(block: BlockPos, mut consumer: impl FnMut(SectionPos)) {
    let section = block.section_pos();
    let direction = block.upper_half().map(|upper| if upper { 1 } else { -1 });

    for dx in [0, direction[0]] {
        for dy in [0, direction[1]] {
            for dz in [0, direction[2]] {
                consumer(section.offset(dx, dy, dz));
            }
        }
    }
}

fn start_section(coord: i32) -> i32 {
    let section = SectionPos::block_to_section(coord);
    if (coord & 15) < SECTION_MIDLINE {
        section - 1
    } else {
        section
    }
}

fn end_section(coord: i32) -> i32 {
    let section = SectionPos::block_to_section(coord);
    if (coord & 15) >= SECTION_MIDLINE {
        section + 1
    } else {
        section
    }
}

/// Sections touched by a box, snapped outward when a face crosses a section midline.
fn padded_sections(bounds: &BlockBox) -> impl Iterator<Item = SectionPos> {
    let (start, end) = (bounds.start(), bounds.end());
    CellRange::new(
        IVec3::new(start_section(start.x), start_section(start.y), start_section(start.z)),
        IVec3::new(end_section(end.x), end_section(end.y), end_section(end.z)),
    )
    .map(|cell| SectionPos::new(cell.x, cell.y, cell.z))
}
