//! Spatial lookup entries produced by light sources.

use dynlight_core::constants::{MAX_LUMINANCE, MAX_RADIUS, MAX_RADIUS_SQUARED};
use dynlight_core::{BlockBox, BlockPos, LightSourceId};
use glam::{DVec3, IVec3};

use crate::hasher::CellHasher;

/// Light contribution stored in the grid, captured when the grid is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightPayload {
    /// Light emitted from a single point.
    Point { position: DVec3, luminance: u8 },
    /// Light emitted from every block of a volume.
    Volume { bounds: BlockBox, luminance: u8 },
}

impl LightPayload {
    /// Luminance at the source itself.
    #[must_use]
    pub const fn luminance(&self) -> u8 {
        match self {
            Self::Point { luminance, .. } | Self::Volume { luminance, .. } => *luminance,
        }
    }

    /// Attenuated light level this payload casts on a block.
    ///
    /// Falls off linearly from the full luminance at distance 0 to nothing at
    /// [`MAX_RADIUS`].
    #[must_use]
    pub fn light_at(&self, pos: BlockPos) -> f64 {
        let target = pos.to_dvec3();
        let distance_sq = match self {
            Self::Point { position, .. } => position.distance_squared(target),
            Self::Volume { bounds, .. } => {
                let distance = bounds.distance_to(target);
                distance * distance
            }
        };

        if distance_sq > MAX_RADIUS_SQUARED {
            return 0.0;
        }

        let luminance = f64::from(self.luminance().min(MAX_LUMINANCE));
        (1.0 - distance_sq.sqrt() / MAX_RADIUS) * luminance
    }
}

/// One (cell, light) pair of the spatial grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialLookupEntry {
    /// Hash of the cell this entry lives in.
    pub cell_hash: u32,
    /// Light source the entry was split from.
    pub source: LightSourceId,
    pub payload: LightPayload,
}

/// Inclusive range of cells, iterated X-major then Y then Z.
#[derive(Clone, Debug)]
pub struct CellRange {
    min: IVec3,
    max: IVec3,
    cursor: Option<IVec3>,
}

impl CellRange {
    /// Range spanning both corners, in either order.
    #[must_use]
    pub fn new(a: IVec3, b: IVec3) -> Self {
        let min = a.min(b);
        Self {
            min,
            max: a.max(b),
            cursor: Some(min),
        }
    }

    /// Range holding a single cell.
    #[must_use]
    pub fn single(cell: IVec3) -> Self {
        Self::new(cell, cell)
    }
}

impl Iterator for CellRange {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        let current = self.cursor?;

        // Compare before stepping so ranges ending at i32::MAX terminate
        self.cursor = if current.z < self.max.z {
            Some(IVec3::new(current.x, current.y, current.z + 1))
        } else if current.y < self.max.y {
            Some(IVec3::new(current.x, current.y + 1, self.min.z))
        } else if current.x < self.max.x {
            Some(IVec3::new(current.x + 1, self.min.y, self.min.z))
        } else {
            None
        };

        Some(current)
    }
}

/// Lazy sequence of grid entries for one light source.
#[derive(Clone, Debug)]
pub struct SpatialEntries {
    cells: CellRange,
    hasher: CellHasher,
    source: LightSourceId,
    payload: LightPayload,
}

impl SpatialEntries {
    pub(crate) const fn new(
        cells: CellRange,
        hasher: CellHasher,
        source: LightSourceId,
        payload: LightPayload,
    ) -> Self {
        Self {
            cells,
            hasher,
            source,
            payload,
        }
    }
}

impl Iterator for SpatialEntries {
    type Item = SpatialLookupEntry;

    fn next(&mut self) -> Option<SpatialLookupEntry> {
        let cell = self.cells.next()?;
        Some(SpatialLookupEntry {
            cell_hash: self.hasher.hash_cell(cell.x, cell.y, cell.z),
            source: self.source,
            payload: self.payload,
        })
    }
}
