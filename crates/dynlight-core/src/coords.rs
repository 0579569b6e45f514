//! Block and chunk-section coordinates.

use crate::constants::{SECTION_BITS, SECTION_MIDLINE, SECTION_SIZE};
use crate::math::Aabb;
use glam::{DVec3, IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Block position in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the block containing a continuous position (floored on every axis)
    #[inline]
    #[must_use]
    pub fn containing(pos: DVec3) -> Self {
        Self::new(
            pos.x.floor() as i32,
            pos.y.floor() as i32,
            pos.z.floor() as i32,
        )
    }

    /// Get the chunk-section containing this block
    #[inline]
    #[must_use]
    pub const fn section_pos(self) -> SectionPos {
        SectionPos::new(
            self.x >> SECTION_BITS,
            self.y >> SECTION_BITS,
            self.z >> SECTION_BITS,
        )
    }

    /// Whether the block sits in the upper half of its section, per axis.
    ///
    /// Lights in the upper half bleed into the next section, lights in the
    /// lower half into the previous one.
    #[inline]
    #[must_use]
    pub const fn upper_half(self) -> [bool; 3] {
        let mask = SECTION_SIZE - 1;
        [
            (self.x & mask) >= SECTION_MIDLINE,
            (self.y & mask) >= SECTION_MIDLINE,
            (self.z & mask) >= SECTION_MIDLINE,
        ]
    }

    /// Convert to double precision vector
    #[inline]
    #[must_use]
    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    /// Convert to glam IVec3
    #[inline]
    #[must_use]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for BlockPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Chunk-section position (16x16x16 blocks) in section coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SectionPos {
    /// Create a new section position
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert a block coordinate to a section coordinate
    #[inline]
    #[must_use]
    pub const fn block_to_section(coord: i32) -> i32 {
        coord >> SECTION_BITS
    }

    /// Lowest block corner of this section
    #[inline]
    #[must_use]
    pub const fn min_block(self) -> BlockPos {
        BlockPos::new(
            self.x << SECTION_BITS,
            self.y << SECTION_BITS,
            self.z << SECTION_BITS,
        )
    }

    /// Section moved by the given amount of sections, wrapping at the `i32` range
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// World-space cube covered by this section, used for frustum tests.
    #[must_use]
    pub fn bounds(self) -> Aabb {
        let min = self.min_block();
        let min = Vec3::new(min.x as f32, min.y as f32, min.z as f32);
        Aabb::new(min, min + Vec3::splat(SECTION_SIZE as f32))
    }
}

impl std::fmt::Display for SectionPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}
