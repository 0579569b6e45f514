//! Geometry used by light volumes and frustum culling.

use glam::{DVec3, Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::coords::BlockPos;

/// Axis-Aligned Bounding Box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    #[inline]
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
}

/// Integer block volume, both corners inclusive.
///
/// Corners are normalized on construction, so an inverted box describes the
/// same volume as its corrected counterpart and a zero-extent box covers a
/// single block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockBox {
    start: BlockPos,
    end: BlockPos,
}

impl BlockBox {
    /// Create a box spanning both corners.
    #[must_use]
    pub fn new(a: BlockPos, b: BlockPos) -> Self {
        let a = a.to_ivec3();
        let b = b.to_ivec3();
        Self {
            start: a.min(b).into(),
            end: a.max(b).into(),
        }
    }

    /// Box covering a single block.
    #[must_use]
    pub const fn single(pos: BlockPos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Lowest corner
    #[inline]
    #[must_use]
    pub const fn start(&self) -> BlockPos {
        self.start
    }

    /// Highest corner (inclusive)
    #[inline]
    #[must_use]
    pub const fn end(&self) -> BlockPos {
        self.end
    }

    /// Euclidean distance from `point` to the closest point of the box.
    ///
    /// Zero when the point lies inside.
    #[must_use]
    pub fn distance_to(&self, point: DVec3) -> f64 {
        let clamped = point.clamp(self.start.to_dvec3(), self.end.to_dvec3());
        point.distance(clamped)
    }
}

/// Result of testing a volume against a [`Frustum`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrustumIntersection {
    /// Fully inside every plane.
    Inside,
    /// Straddles at least one plane.
    Intersects,
    /// Fully outside at least one plane.
    Outside,
}

impl FrustumIntersection {
    /// Whether any part of the volume may be visible.
    #[inline]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Outside)
    }
}

/// Frustum for culling operations.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    /// Six frustum planes (left, right, bottom, top, near, far)
    /// Each plane is (nx, ny, nz, d) where n is normal and d is distance
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from view-projection matrix
    #[must_use]
    pub fn from_view_projection(vp: Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let planes = [
            (row3 + row0).normalize(), // Left
            (row3 - row0).normalize(), // Right
            (row3 + row1).normalize(), // Bottom
            (row3 - row1).normalize(), // Top
            (row3 + row2).normalize(), // Near
            (row3 - row2).normalize(), // Far
        ];

        Self { planes }
    }

    /// Classify an AABB against the frustum.
    #[must_use]
    pub fn intersect_aabb(&self, aabb: &Aabb) -> FrustumIntersection {
        let mut result = FrustumIntersection::Inside;

        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);

            // Positive vertex is furthest along the plane normal, negative the closest
            let select = |positive: bool| {
                Vec3::new(
                    if (normal.x >= 0.0) == positive { aabb.max.x } else { aabb.min.x },
                    if (normal.y >= 0.0) == positive { aabb.max.y } else { aabb.min.y },
                    if (normal.z >= 0.0) == positive { aabb.max.z } else { aabb.min.z },
                )
            };

            if normal.dot(select(true)) + plane.w < 0.0 {
                return FrustumIntersection::Outside;
            }
            if normal.dot(select(false)) + plane.w < 0.0 {
                result = FrustumIntersection::Intersects;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn looking_down_neg_z() -> Frustum {
        let view = Mat4::look_to_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        Frustum::from_view_projection(projection * view)
    }

    #[test]
    fn block_box_normalizes_inverted_corners() {
        let inverted = BlockBox::new(BlockPos::new(5, 10, -2), BlockPos::new(1, 0, -8));
        assert_eq!(inverted.start(), BlockPos::new(1, 0, -8));
        assert_eq!(inverted.end(), BlockPos::new(5, 10, -2));
    }

    #[test]
    fn block_box_distance() {
        let bbox = BlockBox::new(BlockPos::new(0, 0, 0), BlockPos::new(0, 10, 0));
        assert_relative_eq!(bbox.distance_to(DVec3::new(0.0, 5.0, 0.0)), 0.0);
        assert_relative_eq!(bbox.distance_to(DVec3::new(3.0, 5.0, 4.0)), 5.0);
        assert_relative_eq!(bbox.distance_to(DVec3::new(0.0, 12.0, 0.0)), 2.0);
    }

    #[test]
    fn frustum_classifies_boxes() {
        let frustum = looking_down_neg_z();

        let ahead = Aabb::new(Vec3::new(-1.0, -1.0, -11.0), Vec3::new(1.0, 1.0, -9.0));
        assert_eq!(frustum.intersect_aabb(&ahead), FrustumIntersection::Inside);

        let behind = Aabb::new(Vec3::new(-1.0, -1.0, 9.0), Vec3::new(1.0, 1.0, 11.0));
        assert_eq!(frustum.intersect_aabb(&behind), FrustumIntersection::Outside);

        let straddling = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(
            frustum.intersect_aabb(&straddling),
            FrustumIntersection::Intersects
        );
    }
}
