//! Cell hashing for the spatial lookup grid.

use glam::IVec3;

const PRIME_X: i32 = 73_856_093;
const PRIME_Y: i32 = 19_349_663;
const PRIME_Z: i32 = 83_492_791;

/// Maps block positions to uniform grid cells and cells to hashes.
///
/// Distinct cells may share a hash; the grid stores the hash alongside each
/// entry and queries re-check distances, so collisions only cost time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellHasher {
    cell_bits: u32,
}

impl CellHasher {
    /// Create a hasher for cubic cells of `cell_size` blocks.
    ///
    /// `cell_size` must be a power of two.
    #[must_use]
    pub fn new(cell_size: u32) -> Self {
        debug_assert!(cell_size.is_power_of_two());
        Self {
            cell_bits: cell_size.trailing_zeros(),
        }
    }

    /// Cell edge length in blocks
    #[inline]
    #[must_use]
    pub const fn cell_size(&self) -> i32 {
        1 << self.cell_bits
    }

    /// Cell coordinate containing a block coordinate (floor division)
    #[inline]
    #[must_use]
    pub const fn position_to_cell(&self, coord: i32) -> i32 {
        coord >> self.cell_bits
    }

    /// Cell containing a block position
    #[inline]
    #[must_use]
    pub const fn cell_at(&self, x: i32, y: i32, z: i32) -> IVec3 {
        IVec3::new(
            self.position_to_cell(x),
            self.position_to_cell(y),
            self.position_to_cell(z),
        )
    }

    /// Hash of the cell containing the given block position
    #[inline]
    #[must_use]
    pub const fn hash_at(&self, x: i32, y: i32, z: i32) -> u32 {
        self.hash_cell(
            self.position_to_cell(x),
            self.position_to_cell(y),
            self.position_to_cell(z),
        )
    }

    /// Hash of already divided cell coordinates
    #[inline]
    #[must_use]
    pub const fn hash_cell(&self, cell_x: i32, cell_y: i32, cell_z: i32) -> u32 {
        (cell_x.wrapping_mul(PRIME_X) ^ cell_y.wrapping_mul(PRIME_Y) ^ cell_z.wrapping_mul(PRIME_Z))
            as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_at_divides_by_cell_size() {
        let hasher = CellHasher::new(8);
        assert_eq!(hasher.hash_at(0, 0, 0), hasher.hash_at(7, 7, 7));
        assert_eq!(hasher.hash_at(8, 0, 0), hasher.hash_cell(1, 0, 0));
        assert_ne!(hasher.hash_at(8, 0, 0), hasher.hash_at(7, 0, 0));
    }

    #[test]
    fn negative_positions_floor() {
        let hasher = CellHasher::new(8);
        assert_eq!(hasher.position_to_cell(-1), -1);
        assert_eq!(hasher.position_to_cell(-8), -1);
        assert_eq!(hasher.position_to_cell(-9), -2);
        assert_eq!(hasher.hash_at(-1, -1, -1), hasher.hash_cell(-1, -1, -1));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let hasher = CellHasher::new(1);
        let _ = hasher.hash_cell(i32::MAX, i32::MIN, i32::MAX);
        assert_eq!(hasher.cell_size(), 1);
    }
}
