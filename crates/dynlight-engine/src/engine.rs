//! Spatial hash of dynamic light sources.
//!
//! The grid is rebuilt from scratch every active tick: sources move
//! continuously, so tracking per-source deltas would cost as much as a
//! rebuild while making the grid state much harder to reason about.

use dynlight_core::constants::{MAX_LUMINANCE, MAX_RADIUS};
use dynlight_core::BlockPos;
use tracing::{debug, trace_span};

use crate::hasher::CellHasher;
use crate::lookup::SpatialLookupEntry;
use crate::source::DynamicLightSource;

/// Default number of buckets of the grid.
pub const DEFAULT_LIGHT_SOURCES: usize = 1024;

/// Bucketed spatial lookup answering per-block light level queries.
///
/// Entries are kept in one flat vector ordered by bucket, with
/// `bucket_starts[b]..bucket_starts[b + 1]` delimiting bucket `b`.
#[derive(Debug)]
pub struct DynamicLightingEngine {
    hasher: CellHasher,
    capacity: usize,
    entries: Vec<SpatialLookupEntry>,
    bucket_starts: Vec<usize>,
    /// Cells to visit on each side of the query cell.
    reach: i32,
}

impl DynamicLightingEngine {
    /// Create an empty grid with cubic cells of `cell_size` blocks.
    #[must_use]
    pub fn new(cell_size: u32) -> Self {
        let hasher = CellHasher::new(cell_size);
        let size = hasher.cell_size();
        let radius = MAX_RADIUS.ceil() as i32;

        Self {
            hasher,
            capacity: DEFAULT_LIGHT_SOURCES,
            entries: Vec::new(),
            bucket_starts: vec![0; DEFAULT_LIGHT_SOURCES + 1],
            reach: (radius + size - 1) / size,
        }
    }

    /// Number of buckets.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries currently in the grid.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Rebuild the grid from the given sources.
    ///
    /// Sources that cannot light up or are dark are skipped.
    pub fn compute_spatial_lookup<'a>(
        &mut self,
        sources: impl IntoIterator<Item = &'a DynamicLightSource>,
    ) {
        let _span = trace_span!("compute_spatial_lookup").entered();

        self.entries.clear();

        for source in sources {
            if source.is_lit() {
                self.entries.extend(source.split_into_entries(&self.hasher));
            }
        }

        if self.entries.len() > self.capacity {
            self.capacity = self.entries.len().next_power_of_two();
            debug!(capacity = self.capacity, "Grew spatial lookup");
        }

        let capacity = self.capacity;
        self.entries
            .sort_unstable_by_key(|entry| bucket_of(entry.cell_hash, capacity));

        self.bucket_starts.clear();
        self.bucket_starts.resize(capacity + 1, 0);
        for entry in &self.entries {
            self.bucket_starts[bucket_of(entry.cell_hash, capacity) + 1] += 1;
        }
        for bucket in 0..capacity {
            self.bucket_starts[bucket + 1] += self.bucket_starts[bucket];
        }
    }

    /// Dynamic light level at a block, in `[0, 15]`.
    #[must_use]
    pub fn dynamic_light_level(&self, pos: BlockPos) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }

        let cell = self.hasher.cell_at(pos.x, pos.y, pos.z);
        let max = f64::from(MAX_LUMINANCE);
        let mut level = 0.0_f64;

        for dx in -self.reach..=self.reach {
            for dy in -self.reach..=self.reach {
                for dz in -self.reach..=self.reach {
                    let hash = self.hasher.hash_cell(
                        cell.x.wrapping_add(dx),
                        cell.y.wrapping_add(dy),
                        cell.z.wrapping_add(dz),
                    );

                    for entry in self.bucket(hash) {
                        if entry.cell_hash != hash {
                            continue;
                        }
                        level = level.max(entry.payload.light_at(pos));
                        if level >= max {
                            return max;
                        }
                    }
                }
            }
        }

        level
    }

    /// Shrink the grid back to its default capacity.
    pub fn reset_size(&mut self) {
        self.capacity = DEFAULT_LIGHT_SOURCES;
        self.entries = Vec::new();
        self.bucket_starts = vec![0; DEFAULT_LIGHT_SOURCES + 1];
    }

    fn bucket(&self, hash: u32) -> &[SpatialLookupEntry] {
        let bucket = bucket_of(hash, self.capacity);
        &self.entries[self.bucket_starts[bucket]..self.bucket_starts[bucket + 1]]
    }
}

impl Default for DynamicLightingEngine {
    fn default() -> Self {
        Self::new(dynlight_core::constants::DEFAULT_CELL_SIZE)
    }
}

#[inline]
const fn bucket_of(hash: u32, capacity: usize) -> usize {
    hash as usize % capacity
}
