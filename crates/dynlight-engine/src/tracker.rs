//! Authoritative set of tracked light sources.

use dynlight_core::LightSourceId;
use hashbrown::{HashMap, HashSet};

use crate::source::{DynamicLightSource, SectionRebuildMap};

/// Tracked sources with their per-tick lifecycle bookkeeping.
///
/// Sources added this tick are remembered as pending-add so their first
/// rebuild is forced. Removed sources move to the pending-clear list, where
/// they wait for one last forced rebuild that erases their light.
#[derive(Debug, Default)]
pub struct LightSourceTracker {
    sources: HashMap<LightSourceId, DynamicLightSource>,
    pending_add: HashSet<LightSourceId>,
    pending_clear: Vec<DynamicLightSource>,
}

impl LightSourceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a source. Returns `false` if it already was.
    pub fn add(&mut self, source: DynamicLightSource) -> bool {
        let id = source.id();
        if self.sources.contains_key(&id) {
            return false;
        }
        self.sources.insert(id, source);
        self.pending_add.insert(id);
        true
    }

    #[must_use]
    pub fn contains(&self, id: LightSourceId) -> bool {
        self.sources.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Stop tracking a source, switching it off and queueing its last rebuild.
    pub fn remove(&mut self, id: LightSourceId) -> bool {
        let Some(source) = self.sources.remove(&id) else {
            return false;
        };
        self.retire(source);
        true
    }

    /// Stop tracking every source matching the predicate. Returns how many were removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&DynamicLightSource) -> bool) -> usize {
        let removed: Vec<LightSourceId> = self
            .sources
            .iter()
            .filter(|(_, source)| predicate(source))
            .map(|(&id, _)| id)
            .collect();

        for &id in &removed {
            self.remove(id);
        }
        removed.len()
    }

    /// Stop tracking everything.
    pub fn clear_all(&mut self) -> usize {
        let count = self.sources.len();
        let drained: Vec<DynamicLightSource> = self.sources.drain().map(|(_, source)| source).collect();
        for source in drained {
            self.retire(source);
        }
        count
    }

    /// Sources waiting for their final rebuild, emptied by this call.
    pub fn take_pending_clear(&mut self) -> Vec<DynamicLightSource> {
        std::mem::take(&mut self.pending_clear)
    }

    /// Rebuild sets of every source that changed this tick.
    ///
    /// Sources added since the last call, or all of them with `force_all`,
    /// report their sections even when nothing moved. Clears the pending-add set.
    pub fn collect_changes(&mut self, force_all: bool) -> Vec<(LightSourceId, SectionRebuildMap)> {
        let pending_add = std::mem::take(&mut self.pending_add);
        self.sources
            .iter_mut()
            .filter_map(|(&id, source)| {
                let chunks = source.chunks_to_rebuild(force_all || pending_add.contains(&id));
                (!chunks.is_empty()).then_some((id, chunks))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynamicLightSource> {
        self.sources.values()
    }

    fn retire(&mut self, source: DynamicLightSource) {
        self.pending_add.remove(&source.id());
        source.reset_if_lit();
        self.pending_clear.push(source);
    }
}
