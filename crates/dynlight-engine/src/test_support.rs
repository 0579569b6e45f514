//! Test doubles for the renderer and light owners.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use dynlight_core::{Aabb, BlockBox, FrustumIntersection, SectionPos};
use glam::DVec3;
use hashbrown::HashSet;
use parking_lot::Mutex;

use crate::scheduler::LevelRenderer;
use crate::source::{LightBehavior, PointLightEmitter};

/// Renderer recording every rebuild, with a configurable set of hidden sections.
#[derive(Default)]
pub struct RecordingRenderer {
    rebuilds: Mutex<Vec<SectionPos>>,
    hidden: Mutex<HashSet<SectionPos>>,
    hide_all: AtomicBool,
}

impl RecordingRenderer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rebuilds(&self) -> Vec<SectionPos> {
        self.rebuilds.lock().clone()
    }

    pub fn take_rebuilds(&self) -> Vec<SectionPos> {
        std::mem::take(&mut *self.rebuilds.lock())
    }

    pub fn rebuild_count(&self, section: SectionPos) -> usize {
        self.rebuilds.lock().iter().filter(|&&s| s == section).count()
    }

    pub fn hide(&self, section: SectionPos) {
        self.hidden.lock().insert(section);
    }

    pub fn show(&self, section: SectionPos) {
        self.hidden.lock().remove(&section);
    }

    pub fn set_hide_all(&self, hide: bool) {
        self.hide_all.store(hide, Ordering::Relaxed);
    }
}

impl LevelRenderer for RecordingRenderer {
    fn schedule_section_rebuild(&self, section: SectionPos) {
        self.rebuilds.lock().push(section);
    }

    fn test_section(&self, bounds: &Aabb) -> FrustumIntersection {
        let min = bounds.min.as_ivec3();
        let section = SectionPos::new(min.x >> 4, min.y >> 4, min.z >> 4);
        if self.hide_all.load(Ordering::Relaxed) || self.hidden.lock().contains(&section) {
            FrustumIntersection::Outside
        } else {
            FrustumIntersection::Inside
        }
    }
}

/// Point light owner whose state is driven by the test.
pub struct TestEmitter {
    position: Mutex<DVec3>,
    luminance: AtomicU8,
    visible: AtomicBool,
}

impl TestEmitter {
    pub fn new(position: DVec3, luminance: u8) -> Arc<Self> {
        Arc::new(Self {
            position: Mutex::new(position),
            luminance: AtomicU8::new(luminance),
            visible: AtomicBool::new(true),
        })
    }

    pub fn set_position(&self, position: DVec3) {
        *self.position.lock() = position;
    }

    pub fn set_luminance(&self, luminance: u8) {
        self.luminance.store(luminance, Ordering::Relaxed);
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }
}

impl PointLightEmitter for TestEmitter {
    fn position(&self) -> DVec3 {
        *self.position.lock()
    }

    fn luminance(&self) -> u8 {
        self.luminance.load(Ordering::Relaxed)
    }

    fn can_light_up(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    fn reset_dynamic_light(&self) {
        self.set_luminance(0);
    }
}

/// Volume light owner whose state is driven by the test.
pub struct TestBehavior {
    bounding_box: Mutex<BlockBox>,
    luminance: AtomicU8,
    changed: AtomicBool,
    removed: AtomicBool,
}

impl TestBehavior {
    pub fn new(bounding_box: BlockBox, luminance: u8) -> Arc<Self> {
        Arc::new(Self {
            bounding_box: Mutex::new(bounding_box),
            luminance: AtomicU8::new(luminance),
            changed: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        })
    }

    pub fn set_bounding_box(&self, bounding_box: BlockBox) {
        *self.bounding_box.lock() = bounding_box;
        self.changed.store(true, Ordering::Relaxed);
    }

    pub fn remove(&self) {
        self.removed.store(true, Ordering::Relaxed);
    }
}

impl LightBehavior for TestBehavior {
    fn luminance(&self) -> u8 {
        self.luminance.load(Ordering::Relaxed)
    }

    fn bounding_box(&self) -> BlockBox {
        *self.bounding_box.lock()
    }

    fn has_changed(&self) -> bool {
        self.changed.swap(false, Ordering::Relaxed)
    }

    fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Relaxed)
    }
}
