//! Simulated world: a culling renderer, orbiting torches and a beacon.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use dynlight_core::{Aabb, BlockBox, BlockPos, Frustum, FrustumIntersection, SectionPos};
use dynlight_engine::{LevelRenderer, LightBehavior, PointLightEmitter};
use glam::DVec3;
use parking_lot::{Mutex, RwLock};

/// Renderer that only counts rebuilds and culls against a camera frustum.
pub struct SimRenderer {
    frustum: RwLock<Frustum>,
    rebuilds: AtomicUsize,
    culled_tests: AtomicUsize,
}

impl SimRenderer {
    pub fn new(frustum: Frustum) -> Arc<Self> {
        Arc::new(Self {
            frustum: RwLock::new(frustum),
            rebuilds: AtomicUsize::new(0),
            culled_tests: AtomicUsize::new(0),
        })
    }

    pub fn set_frustum(&self, frustum: Frustum) {
        *self.frustum.write() = frustum;
    }

    /// Total section rebuilds requested so far.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Section tests that came back outside the frustum.
    pub fn culled_tests(&self) -> usize {
        self.culled_tests.load(Ordering::Relaxed)
    }
}

impl LevelRenderer for SimRenderer {
    fn schedule_section_rebuild(&self, _section: SectionPos) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    fn test_section(&self, bounds: &Aabb) -> FrustumIntersection {
        let result = self.frustum.read().intersect_aabb(bounds);
        if result == FrustumIntersection::Outside {
            self.culled_tests.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}

/// A torch carried in a circle around a center point.
pub struct OrbitingTorch {
    center: DVec3,
    radius: f64,
    speed: f64,
    position: Mutex<DVec3>,
    luminance: AtomicU8,
}

impl OrbitingTorch {
    pub fn new(center: DVec3, radius: f64, speed: f64, luminance: u8) -> Arc<Self> {
        Arc::new(Self {
            center,
            radius,
            speed,
            position: Mutex::new(center + DVec3::new(radius, 0.0, 0.0)),
            luminance: AtomicU8::new(luminance),
        })
    }

    /// Move the torch to where it is at the given tick.
    pub fn advance(&self, tick: u64) {
        let angle = tick as f64 * self.speed;
        let (sin, cos) = angle.sin_cos();
        *self.position.lock() = self.center + DVec3::new(cos * self.radius, 0.0, sin * self.radius);
    }
}

impl PointLightEmitter for OrbitingTorch {
    fn position(&self) -> DVec3 {
        *self.position.lock()
    }

    fn luminance(&self) -> u8 {
        self.luminance.load(Ordering::Relaxed)
    }

    fn reset_dynamic_light(&self) {
        self.luminance.store(0, Ordering::Relaxed);
    }
}

/// Beacon beam growing from its base up to a maximum height, then switched off.
pub struct Beacon {
    base: BlockPos,
    max_height: i32,
    height: AtomicI32,
    changed: AtomicBool,
    removed: AtomicBool,
}

impl Beacon {
    pub fn new(base: BlockPos, max_height: i32) -> Arc<Self> {
        Arc::new(Self {
            base,
            max_height,
            height: AtomicI32::new(1),
            changed: AtomicBool::new(false),
            removed: AtomicBool::new(false),
        })
    }

    /// Grow the beam by `step` blocks; once fully grown the beacon is removed.
    pub fn grow(&self, step: i32) {
        let height = self.height.load(Ordering::Relaxed);
        if height >= self.max_height {
            self.removed.store(true, Ordering::Relaxed);
            return;
        }
        self.height.store((height + step).min(self.max_height), Ordering::Relaxed);
        self.changed.store(true, Ordering::Relaxed);
    }
}

impl LightBehavior for Beacon {
    fn luminance(&self) -> u8 {
        15
    }

    fn bounding_box(&self) -> BlockBox {
        let top = self.base.y + self.height.load(Ordering::Relaxed) - 1;
        BlockBox::new(self.base, BlockPos::new(self.base.x, top, self.base.z))
    }

    fn has_changed(&self) -> bool {
        self.changed.swap(false, Ordering::Relaxed)
    }

    fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Relaxed)
    }
}
