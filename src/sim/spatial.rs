//! Ground-plane proximity helpers

use glam::Vec2;

/// Axis-aligned proximity: both axis gaps must be at most `distance`.
#[inline]
pub fn within_distance_2d(distance: f32, u1: f32, u2: f32, v1: f32, v2: f32) -> bool {
    (u1 - u2).abs() <= distance && (v1 - v2).abs() <= distance
}

/// [`within_distance_2d`] over two ground positions.
#[inline]
pub fn within(distance: f32, a: Vec2, b: Vec2) -> bool {
    within_distance_2d(distance, a.x, b.x, a.y, b.y)
}

/// Runs a per-frame callback on every Nth invocation only.
#[derive(Debug, Clone)]
pub struct EveryNthFrame {
    every: u32,
    calls: u32,
}

impl EveryNthFrame {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            calls: 0,
        }
    }

    /// Count one invocation; `f` runs (and its result is returned) on every
    /// Nth call.
    pub fn call<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
        self.calls = self.calls.wrapping_add(1);
        if self.calls % self.every == 0 {
            Some(f())
        } else {
            None
        }
    }
}
