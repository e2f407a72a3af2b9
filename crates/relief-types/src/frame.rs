use serde::{Deserialize, Serialize};

use crate::outline::Point2;

/// Identifier of a face on a kernel solid, as reported by the host.
/// Stable for as long as the host keeps the same base solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceId(pub u64);

/// An oriented plane with an orthonormal in-plane basis.
/// 2D outline coordinates map to `origin + x * x_axis + y * y_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub origin: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
    pub normal: [f64; 3],
}

impl SketchPlane {
    /// Embed a plane-local point in world coordinates.
    pub fn to_world(&self, p: Point2) -> [f64; 3] {
        add(self.origin, add(scale(self.x_axis, p.x), scale(self.y_axis, p.y)))
    }

    /// Same basis, origin moved `distance` along the normal.
    pub fn lifted(&self, distance: f64) -> Self {
        Self {
            origin: add(self.origin, scale(self.normal, distance)),
            ..*self
        }
    }
}

pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Unit vector in the direction of `a`, or `None` for a (near) zero vector.
pub fn normalize(a: [f64; 3]) -> Option<[f64; 3]> {
    let len = length(a);
    if len < 1e-12 || !len.is_finite() {
        None
    } else {
        Some(scale(a, 1.0 / len))
    }
}
