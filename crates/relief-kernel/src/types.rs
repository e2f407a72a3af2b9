use serde::{Deserialize, Serialize};

// Re-export shared types from relief-types
pub use relief_types::{FaceId, PlanarRegion, Point2, SketchPlane};

/// Opaque handle to a solid in the geometry kernel.
/// NEVER persisted. Valid only for the current kernel session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier, used for standalone faces
/// awaiting extrusion. Consumed by the operation that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelId(pub u64);

/// Centroid, outward unit normal and first boundary edge direction of a face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    /// Direction of the first boundary edge, if the face has one.
    pub first_edge: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |b, p| b.include(p),
        ))
    }

    pub fn include(self, p: [f64; 3]) -> Self {
        let mut out = self;
        for k in 0..3 {
            out.min[k] = out.min[k].min(p[k]);
            out.max[k] = out.max[k].max(p[k]);
        }
        out
    }

    pub fn merge(self, other: BoundingBox) -> Self {
        self.include(other.min).include(other.max)
    }

    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("face not found: {face:?}")]
    FaceNotFound { face: FaceId },

    #[error("invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}
