//! Face placement: an orthonormal in-plane basis on a planar face, offsets and rotation.

use relief_kernel::KernelIntrospect;
use relief_types::{add, cross, dot, normalize, scale, sub, FaceId, Point2, SketchPlane};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::ReliefError;

/// Where the in-plane U axis comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BasisHint {
    /// The face's first boundary edge, falling back to a world axis.
    #[default]
    FirstEdge,
    /// Always derive U from the world axis least parallel to the normal.
    WorldAxis,
    /// An explicit direction, projected into the plane.
    Direction([f64; 3]),
}

/// 2D-to-3D placement on a face.
///
/// `u`, `v` and `normal` are orthonormal with `u × v = normal`. Offsets move
/// the anchor along `u`/`v`; rotation then turns the artwork about the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementFrame {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub u: [f64; 3],
    pub v: [f64; 3],
    pub offset_u: f64,
    pub offset_v: f64,
    pub rotation_deg: f64,
}

impl PlacementFrame {
    /// Point where the artwork centre lands.
    pub fn anchor(&self) -> [f64; 3] {
        add(
            self.origin,
            add(scale(self.u, self.offset_u), scale(self.v, self.offset_v)),
        )
    }

    /// `u` and `v` turned counter-clockwise about the normal by the rotation.
    pub fn rotated_axes(&self) -> ([f64; 3], [f64; 3]) {
        let (s, c) = self.rotation_deg.to_radians().sin_cos();
        (
            add(scale(self.u, c), scale(self.v, s)),
            sub(scale(self.v, c), scale(self.u, s)),
        )
    }

    /// Sketch plane at the anchor with the rotated basis.
    pub fn sketch_plane(&self) -> SketchPlane {
        let (x_axis, y_axis) = self.rotated_axes();
        SketchPlane {
            origin: self.anchor(),
            x_axis,
            y_axis,
            normal: self.normal,
        }
    }

    pub fn to_world(&self, p: Point2) -> [f64; 3] {
        self.sketch_plane().to_world(p)
    }
}

/// World axis with the smallest component along `n`; ties prefer x, then y.
fn least_parallel_axis(n: [f64; 3]) -> [f64; 3] {
    let (ax, ay, az) = (n[0].abs(), n[1].abs(), n[2].abs());
    if ax <= ay && ax <= az {
        [1.0, 0.0, 0.0]
    } else if ay <= ax && ay <= az {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    }
}

/// Build a placement frame from a face point, its normal and an optional U hint.
///
/// A hint parallel to the normal is ignored.
pub fn derive_frame(
    origin: [f64; 3],
    normal: [f64; 3],
    hint: Option<[f64; 3]>,
    offset_u: f64,
    offset_v: f64,
    rotation_deg: f64,
) -> Result<PlacementFrame, ReliefError> {
    let n = normalize(normal).ok_or_else(|| ReliefError::invalid("normal", "zero length"))?;

    let from_hint = hint.and_then(|h| {
        let in_plane = sub(h, scale(n, dot(h, n)));
        normalize(in_plane).filter(|_| length_ratio(in_plane, h) > 1e-6)
    });
    let u = match from_hint {
        Some(u) => u,
        None => normalize(cross(n, least_parallel_axis(n)))
            .ok_or_else(|| ReliefError::invalid("normal", "cannot derive an in-plane axis"))?,
    };
    let v = cross(n, u);

    Ok(PlacementFrame {
        origin,
        normal: n,
        u,
        v,
        offset_u,
        offset_v,
        rotation_deg,
    })
}

fn length_ratio(part: [f64; 3], whole: [f64; 3]) -> f64 {
    let w = dot(whole, whole).sqrt();
    if w > 0.0 {
        dot(part, part).sqrt() / w
    } else {
        0.0
    }
}

/// Placement frame for a kernel face. Rejects non-planar faces before anything else.
pub fn frame_for_face(
    kernel: &dyn KernelIntrospect,
    face: FaceId,
    hint: BasisHint,
    offset_u: f64,
    offset_v: f64,
    rotation_deg: f64,
) -> Result<PlacementFrame, ReliefError> {
    if !kernel.is_planar(face)? {
        return Err(ReliefError::NonPlanarFace { face });
    }
    let report = kernel.face_frame(face)?;
    let hint = match hint {
        BasisHint::FirstEdge => report.first_edge,
        BasisHint::WorldAxis => None,
        BasisHint::Direction(d) => Some(d),
    };
    let frame = derive_frame(
        report.origin,
        report.normal,
        hint,
        offset_u,
        offset_v,
        rotation_deg,
    )?;
    debug!(?face, normal = ?frame.normal, u = ?frame.u, "placement frame derived");
    Ok(frame)
}
