//! TruckKernel: real geometry kernel wrapping truck's API.

use crate::primitives;
use crate::traits::Kernel;
use crate::types::*;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Edge, Face, Solid, Wire};
use truck_modeling::{InnerSpace, Point3, Vector3};

/// Tolerance handed to truck-shapeops when none is configured.
pub const DEFAULT_BOOLEAN_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    next_id: u64,
    tolerance: f64,
    solids: HashMap<u64, Solid>,
    /// Standalone faces created by make_region_face, awaiting extrude.
    standalone_faces: HashMap<u64, Face>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self::with_tolerance(DEFAULT_BOOLEAN_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            next_handle: 1,
            next_id: 1,
            tolerance,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    /// Add an axis-aligned block, e.g. as the base part a relief is applied to.
    pub fn insert_block(&mut self, min: [f64; 3], max: [f64; 3]) -> KernelSolidHandle {
        self.store_solid(primitives::make_block(min, max))
    }

    /// Number of solids the kernel still holds.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    fn solid_or_err(&self, handle: &KernelSolidHandle) -> Result<Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .cloned()
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Closed wire through `ring`, embedded on `plane`. Edges share vertices.
fn ring_wire(ring: &[Point2], plane: &SketchPlane) -> Result<Wire, KernelError> {
    if ring.len() < 3 {
        return Err(KernelError::InvalidProfile {
            reason: format!("ring has {} points, need at least 3", ring.len()),
        });
    }
    let pts_3d: Vec<Point3> = ring
        .iter()
        .map(|&p| {
            let w = plane.to_world(p);
            Point3::new(w[0], w[1], w[2])
        })
        .collect();

    let n = pts_3d.len();
    let vertices: Vec<_> = pts_3d.iter().map(|&p| builder::vertex(p)).collect();
    let mut wire_edges: Vec<Edge> = Vec::new();
    for i in 0..n {
        let j = (i + 1) % n;
        let edge = Edge::new(
            &vertices[i],
            &vertices[j],
            truck_modeling::geometry::Curve::Line(truck_modeling::geometry::Line(
                pts_3d[i], pts_3d[j],
            )),
        );
        wire_edges.push(edge);
    }
    Ok(Wire::from_iter(wire_edges))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a truck-shapeops call. Both a `None` result and a panic inside truck's
/// topology checks come back as `BooleanFailed`.
fn run_shapeop(op: &str, f: impl FnOnce() -> Option<Solid>) -> Result<Solid, KernelError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Some(solid)) => Ok(solid),
        Ok(None) => Err(KernelError::BooleanFailed {
            reason: format!("truck {op}() returned None"),
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(op, %message, "truck boolean panicked");
            Err(KernelError::BooleanFailed {
                reason: format!("truck {op}() panicked: {message}"),
            })
        }
    }
}

/// Outward normal of a planar face, if it is planar.
fn face_normal(face: &Face) -> Option<Vector3> {
    match face.oriented_surface() {
        Surface::Plane(plane) => Some(plane.normal()),
        _ => None,
    }
}

impl Kernel for TruckKernel {
    fn make_region_face(
        &mut self,
        region: &PlanarRegion,
        plane: &SketchPlane,
    ) -> Result<KernelId, KernelError> {
        let wires = region
            .rings()
            .map(|ring| ring_wire(ring, plane))
            .collect::<Result<Vec<_>, _>>()?;

        let face = builder::try_attach_plane(&wires).map_err(|e| KernelError::InvalidProfile {
            reason: format!("failed to create planar face: {}", e),
        })?;

        let face_id = self.alloc_id();
        debug!(face = face_id.0, holes = region.holes.len(), "region face created");
        self.standalone_faces.insert(face_id.0, face);
        Ok(face_id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let mut truck_face = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;

        let dir = Vector3::new(direction[0], direction[1], direction[2]);
        let dir_len = dir.magnitude();
        if dir_len < 1e-12 {
            return Err(KernelError::Other {
                message: "extrude direction has zero length".to_string(),
            });
        }
        if !(depth > 0.0 && depth.is_finite()) {
            return Err(KernelError::Other {
                message: format!("extrude depth must be positive, got {depth}"),
            });
        }
        let sweep_vec = dir.normalize() * depth;

        // tsweep yields an outward-oriented solid only when sweeping along the
        // face normal. Cut tools sweep into the body, against it.
        if face_normal(&truck_face).is_some_and(|n| n.dot(sweep_vec) < 0.0) {
            truck_face.invert();
        }
        let solid = builder::tsweep(&truck_face, sweep_vec);
        Ok(self.store_solid(solid))
    }

    #[instrument(skip(self))]
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid_or_err(a)?;
        let solid_b = self.solid_or_err(b)?;

        let tolerance = self.tolerance;
        let result = run_shapeop("or", || truck_shapeops::or(&solid_a, &solid_b, tolerance))?;
        Ok(self.store_solid(result))
    }

    #[instrument(skip(self))]
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        let solid_a = self.solid_or_err(a)?;
        let mut solid_b = self.solid_or_err(b)?;

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let tolerance = self.tolerance;
        let result = run_shapeop("and", || truck_shapeops::and(&solid_a, &solid_b, tolerance))?;
        Ok(self.store_solid(result))
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}
