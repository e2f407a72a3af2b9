use crate::types::*;

/// Core geometry kernel trait: the construction operations a relief needs.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
pub trait Kernel {
    /// Create a standalone planar face from a region laid out on a sketch plane.
    /// The outer ring becomes the face boundary, every hole an inner boundary.
    fn make_region_face(
        &mut self,
        region: &PlanarRegion,
        plane: &SketchPlane,
    ) -> Result<KernelId, KernelError>;

    /// Extrude a standalone face along a direction vector. Consumes the face.
    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Drop a solid the caller no longer needs. Unknown handles are ignored.
    fn release(&mut self, solid: &KernelSolidHandle);
}

/// Read-only queries on kernel geometry.
pub trait KernelIntrospect {
    /// Whether the face lies on a plane.
    fn is_planar(&self, face: FaceId) -> Result<bool, KernelError>;

    /// Centroid, outward normal and first edge of a planar face.
    fn face_frame(&self, face: FaceId) -> Result<FaceFrame, KernelError>;

    /// List all faces of a solid.
    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceId>;

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox>;
}
