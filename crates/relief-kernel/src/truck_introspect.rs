//! KernelIntrospect implementation wrapping truck topology queries.
//!
//! Face ids are `solid_handle * 10000 + index`, where index counts faces
//! across all shells of the solid in iteration order.

use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;

use truck_modeling::geometry::Surface;
use truck_modeling::topology::{Face, Solid};
use truck_modeling::InnerSpace;

const FACE_STRIDE: u64 = 10000;

fn faces_of(solid: &Solid) -> impl Iterator<Item = Face> + '_ {
    solid
        .boundaries()
        .iter()
        .flat_map(|shell| shell.face_iter().cloned().collect::<Vec<_>>())
}

impl TruckKernel {
    fn find_face(&self, face: FaceId) -> Result<Face, KernelError> {
        let handle = KernelSolidHandle(face.0 / FACE_STRIDE);
        let index = (face.0 % FACE_STRIDE) as usize;
        self.get_solid(&handle)
            .and_then(|solid| faces_of(solid).nth(index))
            .ok_or(KernelError::FaceNotFound { face })
    }
}

impl KernelIntrospect for TruckKernel {
    fn is_planar(&self, face: FaceId) -> Result<bool, KernelError> {
        let face = self.find_face(face)?;
        Ok(matches!(face.oriented_surface(), Surface::Plane(_)))
    }

    fn face_frame(&self, face_id: FaceId) -> Result<FaceFrame, KernelError> {
        let face = self.find_face(face_id)?;
        let Surface::Plane(plane) = face.oriented_surface() else {
            return Err(KernelError::NotSupported {
                operation: "face_frame on a non-planar face".to_string(),
            });
        };
        let n = plane.normal().normalize();

        let boundaries = face.boundaries();
        let outer = boundaries.first().ok_or_else(|| KernelError::Other {
            message: format!("face {:?} has no boundary", face_id),
        })?;

        let mut sum = [0.0; 3];
        let mut count = 0.0;
        for v in outer.vertex_iter() {
            let p = v.point();
            for k in 0..3 {
                sum[k] += p[k];
            }
            count += 1.0;
        }
        let origin = if count > 0.0 {
            [sum[0] / count, sum[1] / count, sum[2] / count]
        } else {
            let p = plane.origin();
            [p[0], p[1], p[2]]
        };

        let first_edge = outer.edge_iter().next().map(|edge| {
            let front = edge.front().point();
            let back = edge.back().point();
            [back[0] - front[0], back[1] - front[1], back[2] - front[2]]
        });

        Ok(FaceFrame {
            origin,
            normal: [n[0], n[1], n[2]],
            first_edge,
        })
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceId> {
        let Some(truck_solid) = self.get_solid(solid) else {
            return Vec::new();
        };
        (0..faces_of(truck_solid).count() as u64)
            .map(|i| FaceId(solid.id() * FACE_STRIDE + i))
            .collect()
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox> {
        let truck_solid = self.get_solid(solid)?;
        BoundingBox::from_points(truck_solid.boundaries().iter().flat_map(|shell| {
            shell
                .vertex_iter()
                .map(|v| {
                    let p = v.point();
                    [p[0], p[1], p[2]]
                })
                .collect::<Vec<_>>()
        }))
    }
}
