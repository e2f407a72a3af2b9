//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Solids are kept as CSG trees of axis-aligned blocks and extruded regions,
//! so point membership and depth probes along a ray are exact. Only blocks
//! created with [`MockKernel::add_block`] expose faces.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use relief_types::{add, dot, normalize, scale, sub};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

const EPS: f64 = 1e-9;

#[derive(Debug)]
enum MockShape {
    Block {
        min: [f64; 3],
        max: [f64; 3],
    },
    /// `region` laid out on `plane`, swept `depth` along unit `direction`.
    Prism {
        plane: SketchPlane,
        region: PlanarRegion,
        direction: [f64; 3],
        depth: f64,
    },
    Union(Rc<MockShape>, Rc<MockShape>),
    Difference(Rc<MockShape>, Rc<MockShape>),
}

impl MockShape {
    fn contains(&self, p: [f64; 3]) -> bool {
        match self {
            MockShape::Block { min, max } => (0..3).all(|k| p[k] >= min[k] && p[k] <= max[k]),
            MockShape::Prism {
                plane,
                region,
                direction,
                depth,
            } => {
                let dn = dot(*direction, plane.normal);
                if dn.abs() < EPS {
                    return false;
                }
                let s = dot(sub(p, plane.origin), plane.normal) / dn;
                if s < -EPS || s > depth + EPS {
                    return false;
                }
                let q = sub(sub(p, scale(*direction, s)), plane.origin);
                region.contains(Point2::new(dot(q, plane.x_axis), dot(q, plane.y_axis)))
            }
            MockShape::Union(a, b) => a.contains(p) || b.contains(p),
            MockShape::Difference(a, b) => a.contains(p) && !b.contains(p),
        }
    }

    /// Ray parameters where `origin + t * dir` may cross this shape's boundary.
    fn crossings(&self, origin: [f64; 3], dir: [f64; 3], out: &mut Vec<f64>) {
        match self {
            MockShape::Block { min, max } => {
                for k in 0..3 {
                    if dir[k].abs() > EPS {
                        out.push((min[k] - origin[k]) / dir[k]);
                        out.push((max[k] - origin[k]) / dir[k]);
                    }
                }
            }
            MockShape::Prism {
                plane,
                region,
                direction,
                depth,
            } => {
                let dn = dot(*direction, plane.normal);
                if dn.abs() < EPS {
                    return;
                }
                // Sweep parameter along the ray: s(t) = s0 + t * ds.
                let s0 = dot(sub(origin, plane.origin), plane.normal) / dn;
                let ds = dot(dir, plane.normal) / dn;
                if ds.abs() > EPS {
                    out.push(-s0 / ds);
                    out.push((depth - s0) / ds);
                }

                // Footprint of the ray projected back onto the base plane.
                let q0 = sub(sub(origin, scale(*direction, s0)), plane.origin);
                let dq = sub(dir, scale(*direction, ds));
                let (a0, b0) = (dot(q0, plane.x_axis), dot(q0, plane.y_axis));
                let (da, db) = (dot(dq, plane.x_axis), dot(dq, plane.y_axis));
                if da.hypot(db) < EPS {
                    return;
                }
                for ring in region.rings() {
                    let n = ring.len();
                    for i in 0..n {
                        let (p, q) = (ring[i], ring[(i + 1) % n]);
                        let (ex, ey) = (q.x - p.x, q.y - p.y);
                        let det = ex * db - da * ey;
                        if det.abs() < 1e-15 {
                            continue;
                        }
                        let (r0, r1) = (p.x - a0, p.y - b0);
                        let t = (ex * r1 - ey * r0) / det;
                        let u = (da * r1 - db * r0) / det;
                        if (-EPS..=1.0 + EPS).contains(&u) {
                            out.push(t);
                        }
                    }
                }
            }
            MockShape::Union(a, b) | MockShape::Difference(a, b) => {
                a.crossings(origin, dir, out);
                b.crossings(origin, dir, out);
            }
        }
    }

    fn bounds(&self) -> Option<BoundingBox> {
        match self {
            MockShape::Block { min, max } => Some(BoundingBox {
                min: *min,
                max: *max,
            }),
            MockShape::Prism {
                plane,
                region,
                direction,
                depth,
            } => {
                let sweep = scale(*direction, *depth);
                BoundingBox::from_points(region.outer.iter().flat_map(|&p| {
                    let base = plane.to_world(p);
                    [base, add(base, sweep)]
                }))
            }
            MockShape::Union(a, b) => match (a.bounds(), b.bounds()) {
                (Some(x), Some(y)) => Some(x.merge(y)),
                (x, y) => x.or(y),
            },
            MockShape::Difference(a, _) => a.bounds(),
        }
    }
}

#[derive(Debug, Clone)]
struct MockFace {
    solid: u64,
    frame: FaceFrame,
    planar: bool,
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, Rc<MockShape>>,
    /// Faces created by make_region_face, awaiting extrude.
    standalone_faces: HashMap<u64, (PlanarRegion, SketchPlane)>,
    faces: BTreeMap<u64, MockFace>,
    build_calls: usize,
    boolean_calls: usize,
    fail_boolean_at: Option<usize>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
            faces: BTreeMap::new(),
            build_calls: 0,
            boolean_calls: 0,
            fail_boolean_at: None,
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn store(&mut self, shape: MockShape) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        self.solids.insert(h.id(), Rc::new(shape));
        h
    }

    fn shape(&self, handle: &KernelSolidHandle) -> Result<Rc<MockShape>, KernelError> {
        self.solids
            .get(&handle.id())
            .cloned()
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn register_face(&mut self, solid: u64, frame: FaceFrame, planar: bool) -> FaceId {
        let id = self.alloc_id();
        self.faces.insert(
            id,
            MockFace {
                solid,
                frame,
                planar,
            },
        );
        FaceId(id)
    }

    /// Add an axis-aligned block with six planar faces, in the order
    /// bottom, top, front (-y), back (+y), left (-x), right (+x).
    pub fn add_block(&mut self, min: [f64; 3], max: [f64; 3]) -> KernelSolidHandle {
        let handle = self.store(MockShape::Block { min, max });
        let mid = scale(add(min, max), 0.5);
        let at = |k: usize, v: f64| {
            let mut p = mid;
            p[k] = v;
            p
        };
        let sides = [
            (at(2, min[2]), [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            (at(2, max[2]), [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            (at(1, min[1]), [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
            (at(1, max[1]), [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
            (at(0, min[0]), [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            (at(0, max[0]), [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];
        for (origin, normal, edge) in sides {
            let frame = FaceFrame {
                origin,
                normal,
                first_edge: Some(edge),
            };
            self.register_face(handle.id(), frame, true);
        }
        handle
    }

    /// Attach a non-planar face to an existing solid. Its geometry is not modelled.
    pub fn add_curved_face(
        &mut self,
        solid: &KernelSolidHandle,
        origin: [f64; 3],
        normal: [f64; 3],
    ) -> FaceId {
        let frame = FaceFrame {
            origin,
            normal,
            first_edge: None,
        };
        self.register_face(solid.id(), frame, false)
    }

    /// Make the `n`th boolean from now fail (0 = the next one).
    pub fn fail_nth_boolean(&mut self, n: usize) {
        self.fail_boolean_at = Some(self.boolean_calls + n);
    }

    /// Number of construction calls (faces, extrusions, booleans) made so far.
    pub fn build_calls(&self) -> usize {
        self.build_calls
    }

    pub fn boolean_calls(&self) -> usize {
        self.boolean_calls
    }

    /// Solids currently held by the kernel.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    pub fn is_live(&self, solid: &KernelSolidHandle) -> bool {
        self.solids.contains_key(&solid.id())
    }

    pub fn contains_point(&self, solid: &KernelSolidHandle, p: [f64; 3]) -> Option<bool> {
        self.solids.get(&solid.id()).map(|s| s.contains(p))
    }

    /// Material intervals `(t_in, t_out)` along `origin + t * dir` for `t` in `[0, t_max]`.
    pub fn ray_intervals(
        &self,
        solid: &KernelSolidHandle,
        origin: [f64; 3],
        dir: [f64; 3],
        t_max: f64,
    ) -> Option<Vec<(f64, f64)>> {
        let shape = self.solids.get(&solid.id())?;
        let mut ts = vec![0.0, t_max];
        shape.crossings(origin, dir, &mut ts);
        ts.retain(|t| t.is_finite() && *t >= 0.0 && *t <= t_max);
        ts.sort_by(f64::total_cmp);
        ts.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        let mut intervals: Vec<(f64, f64)> = Vec::new();
        for w in ts.windows(2) {
            let mid = 0.5 * (w[0] + w[1]);
            if !shape.contains(add(origin, scale(dir, mid))) {
                continue;
            }
            match intervals.last_mut() {
                Some(last) if (last.1 - w[0]).abs() < 1e-12 => last.1 = w[1],
                _ => intervals.push((w[0], w[1])),
            }
        }
        Some(intervals)
    }

    /// Distance below `point` (measured against `normal`) to the first material.
    ///
    /// Positive when the surface is recessed, negative when material stands
    /// proud of `point`, `None` when the probe never meets material. The probe
    /// starts `reach` above `point` and travels `2 * reach`.
    pub fn surface_depth(
        &self,
        solid: &KernelSolidHandle,
        point: [f64; 3],
        normal: [f64; 3],
        reach: f64,
    ) -> Option<f64> {
        let n = normalize(normal)?;
        let origin = add(point, scale(n, reach));
        let intervals = self.ray_intervals(solid, origin, scale(n, -1.0), 2.0 * reach)?;
        intervals.first().map(|(t_in, _)| t_in - reach)
    }

    fn checked_boolean(&mut self) -> Result<(), KernelError> {
        let n = self.boolean_calls;
        self.boolean_calls += 1;
        self.build_calls += 1;
        if self.fail_boolean_at == Some(n) {
            return Err(KernelError::BooleanFailed {
                reason: format!("mock failure injected at boolean #{n}"),
            });
        }
        Ok(())
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_region_face(
        &mut self,
        region: &PlanarRegion,
        plane: &SketchPlane,
    ) -> Result<KernelId, KernelError> {
        self.build_calls += 1;
        if region.rings().any(|r| r.len() < 3) {
            return Err(KernelError::InvalidProfile {
                reason: "ring has fewer than 3 points".to_string(),
            });
        }
        if region.area() <= EPS {
            return Err(KernelError::InvalidProfile {
                reason: "region encloses no area".to_string(),
            });
        }
        let id = KernelId(self.alloc_id());
        self.standalone_faces
            .insert(id.0, (region.clone(), *plane));
        Ok(id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.build_calls += 1;
        let (region, plane) = self
            .standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        let direction = normalize(direction).ok_or_else(|| KernelError::Other {
            message: "extrude direction has zero length".to_string(),
        })?;
        if !(depth > 0.0 && depth.is_finite()) {
            return Err(KernelError::Other {
                message: format!("extrude depth must be positive, got {depth}"),
            });
        }
        if dot(direction, plane.normal).abs() < EPS {
            return Err(KernelError::InvalidProfile {
                reason: "extrude direction lies in the face plane".to_string(),
            });
        }
        Ok(self.store(MockShape::Prism {
            plane,
            region,
            direction,
            depth,
        }))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.checked_boolean()?;
        let (sa, sb) = (self.shape(a)?, self.shape(b)?);
        Ok(self.store(MockShape::Union(sa, sb)))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.checked_boolean()?;
        let (sa, sb) = (self.shape(a)?, self.shape(b)?);
        Ok(self.store(MockShape::Difference(sa, sb)))
    }

    fn release(&mut self, solid: &KernelSolidHandle) {
        self.solids.remove(&solid.id());
        self.faces.retain(|_, f| f.solid != solid.id());
    }
}

impl KernelIntrospect for MockKernel {
    fn is_planar(&self, face: FaceId) -> Result<bool, KernelError> {
        self.faces
            .get(&face.0)
            .map(|f| f.planar)
            .ok_or(KernelError::FaceNotFound { face })
    }

    fn face_frame(&self, face: FaceId) -> Result<FaceFrame, KernelError> {
        let f = self
            .faces
            .get(&face.0)
            .ok_or(KernelError::FaceNotFound { face })?;
        if !f.planar {
            return Err(KernelError::NotSupported {
                operation: "face_frame on a non-planar face".to_string(),
            });
        }
        Ok(f.frame)
    }

    fn list_faces(&self, solid: &KernelSolidHandle) -> Vec<FaceId> {
        self.faces
            .iter()
            .filter(|(_, f)| f.solid == solid.id())
            .map(|(id, _)| FaceId(*id))
            .collect()
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Option<BoundingBox> {
        self.solids.get(&solid.id())?.bounds()
    }
}
