//! Higher-level primitive builders on top of truck's sweep API.
//!
//! truck has no built-in box, so blocks are successive sweeps of a vertex.

use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{Point3, Vector3};

/// Axis-aligned block spanning `min` to `max`. Every extent must be positive.
pub fn make_block(min: [f64; 3], max: [f64; 3]) -> Solid {
    let v = builder::vertex(Point3::new(min[0], min[1], min[2]));
    let edge = builder::tsweep(&v, Vector3::new(max[0] - min[0], 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, max[1] - min[1], 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, max[2] - min[2]))
}
