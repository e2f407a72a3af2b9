//! Footprint isolation between logo layers.
//!
//! Subtraction is order independent, so "the shallowest cut wins" cannot come
//! from cut ordering alone. Each layer keeps only the part of its footprint
//! that no shallower layer covers; the circle keeps what no decorative layer covers.

use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};
use relief_types::{signed_area, DepthPlan, Layer, LayerKind, PlanarRegion, Point2};
use tracing::debug;

/// A layer's footprint after isolation, ready for extrusion.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedLayer {
    pub layer: Layer,
    pub depth: f64,
    /// Disjoint pieces; each may have holes. Empty when fully covered.
    pub regions: Vec<PlanarRegion>,
}

fn ring_to_linestring(ring: &[Point2]) -> LineString<f64> {
    LineString::from(ring.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
}

pub fn to_multipolygon(region: &PlanarRegion) -> MultiPolygon<f64> {
    let polygon = Polygon::new(
        ring_to_linestring(&region.outer),
        region.holes.iter().map(|h| ring_to_linestring(h)).collect(),
    );
    MultiPolygon::new(vec![polygon])
}

fn linestring_to_ring(ls: &LineString<f64>) -> Vec<Point2> {
    let mut ring: Vec<Point2> = ls.coords().map(|c| Point2::new(c.x, c.y)).collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Split a multipolygon into regions, dropping pieces and holes below `min_area`.
pub fn from_multipolygon(mp: &MultiPolygon<f64>, min_area: f64) -> Vec<PlanarRegion> {
    mp.0.iter()
        .filter(|poly| poly.unsigned_area() >= min_area)
        .map(|poly| {
            let holes = poly
                .interiors()
                .iter()
                .map(linestring_to_ring)
                .filter(|h| h.len() >= 3 && signed_area(h).abs() >= min_area)
                .collect();
            PlanarRegion::new(linestring_to_ring(poly.exterior()), holes)
        })
        .filter(|region| region.outer.len() >= 3)
        .collect()
}

/// Isolate every layer of `plan` that has a footprint.
///
/// Decorative footprints are first clipped to the circle. A layer then loses
/// whatever any shallower layer covers; at equal depth the later layer wins.
pub fn isolate_layers(
    plan: &DepthPlan,
    footprints: &[(LayerKind, PlanarRegion)],
    min_area: f64,
) -> Vec<IsolatedLayer> {
    let footprint = |kind: LayerKind| footprints.iter().find(|(k, _)| *k == kind).map(|(_, r)| r);
    let container = footprint(LayerKind::Circle).map(to_multipolygon);

    let shapes: Vec<(Layer, f64, MultiPolygon<f64>)> = plan
        .layers
        .iter()
        .filter_map(|layer| {
            let mut mp = to_multipolygon(footprint(layer.kind)?);
            if layer.kind != LayerKind::Circle {
                if let Some(circle) = &container {
                    mp = mp.intersection(circle);
                }
            }
            Some((*layer, plan.absolute_depth(layer), mp))
        })
        .collect();

    shapes
        .iter()
        .enumerate()
        .map(|(i, (layer, depth, mp))| {
            let mut own = mp.clone();
            for (j, (_, other_depth, other)) in shapes.iter().enumerate() {
                let shallower = *other_depth < *depth || (*other_depth == *depth && j > i);
                if j != i && shallower {
                    own = own.difference(other);
                }
            }
            let regions = from_multipolygon(&own, min_area);
            debug!(layer = %layer.kind, depth, pieces = regions.len(), "layer isolated");
            IsolatedLayer {
                layer: *layer,
                depth: *depth,
                regions,
            }
        })
        .collect()
}
