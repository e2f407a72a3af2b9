//! The four-layer logo silhouette.
//!
//! Shapes are authored in a 48×48 artwork frame (y down) around a circle of
//! diameter 44. They are converted once to plane-local millimetres at the
//! canonical diameter and then scaled uniformly to the requested size.

use std::f64::consts::PI;

use relief_types::{quad_point, Contour, Flattening, LayerKind, Outline, Point2};
use tracing::debug;

use crate::types::ReliefError;

pub const ARTWORK_CENTER: Point2 = Point2::new(24.0, 24.0);
pub const CANONICAL_DIAMETER: f64 = 44.0;
/// Chords per semicircular stroke end cap.
pub const CAP_SEGMENTS: usize = 8;

enum StrokePath {
    /// Chained quadratic beziers `[start, ctrl, end]`.
    Beziers(&'static [[(f64, f64); 3]]),
    Polyline(&'static [(f64, f64)]),
}

enum Artwork {
    Disc { center: (f64, f64), radius: f64 },
    Polygon(&'static [(f64, f64)]),
    Stroke { path: StrokePath, width: f64 },
}

struct LayerEntry {
    kind: LayerKind,
    artwork: Artwork,
    default_fraction: f64,
}

static LOGO_TABLE: [LayerEntry; 4] = [
    LayerEntry {
        kind: LayerKind::Circle,
        artwork: Artwork::Disc {
            center: (24.0, 24.0),
            radius: 22.0,
        },
        default_fraction: 1.0,
    },
    LayerEntry {
        kind: LayerKind::Mountain,
        artwork: Artwork::Polygon(&[(6.0, 36.0), (16.0, 14.0), (22.0, 22.0), (32.0, 8.0), (42.0, 36.0)]),
        default_fraction: 0.55,
    },
    LayerEntry {
        kind: LayerKind::Trail,
        artwork: Artwork::Stroke {
            path: StrokePath::Beziers(&[
                [(10.0, 32.0), (16.0, 26.0), (22.0, 30.0)],
                [(22.0, 30.0), (28.0, 34.0), (34.0, 28.0)],
                [(34.0, 28.0), (38.0, 24.0), (42.0, 26.0)],
            ]),
            width: 3.0,
        },
        default_fraction: 0.30,
    },
    LayerEntry {
        kind: LayerKind::Bolt,
        artwork: Artwork::Stroke {
            path: StrokePath::Polyline(&[(34.0, 14.0), (38.0, 22.0), (32.0, 22.0), (36.0, 32.0)]),
            width: 2.5,
        },
        default_fraction: 0.15,
    },
];

/// One logo layer's outline in plane-local millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoLayer {
    pub kind: LayerKind,
    pub outline: Outline,
    pub default_fraction: f64,
}

/// Artwork coordinates to plane-local ones: centred, y up.
pub fn svg_to_local(p: Point2) -> Point2 {
    Point2::new(p.x - ARTWORK_CENTER.x, -(p.y - ARTWORK_CENTER.y))
}

fn local(p: (f64, f64)) -> Point2 {
    svg_to_local(Point2::new(p.0, p.1))
}

/// Closed outline of a centreline stroked at `width`, with round end caps.
///
/// Each point is offset along the normal of its central-difference tangent.
/// Points whose tangent vanishes are skipped. The ring runs along the left
/// side, around the end cap, back along the right side and around the start cap.
pub fn stroke_outline(points: &[Point2], width: f64) -> Vec<Point2> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    let hw = width / 2.0;
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    let mut spine = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = if i == 0 {
            (points[0], points[1])
        } else if i == n - 1 {
            (points[n - 2], points[n - 1])
        } else {
            (points[i - 1], points[i + 1])
        };
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = dx.hypot(dy);
        if len < 1e-12 {
            continue;
        }
        let (dx, dy) = (dx / len, dy / len);
        let p = points[i];
        left.push(Point2::new(p.x - dy * hw, p.y + dx * hw));
        right.push(Point2::new(p.x + dy * hw, p.y - dx * hw));
        spine.push((p, dx, dy));
    }
    let (Some(&(first, sx, sy)), Some(&(last, ex, ey))) = (spine.first(), spine.last()) else {
        return Vec::new();
    };

    let cap = |center: Point2, dx: f64, dy: f64, start: f64| {
        (1..CAP_SEGMENTS).map(move |i| {
            let (s, c) = (start + PI * i as f64 / CAP_SEGMENTS as f64).sin_cos();
            Point2::new(
                center.x + hw * (dx * c + dy * s),
                center.y + hw * (dy * c - dx * s),
            )
        })
    };

    let mut ring = left;
    ring.extend(cap(last, ex, ey, -PI / 2.0));
    ring.extend(right.into_iter().rev());
    ring.extend(cap(first, sx, sy, PI / 2.0));
    ring
}

fn sample_beziers(pieces: &[[(f64, f64); 3]], segments: usize) -> Vec<Point2> {
    let segments = segments.max(1);
    let mut pts = Vec::with_capacity(pieces.len() * segments + 1);
    for (k, [p0, p1, p2]) in pieces.iter().enumerate() {
        // Consecutive pieces share their join point.
        let first = if k == 0 { 0 } else { 1 };
        for i in first..=segments {
            let t = i as f64 / segments as f64;
            pts.push(quad_point(local(*p0), local(*p1), local(*p2), t));
        }
    }
    pts
}

fn build_outline(artwork: &Artwork, res: &Flattening) -> Outline {
    match artwork {
        Artwork::Disc { center, radius } => Outline::new(Contour::circle(local(*center), *radius)),
        Artwork::Polygon(points) => {
            let pts: Vec<Point2> = points.iter().copied().map(local).collect();
            Outline::new(Contour::polygon(&pts))
        }
        Artwork::Stroke { path, width } => {
            let centreline = match path {
                StrokePath::Beziers(pieces) => sample_beziers(pieces, res.bezier_segments),
                StrokePath::Polyline(points) => points.iter().copied().map(local).collect(),
            };
            Outline::new(Contour::polygon(&stroke_outline(&centreline, *width)))
        }
    }
}

/// All four layers at the canonical diameter, in table order.
pub fn canonical_logo(res: &Flattening) -> Vec<LogoLayer> {
    LOGO_TABLE
        .iter()
        .map(|entry| LogoLayer {
            kind: entry.kind,
            outline: build_outline(&entry.artwork, res),
            default_fraction: entry.default_fraction,
        })
        .collect()
}

/// All four layers scaled so the circle has the given diameter.
pub fn logo_outlines(diameter: f64, res: &Flattening) -> Result<Vec<LogoLayer>, ReliefError> {
    if !(diameter > 0.0 && diameter.is_finite()) {
        return Err(ReliefError::invalid(
            "diameter",
            format!("must be positive and finite, got {diameter}"),
        ));
    }
    let scale = diameter / CANONICAL_DIAMETER;
    debug!(diameter, scale, "scaling logo outlines");
    Ok(canonical_logo(res)
        .into_iter()
        .map(|layer| LogoLayer {
            outline: layer.outline.scaled(scale),
            ..layer
        })
        .collect())
}
