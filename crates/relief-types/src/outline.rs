use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Points closer than this are treated as the same point when closing loops.
pub const CLOSURE_TOLERANCE: f64 = 1e-9;

/// A point in plane-local (U, V) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }

    pub fn distance_to(self, other: Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate about `center` by `angle` radians (counter-clockwise).
    pub fn rotated_about(self, center: Point2, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self::new(center.x + dx * c - dy * s, center.y + dx * s + dy * c)
    }
}

/// One piece of a contour. Each segment continues from the end of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    Line { to: Point2 },
    /// Circular arc about `center`; positive `sweep` (radians) is counter-clockwise.
    Arc { center: Point2, sweep: f64 },
    QuadBezier { ctrl: Point2, to: Point2 },
}

/// How finely curved segments are approximated by polylines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flattening {
    /// Chords per full turn of an arc.
    pub arc_segments: usize,
    /// Chords per quadratic bezier.
    pub bezier_segments: usize,
}

impl Default for Flattening {
    fn default() -> Self {
        Self {
            arc_segments: 96,
            bezier_segments: 20,
        }
    }
}

/// A closed loop of path segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub start: Point2,
    pub segments: Vec<Segment>,
}

impl Contour {
    pub fn new(start: Point2) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// Closed polygon through `points`, with a final edge back to the first point.
    pub fn polygon(points: &[Point2]) -> Self {
        let Some(&first) = points.first() else {
            return Self::new(Point2::new(0.0, 0.0));
        };
        let mut segments: Vec<Segment> = points[1..]
            .iter()
            .map(|&to| Segment::Line { to })
            .collect();
        segments.push(Segment::Line { to: first });
        Self {
            start: first,
            segments,
        }
    }

    pub fn circle(center: Point2, radius: f64) -> Self {
        Self {
            start: Point2::new(center.x + radius, center.y),
            segments: vec![Segment::Arc { center, sweep: TAU }],
        }
    }

    pub fn rectangle(min: Point2, max: Point2) -> Self {
        Self::polygon(&[
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    pub fn line_to(mut self, to: Point2) -> Self {
        self.segments.push(Segment::Line { to });
        self
    }

    pub fn quad_to(mut self, ctrl: Point2, to: Point2) -> Self {
        self.segments.push(Segment::QuadBezier { ctrl, to });
        self
    }

    pub fn arc_about(mut self, center: Point2, sweep: f64) -> Self {
        self.segments.push(Segment::Arc { center, sweep });
        self
    }

    pub fn end_point(&self) -> Point2 {
        self.segments
            .iter()
            .fold(self.start, |from, seg| segment_end(from, seg))
    }

    pub fn is_closed(&self) -> bool {
        !self.segments.is_empty() && self.end_point().distance_to(self.start) < CLOSURE_TOLERANCE
    }

    /// Uniformly scale about the plane origin. Arc sweeps are scale invariant.
    pub fn scaled(&self, s: f64) -> Self {
        Self {
            start: self.start.scaled(s),
            segments: self
                .segments
                .iter()
                .map(|seg| match *seg {
                    Segment::Line { to } => Segment::Line { to: to.scaled(s) },
                    Segment::Arc { center, sweep } => Segment::Arc {
                        center: center.scaled(s),
                        sweep,
                    },
                    Segment::QuadBezier { ctrl, to } => Segment::QuadBezier {
                        ctrl: ctrl.scaled(s),
                        to: to.scaled(s),
                    },
                })
                .collect(),
        }
    }

    /// Polyline approximation. The closing point is not repeated.
    pub fn flatten(&self, res: &Flattening) -> Vec<Point2> {
        let mut pts = vec![self.start];
        let mut from = self.start;
        for seg in &self.segments {
            match *seg {
                Segment::Line { to } => pts.push(to),
                Segment::Arc { center, sweep } => {
                    let n = ((sweep.abs() / TAU) * res.arc_segments as f64).ceil().max(1.0) as usize;
                    for i in 1..=n {
                        let t = sweep * i as f64 / n as f64;
                        pts.push(from.rotated_about(center, t));
                    }
                }
                Segment::QuadBezier { ctrl, to } => {
                    let n = res.bezier_segments.max(1);
                    for i in 1..=n {
                        pts.push(quad_point(from, ctrl, to, i as f64 / n as f64));
                    }
                }
            }
            from = segment_end(from, seg);
        }
        while pts.len() > 1 {
            let last = pts[pts.len() - 1];
            if last.distance_to(self.start) < CLOSURE_TOLERANCE {
                pts.pop();
            } else {
                break;
            }
        }
        pts
    }
}

fn segment_end(from: Point2, seg: &Segment) -> Point2 {
    match *seg {
        Segment::Line { to } | Segment::QuadBezier { to, .. } => to,
        Segment::Arc { center, sweep } => from.rotated_about(center, sweep),
    }
}

/// Point on a quadratic bezier at parameter `t`.
pub fn quad_point(p0: Point2, p1: Point2, p2: Point2, t: f64) -> Point2 {
    let u = 1.0 - t;
    Point2::new(
        u * u * p0.x + 2.0 * u * t * p1.x + t * t * p2.x,
        u * u * p0.y + 2.0 * u * t * p1.y + t * t * p2.y,
    )
}

/// A closed outer boundary with optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub outer: Contour,
    #[serde(default)]
    pub holes: Vec<Contour>,
}

impl Outline {
    pub fn new(outer: Contour) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Contour) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.outer.is_closed() && self.holes.iter().all(Contour::is_closed)
    }

    pub fn scaled(&self, s: f64) -> Self {
        Self {
            outer: self.outer.scaled(s),
            holes: self.holes.iter().map(|h| h.scaled(s)).collect(),
        }
    }

    pub fn flatten(&self, res: &Flattening) -> PlanarRegion {
        PlanarRegion::new(
            self.outer.flatten(res),
            self.holes.iter().map(|h| h.flatten(res)).collect(),
        )
    }
}

/// A flattened outline: outer ring counter-clockwise, hole rings clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarRegion {
    pub outer: Vec<Point2>,
    #[serde(default)]
    pub holes: Vec<Vec<Point2>>,
}

impl PlanarRegion {
    /// Build a region, normalizing ring orientation.
    pub fn new(mut outer: Vec<Point2>, holes: Vec<Vec<Point2>>) -> Self {
        if signed_area(&outer) < 0.0 {
            outer.reverse();
        }
        let holes = holes
            .into_iter()
            .map(|mut h| {
                if signed_area(&h) > 0.0 {
                    h.reverse();
                }
                h
            })
            .collect();
        Self { outer, holes }
    }

    pub fn rectangle(min: Point2, max: Point2) -> Self {
        Self::new(
            vec![
                min,
                Point2::new(max.x, min.y),
                max,
                Point2::new(min.x, max.y),
            ],
            Vec::new(),
        )
    }

    pub fn rings(&self) -> impl Iterator<Item = &Vec<Point2>> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Enclosed area: outer minus holes.
    pub fn area(&self) -> f64 {
        signed_area(&self.outer).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f64>()
    }

    /// Even-odd containment over all rings.
    pub fn contains(&self, p: Point2) -> bool {
        self.rings().filter(|r| ring_contains(r, p)).count() % 2 == 1
    }

    pub fn bounds(&self) -> Option<(Point2, Point2)> {
        let first = *self.outer.first()?;
        Some(self.outer.iter().fold((first, first), |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

/// Shoelace area; positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point2]) -> f64 {
    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i].x * ring[j].y;
        area -= ring[j].x * ring[i].y;
    }
    area / 2.0
}

/// Crossing-number point-in-ring test.
pub fn ring_contains(ring: &[Point2], p: Point2) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when two non-adjacent edges of the ring properly cross.
pub fn ring_self_intersects(ring: &[Point2]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn orient(a: Point2, b: Point2, c: Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(p1: Point2, p2: Point2, p3: Point2, p4: Point2) -> bool {
    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);
    let eps = 1e-12;
    if d1.abs() < eps || d2.abs() < eps || d3.abs() < eps || d4.abs() < eps {
        return false;
    }
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0)
}
