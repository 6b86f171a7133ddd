//! Curve extraction from the parser's flat point buffers.
//!
//! The parser always stores curves as cubic béziers. A path made of `n` points
//! holds `(n - 1) / 3` curves: the first point is the start of the path and each
//! curve adds two control points and an endpoint. The endpoint of a curve is the
//! start of the next one.
//!
//! ```ascii
//!  _________________________________________________________________
//! |        |        |        |        |        |        |        |
//! | start  | ctrl1  | ctrl2  |  end   | ctrl1  | ctrl2  |  end   | ...
//! |________|________|________|________|________|________|________|_
//!  \_____________ edge 0 ___________/
//!                            \____________ edge 1 ____________/
//! ```
//!
//! Straight lines and quadratic curves are encoded by collapsing a control point
//! onto an endpoint. [`CurveKind::classify`] recovers the actual order of the curve
//! so that renderers can pick a cheaper primitive.

use crate::geom::{CubicBezierSegment, LineSegment, QuadraticBezierSegment};
use crate::math::{point, Box2D, Point};

use std::iter::FusedIterator;

/// The geometric order of an edge, derived from its control points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum CurveKind {
    /// Both control points sit on the endpoints.
    Line,
    /// `control1` sits on `start`, the curve is a quadratic bézier with `control2`
    /// as control point.
    QuadraticFrom1,
    /// `control2` sits on `end`, the curve is a quadratic bézier with `control1`
    /// as control point.
    QuadraticFrom2,
    Cubic,
}

impl CurveKind {
    /// Infers the order of a cubic bézier curve.
    ///
    /// Comparisons are exact: the parser produces degenerate control points by copying
    /// endpoints, not by computing them.
    #[inline]
    pub fn classify(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        match (start == control1, control2 == end) {
            (true, true) => CurveKind::Line,
            (true, false) => CurveKind::QuadraticFrom1,
            (false, true) => CurveKind::QuadraticFrom2,
            (false, false) => CurveKind::Cubic,
        }
    }

    #[inline]
    pub fn is_quadratic(self) -> bool {
        match self {
            CurveKind::QuadraticFrom1 | CurveKind::QuadraticFrom2 => true,
            _ => false,
        }
    }
}

/// One curve segment of a path, always stored in cubic bézier form.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VectorEdge {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
    pub kind: CurveKind,
}

impl VectorEdge {
    /// Creates an edge and classifies it.
    #[inline]
    pub fn new(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        VectorEdge {
            start,
            control1,
            control2,
            end,
            kind: CurveKind::classify(start, control1, control2, end),
        }
    }

    /// The control point that matters for quadratic edges, `None` for lines
    /// and cubic edges.
    #[inline]
    pub fn quadratic_control(&self) -> Option<Point> {
        match self.kind {
            CurveKind::QuadraticFrom1 => Some(self.control2),
            CurveKind::QuadraticFrom2 => Some(self.control1),
            _ => None,
        }
    }

    /// Converts the edge into the cheapest lyon_geom segment representing it.
    pub fn to_segment(&self) -> EdgeSegment {
        match self.kind {
            CurveKind::Line => EdgeSegment::Line(LineSegment {
                from: self.start,
                to: self.end,
            }),
            CurveKind::QuadraticFrom1 | CurveKind::QuadraticFrom2 => {
                EdgeSegment::Quadratic(QuadraticBezierSegment {
                    from: self.start,
                    ctrl: self.quadratic_control().unwrap_or(self.control1),
                    to: self.end,
                })
            }
            CurveKind::Cubic => EdgeSegment::Cubic(self.to_cubic()),
        }
    }

    /// The edge as stored, ignoring its kind.
    #[inline]
    pub fn to_cubic(&self) -> CubicBezierSegment<f32> {
        CubicBezierSegment {
            from: self.start,
            ctrl1: self.control1,
            ctrl2: self.control2,
            to: self.end,
        }
    }
}

/// A lyon_geom segment matching the kind of a [`VectorEdge`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EdgeSegment {
    Line(LineSegment<f32>),
    Quadratic(QuadraticBezierSegment<f32>),
    Cubic(CubicBezierSegment<f32>),
}

impl EdgeSegment {
    #[inline]
    pub fn from(&self) -> Point {
        match self {
            EdgeSegment::Line(s) => s.from,
            EdgeSegment::Quadratic(s) => s.from,
            EdgeSegment::Cubic(s) => s.from,
        }
    }

    #[inline]
    pub fn to(&self) -> Point {
        match self {
            EdgeSegment::Line(s) => s.to,
            EdgeSegment::Quadratic(s) => s.to,
            EdgeSegment::Cubic(s) => s.to,
        }
    }

    /// Tight bounding box of the curve, control points excluded.
    pub fn bounding_box(&self) -> Box2D {
        match self {
            EdgeSegment::Line(s) => s.bounding_box(),
            EdgeSegment::Quadratic(s) => s.bounding_box(),
            EdgeSegment::Cubic(s) => s.bounding_box(),
        }
    }
}

/// Number of edges in a path of `num_points` points.
///
/// Trailing points that don't complete an edge are ignored.
#[inline]
pub fn num_edges(num_points: usize) -> usize {
    if num_points == 0 {
        return 0;
    }

    (num_points - 1) / 3
}

/// Iterates over the edges of a flat `[x0, y0, x1, y1, ...]` point buffer.
///
/// A trailing odd float is ignored.
#[inline]
pub fn extract_edges(points: &[f32]) -> Edges {
    Edges {
        points,
        idx: 0,
        len: num_edges(points.len() / 2),
    }
}

/// An iterator over the edges of a flat point buffer.
///
/// See [`extract_edges`].
#[derive(Clone)]
pub struct Edges<'l> {
    points: &'l [f32],
    idx: usize,
    len: usize,
}

impl<'l> Edges<'l> {
    #[inline]
    fn edge_at(&self, idx: usize) -> VectorEdge {
        let p = &self.points[idx * 6..idx * 6 + 8];
        VectorEdge::new(
            point(p[0], p[1]),
            point(p[2], p[3]),
            point(p[4], p[5]),
            point(p[6], p[7]),
        )
    }
}

impl<'l> Iterator for Edges<'l> {
    type Item = VectorEdge;

    #[inline]
    fn next(&mut self) -> Option<VectorEdge> {
        if self.idx >= self.len {
            return None;
        }

        let edge = self.edge_at(self.idx);
        self.idx += 1;

        Some(edge)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.idx;
        (remaining, Some(remaining))
    }
}

impl<'l> ExactSizeIterator for Edges<'l> {}
impl<'l> FusedIterator for Edges<'l> {}

#[cfg(test)]
fn flat(points: &[(f32, f32)]) -> Vec<f32> {
    points.iter().flat_map(|&(x, y)| [x, y]).collect()
}

#[test]
fn edge_count() {
    assert_eq!(num_edges(0), 0);
    assert_eq!(num_edges(1), 0);
    assert_eq!(num_edges(3), 0);
    assert_eq!(num_edges(4), 1);
    assert_eq!(num_edges(6), 1);
    assert_eq!(num_edges(7), 2);
    assert_eq!(num_edges(10), 3);

    for n in 0..40 {
        let pts: Vec<f32> = (0..n * 2).map(|i| i as f32).collect();
        assert_eq!(extract_edges(&pts).count(), num_edges(n));
        assert_eq!(extract_edges(&pts).len(), num_edges(n));
    }
}

#[test]
fn empty_buffer() {
    assert_eq!(extract_edges(&[]).next(), None);
    // A lone move-to.
    assert_eq!(extract_edges(&[1.0, 2.0]).next(), None);
}

#[test]
fn consecutive_edges_share_endpoints() {
    let pts = flat(&[
        (0.0, 0.0),
        (1.0, 5.0),
        (2.0, 5.0),
        (3.0, 0.0),
        (4.0, -5.0),
        (5.0, -5.0),
        (6.0, 0.0),
        (6.0, 0.0),
        (9.0, 3.0),
        (9.0, 3.0),
        // Leftover points.
        (42.0, 42.0),
        (43.0, 43.0),
    ]);

    let edges: Vec<VectorEdge> = extract_edges(&pts).collect();
    assert_eq!(edges.len(), 3);
    for pair in edges.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }

    assert_eq!(edges[0].start, point(0.0, 0.0));
    assert_eq!(edges[0].control1, point(1.0, 5.0));
    assert_eq!(edges[0].control2, point(2.0, 5.0));
    assert_eq!(edges[0].end, point(3.0, 0.0));
    assert_eq!(edges[0].kind, CurveKind::Cubic);
    assert_eq!(edges[1].kind, CurveKind::Cubic);
    assert_eq!(edges[2].kind, CurveKind::Line);
    assert_eq!(edges[2].end, point(9.0, 3.0));
}

#[test]
fn classification() {
    let a = point(0.0, 0.0);
    let b = point(1.0, 1.0);
    let c = point(2.0, 1.0);
    let d = point(3.0, 0.0);

    assert_eq!(CurveKind::classify(a, b, c, d), CurveKind::Cubic);
    assert_eq!(CurveKind::classify(a, a, c, d), CurveKind::QuadraticFrom1);
    assert_eq!(CurveKind::classify(a, b, d, d), CurveKind::QuadraticFrom2);
    assert_eq!(CurveKind::classify(a, a, d, d), CurveKind::Line);
    // Fully degenerate.
    assert_eq!(CurveKind::classify(a, a, a, a), CurveKind::Line);
    // Control points matching the opposite endpoint don't count.
    assert_eq!(CurveKind::classify(a, d, a, d), CurveKind::Cubic);
    // Equality is exact on both coordinates.
    assert_eq!(
        CurveKind::classify(a, point(0.0, 1e-6), c, d),
        CurveKind::Cubic
    );
}

#[test]
fn segments() {
    let a = point(0.0, 0.0);
    let b = point(1.0, 1.0);
    let d = point(3.0, 0.0);

    let line = VectorEdge::new(a, a, d, d);
    assert_eq!(
        line.to_segment(),
        EdgeSegment::Line(LineSegment { from: a, to: d })
    );
    assert_eq!(line.quadratic_control(), None);

    let quad1 = VectorEdge::new(a, a, b, d);
    assert_eq!(quad1.quadratic_control(), Some(b));
    assert_eq!(
        quad1.to_segment(),
        EdgeSegment::Quadratic(QuadraticBezierSegment {
            from: a,
            ctrl: b,
            to: d
        })
    );

    let quad2 = VectorEdge::new(a, b, d, d);
    assert!(quad2.kind.is_quadratic());
    assert_eq!(quad2.quadratic_control(), Some(b));

    let cubic = VectorEdge::new(a, b, point(2.0, 1.0), d);
    assert_eq!(cubic.to_segment(), EdgeSegment::Cubic(cubic.to_cubic()));
    assert_eq!(cubic.to_segment().from(), a);
    assert_eq!(cubic.to_segment().to(), d);
}

#[test]
fn segment_bounds() {
    let a = point(0.0, 0.0);
    let d = point(100.0, 0.0);

    // Quadratic with its control point at (50, 100), encoded with a collapsed control.
    let quad = VectorEdge::new(a, a, point(50.0, 100.0), d);
    let bounds = quad.to_segment().bounding_box();
    assert_eq!(bounds.min, a);
    assert!((bounds.max.x - 100.0).abs() < 0.001);
    assert!((bounds.max.y - 50.0).abs() < 0.001);

    let line = VectorEdge::new(point(10.0, 30.0), point(10.0, 30.0), point(-5.0, 2.0), point(-5.0, 2.0));
    let bounds = line.to_segment().bounding_box();
    assert_eq!(bounds.min, point(-5.0, 2.0));
    assert_eq!(bounds.max, point(10.0, 30.0));
}
