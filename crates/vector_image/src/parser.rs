//! The SVG parser interface and its default implementation on top of usvg.

use crate::document::{RawDocument, RawPaint, RawPaintKind, RawPath, RawShape, MAX_DASHES};
use crate::edge::extract_edges;
use crate::error::ParseError;
use crate::math::Box2D;
use crate::tessellation::{FillRule, LineCap, LineJoin};

use std::ffi::CStr;
use std::fmt;
use std::str::FromStr;

/// The unit in which the parser expresses coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Units {
    #[default]
    Px,
    Pt,
    Pc,
    Mm,
    Cm,
    In,
}

impl Units {
    /// Number of pixels in one unit at a given resolution.
    pub fn pixels_per_unit(self, dpi: f32) -> f32 {
        match self {
            Units::Px => 1.0,
            Units::Pt => dpi / 72.0,
            Units::Pc => dpi / 6.0,
            Units::Mm => dpi / 25.4,
            Units::Cm => dpi / 2.54,
            Units::In => dpi,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Units::Px => "px",
            Units::Pt => "pt",
            Units::Pc => "pc",
            Units::Mm => "mm",
            Units::Cm => "cm",
            Units::In => "in",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = ParseError;

    fn from_str(src: &str) -> Result<Self, ParseError> {
        match src {
            "px" => Ok(Units::Px),
            "pt" => Ok(Units::Pt),
            "pc" => Ok(Units::Pc),
            "mm" => Ok(Units::Mm),
            "cm" => Ok(Units::Cm),
            "in" => Ok(Units::In),
            _ => Err(ParseError::new(format!("Unknown unit {src:?}"))),
        }
    }
}

/// Turns NUL-terminated SVG text into a [`RawDocument`].
///
/// Implementations must emit every segment in cubic form: lines as
/// `(from, from, to, to)` and quadratic curves as `(from, from, ctrl, to)`.
pub trait SvgParser {
    fn parse(&mut self, text: &CStr, units: Units, dpi: f32) -> Result<RawDocument, ParseError>;
}

impl<'l, P: SvgParser + ?Sized> SvgParser for &'l mut P {
    fn parse(&mut self, text: &CStr, units: Units, dpi: f32) -> Result<RawDocument, ParseError> {
        (**self).parse(text, units, dpi)
    }
}

/// The default parser, backed by usvg.
///
/// Accepts plain and gzip-compressed SVG. Transforms are applied to the
/// geometry, text and raster images are skipped.
#[derive(Copy, Clone, Debug, Default)]
pub struct UsvgParser;

impl UsvgParser {
    pub fn new() -> Self {
        UsvgParser
    }
}

impl SvgParser for UsvgParser {
    fn parse(&mut self, text: &CStr, units: Units, dpi: f32) -> Result<RawDocument, ParseError> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(ParseError::new(format!("Invalid resolution {dpi} dpi")));
        }

        let mut options = usvg::Options::default();
        options.dpi = dpi;

        let tree = usvg::Tree::from_data(text.to_bytes(), &options)
            .map_err(|err| ParseError::new(err.to_string()))?;

        let unit = units.pixels_per_unit(dpi);
        let size = tree.size();
        let mut document = RawDocument::new(size.width() / unit, size.height() / unit);

        collect_shapes(tree.root(), "", unit, &mut document.shapes);

        log::debug!(
            "Parsed a {}x{}{} document with {} shapes",
            document.width,
            document.height,
            units,
            document.shapes.len(),
        );

        Ok(document)
    }
}

// `unit` is the number of pixels per output unit.
fn collect_shapes(group: &usvg::Group, group_id: &str, unit: f32, shapes: &mut Vec<RawShape>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(child) => {
                let id = if child.id().is_empty() {
                    group_id
                } else {
                    child.id()
                };
                collect_shapes(child, id, unit, shapes);
            }
            usvg::Node::Path(path) => {
                if let Some(shape) = convert_path(path, group_id, unit) {
                    shapes.push(shape);
                }
            }
            usvg::Node::Image(_) => {
                log::debug!("Skipping image {:?}", node.id());
            }
            usvg::Node::Text(_) => {
                log::debug!("Skipping text {:?}", node.id());
            }
        }
    }
}

// Emits the geometry of a usvg path in cubic form, one sub-path per move-to.
struct Lowering {
    transform: usvg::Transform,
    unit: f32,
    paths: Vec<RawPath>,
    current: Option<RawPath>,
    first: (f32, f32),
    last: (f32, f32),
    bounds: Option<Box2D>,
}

impl Lowering {
    fn new(transform: usvg::Transform, unit: f32) -> Self {
        Lowering {
            transform,
            unit,
            paths: Vec::new(),
            current: None,
            first: (0.0, 0.0),
            last: (0.0, 0.0),
            bounds: None,
        }
    }

    fn map(&self, p: usvg::tiny_skia_path::Point) -> (f32, f32) {
        let t = &self.transform;
        (
            (t.sx * p.x + t.kx * p.y + t.tx) / self.unit,
            (t.ky * p.x + t.sy * p.y + t.ty) / self.unit,
        )
    }

    fn push(&mut self, p: (f32, f32)) {
        if let Some(path) = &mut self.current {
            path.points.push(p.0);
            path.points.push(p.1);
        }
    }

    fn begin(&mut self, at: (f32, f32)) {
        self.flush();
        self.current = Some(RawPath::default());
        self.first = at;
        self.last = at;
        self.push(at);
    }

    // Segments following a close continue from the closing point.
    fn ensure_open(&mut self) {
        let reopen = match &self.current {
            Some(path) => path.closed,
            None => true,
        };
        if reopen {
            self.begin(self.last);
        }
    }

    fn line_to(&mut self, to: (f32, f32)) {
        self.ensure_open();
        let from = self.last;
        self.push(from);
        self.push(to);
        self.push(to);
        self.last = to;
    }

    fn quadratic_to(&mut self, ctrl: (f32, f32), to: (f32, f32)) {
        self.ensure_open();
        let from = self.last;
        self.push(from);
        self.push(ctrl);
        self.push(to);
        self.last = to;
    }

    fn cubic_to(&mut self, ctrl1: (f32, f32), ctrl2: (f32, f32), to: (f32, f32)) {
        self.ensure_open();
        self.push(ctrl1);
        self.push(ctrl2);
        self.push(to);
        self.last = to;
    }

    fn close(&mut self) {
        let open = match &self.current {
            Some(path) => !path.closed,
            None => false,
        };
        if !open {
            return;
        }
        if self.last != self.first {
            self.line_to(self.first);
        }
        if let Some(path) = &mut self.current {
            path.closed = true;
        }
        self.last = self.first;
    }

    // Sub-paths without a single edge are dropped.
    fn flush(&mut self) {
        if let Some(path) = self.current.take() {
            if path.num_points() >= 4 {
                for edge in extract_edges(&path.points) {
                    let edge_bounds = edge.to_segment().bounding_box();
                    self.bounds = Some(match self.bounds {
                        Some(bounds) => bounds.union(&edge_bounds),
                        None => edge_bounds,
                    });
                }
                self.paths.push(path);
            }
        }
    }

    fn bounds(&self) -> [f32; 4] {
        match self.bounds {
            Some(b) => [b.min.x, b.min.y, b.width(), b.height()],
            None => [0.0; 4],
        }
    }
}

fn convert_path(path: &usvg::Path, group_id: &str, unit: f32) -> Option<RawShape> {
    use usvg::tiny_skia_path::PathSegment;

    let transform = path.abs_transform();
    let mut lowering = Lowering::new(transform, unit);
    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(at) => {
                let at = lowering.map(at);
                lowering.begin(at);
            }
            PathSegment::LineTo(to) => {
                let to = lowering.map(to);
                lowering.line_to(to);
            }
            PathSegment::QuadTo(ctrl, to) => {
                let ctrl = lowering.map(ctrl);
                let to = lowering.map(to);
                lowering.quadratic_to(ctrl, to);
            }
            PathSegment::CubicTo(ctrl1, ctrl2, to) => {
                let ctrl1 = lowering.map(ctrl1);
                let ctrl2 = lowering.map(ctrl2);
                let to = lowering.map(to);
                lowering.cubic_to(ctrl1, ctrl2, to);
            }
            PathSegment::Close => {
                lowering.close();
            }
        }
    }
    lowering.flush();

    if lowering.paths.is_empty() {
        log::debug!("Skipping empty path {:?}", path.id());
        return None;
    }

    let mut shape = RawShape::new();

    let id = if path.id().is_empty() {
        group_id
    } else {
        path.id()
    };
    if !shape.set_id(id) {
        log::warn!("Truncated shape id {:?}", id);
    }

    shape.flags = if path.is_visible() {
        crate::document::FLAGS_VISIBLE
    } else {
        0
    };
    shape.bounds = lowering.bounds();

    if let Some(fill) = path.fill() {
        shape.fill = convert_paint(fill.paint(), fill.opacity().get());
        shape.fill_rule = match fill.rule() {
            usvg::FillRule::NonZero => FillRule::NonZero,
            usvg::FillRule::EvenOdd => FillRule::EvenOdd,
        };
    }

    if let Some(stroke) = path.stroke() {
        let stroke_scale = average_scale(&transform) / unit;
        shape.stroke = convert_paint(stroke.paint(), stroke.opacity().get());
        shape.stroke_width = stroke.width().get() * stroke_scale;
        shape.miter_limit = stroke.miterlimit().get();
        shape.stroke_line_cap = match stroke.linecap() {
            usvg::LineCap::Butt => LineCap::Butt,
            usvg::LineCap::Square => LineCap::Square,
            usvg::LineCap::Round => LineCap::Round,
        };
        shape.stroke_line_join = match stroke.linejoin() {
            usvg::LineJoin::Miter => LineJoin::Miter,
            usvg::LineJoin::MiterClip => LineJoin::MiterClip,
            usvg::LineJoin::Bevel => LineJoin::Bevel,
            usvg::LineJoin::Round => LineJoin::Round,
        };
        if let Some(dashes) = stroke.dasharray() {
            let count = dashes.len().min(MAX_DASHES);
            for (dst, src) in shape.stroke_dash_array.iter_mut().zip(dashes) {
                *dst = src * stroke_scale;
            }
            shape.stroke_dash_count = count as u8;
            shape.stroke_dash_offset = stroke.dashoffset() * stroke_scale;
        }
    }

    shape.paths = lowering.paths;

    Some(shape)
}

fn convert_paint(paint: &usvg::Paint, opacity: f32) -> RawPaint {
    match paint {
        usvg::Paint::Color(c) => {
            let alpha = (opacity * 255.0).round().clamp(0.0, 255.0) as u32;
            RawPaint::color(
                c.red as u32 | (c.green as u32) << 8 | (c.blue as u32) << 16 | alpha << 24,
            )
        }
        usvg::Paint::LinearGradient(_) => RawPaint {
            kind: RawPaintKind::LinearGradient,
            color: 0,
        },
        usvg::Paint::RadialGradient(_) => RawPaint {
            kind: RawPaintKind::RadialGradient,
            color: 0,
        },
        usvg::Paint::Pattern(_) => RawPaint::NONE,
    }
}

fn average_scale(t: &usvg::Transform) -> f32 {
    let sx = (t.sx * t.sx + t.ky * t.ky).sqrt();
    let sy = (t.kx * t.kx + t.sy * t.sy).sqrt();
    (sx + sy) * 0.5
}

#[cfg(test)]
fn parse_str(src: &str, units: Units) -> Result<RawDocument, ParseError> {
    let text = std::ffi::CString::new(src).unwrap();
    UsvgParser::new().parse(&text, units, 96.0)
}

#[test]
fn units() {
    assert_eq!("mm".parse::<Units>(), Ok(Units::Mm));
    assert_eq!("in".parse::<Units>(), Ok(Units::In));
    assert!("furlong".parse::<Units>().is_err());
    assert_eq!(Units::Pt.to_string(), "pt");
    assert_eq!(Units::default(), Units::Px);
    assert_eq!(Units::Px.pixels_per_unit(96.0), 1.0);
    assert_eq!(Units::In.pixels_per_unit(96.0), 96.0);
    assert_eq!(Units::Pt.pixels_per_unit(72.0), 1.0);
}

#[test]
fn cubic_layout() {
    let document = parse_str(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
            <path id="shape" fill="#3333F8" d="M10 20 L110 20 Q110 70 60 70 C40 70 10 50 10 40 Z"/>
        </svg>"##,
        Units::Px,
    )
    .unwrap();

    assert_eq!(document.width, 200.0);
    assert_eq!(document.height, 100.0);
    assert_eq!(document.shapes.len(), 1);

    let shape = &document.shapes[0];
    assert_eq!(shape.id_bytes(), Some(&b"shape"[..]));
    assert!(shape.is_visible());
    assert_eq!(shape.fill, RawPaint::color(0xFFF8_3333));
    assert_eq!(shape.stroke.kind, RawPaintKind::None);
    assert_eq!(shape.paths.len(), 1);

    let path = &shape.paths[0];
    assert!(path.closed);
    #[rustfmt::skip]
    let expected: &[f32] = &[
        10.0, 20.0,
        // line
        10.0, 20.0, 110.0, 20.0, 110.0, 20.0,
        // quadratic
        110.0, 20.0, 110.0, 70.0, 60.0, 70.0,
        // cubic
        40.0, 70.0, 10.0, 50.0, 10.0, 40.0,
        // closing line
        10.0, 40.0, 10.0, 20.0, 10.0, 20.0,
    ];
    assert_eq!(&path.points[..], expected);
    assert_eq!(shape.bounds, [10.0, 20.0, 100.0, 50.0]);
}

#[test]
fn one_path_per_sub_path() {
    let document = parse_str(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <path fill="black" d="M0 0 L10 0 L10 10 Z M20 20 L30 20 L30 30 Z M50 50"/>
        </svg>"##,
        Units::Px,
    )
    .unwrap();

    let shape = &document.shapes[0];
    assert_eq!(shape.paths.len(), 2);
    assert_eq!(shape.paths[1].points[..2], [20.0, 20.0]);
}

#[test]
fn strokes_and_transforms() {
    let document = parse_str(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <g id="layer" transform="translate(5 5) scale(2)">
                <path fill="none" stroke="#ff0000" stroke-opacity="0.5" stroke-width="3"
                      stroke-linecap="round" stroke-linejoin="bevel" stroke-miterlimit="6"
                      stroke-dasharray="2 1" d="M0 0 L10 0"/>
            </g>
        </svg>"##,
        Units::Px,
    )
    .unwrap();

    let shape = &document.shapes[0];
    assert_eq!(shape.id_bytes(), Some(&b"layer"[..]));
    assert_eq!(shape.fill.kind, RawPaintKind::None);
    assert_eq!(shape.stroke, RawPaint::color(0x8000_00FF));
    assert_eq!(shape.stroke_width, 6.0);
    assert_eq!(shape.miter_limit, 6.0);
    assert_eq!(shape.stroke_line_cap, LineCap::Round);
    assert_eq!(shape.stroke_line_join, LineJoin::Bevel);
    assert_eq!(shape.dashes(), &[4.0, 2.0]);
    assert_eq!(&shape.paths[0].points[..2], &[5.0, 5.0]);
    assert_eq!(&shape.paths[0].points[6..], &[25.0, 5.0]);
    assert!(!shape.paths[0].closed);
}

#[test]
fn unit_conversion() {
    let document = parse_str(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="192" height="96">
            <path fill="black" d="M0 0 L96 0 L96 48 Z"/>
        </svg>"##,
        Units::In,
    )
    .unwrap();

    assert_eq!(document.width, 2.0);
    assert_eq!(document.height, 1.0);
    assert_eq!(document.shapes[0].bounds, [0.0, 0.0, 1.0, 0.5]);
}

#[test]
fn curve_bounds() {
    fn bounds_of(d: &str) -> [f32; 4] {
        let src = format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200"><path fill="black" d="{d}"/></svg>"##
        );
        parse_str(&src, Units::Px).unwrap().shapes[0].bounds
    }

    fn assert_approx_eq(a: [f32; 4], b: [f32; 4]) {
        for (a, b) in a.iter().zip(b.iter()) {
            assert!((a - b).abs() < 0.001, "{a:?} != {b:?}");
        }
    }

    // Control points lie outside of the curves.
    assert_approx_eq(bounds_of("M0 0 Q50 100 100 0 Z"), [0.0, 0.0, 100.0, 50.0]);
    assert_approx_eq(bounds_of("M0 0 C0 100 100 100 100 0 Z"), [0.0, 0.0, 100.0, 75.0]);
    assert_approx_eq(bounds_of("M10 10 L30 10 L30 20 Z"), [10.0, 10.0, 20.0, 10.0]);
}

#[test]
fn invalid_resolution() {
    let text = std::ffi::CString::new(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
    for dpi in [0.0, -96.0, f32::NAN, f32::INFINITY] {
        assert!(UsvgParser::new().parse(&text, Units::Mm, dpi).is_err());
    }
}

#[test]
fn gradients_are_tagged() {
    let document = parse_str(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
            <linearGradient id="grad"><stop offset="0" stop-color="red"/><stop offset="1" stop-color="blue"/></linearGradient>
            <rect width="10" height="10" fill="url(#grad)"/>
        </svg>"##,
        Units::Px,
    )
    .unwrap();

    assert_eq!(document.shapes[0].fill.kind, RawPaintKind::LinearGradient);
}

#[test]
fn invalid_documents() {
    assert!(parse_str("", Units::Px).is_err());
    assert!(parse_str("this is not svg", Units::Px).is_err());
    assert!(parse_str("<svg xmlns=\"http://www.w3.org/2000/svg\"><path", Units::Px).is_err());
}
