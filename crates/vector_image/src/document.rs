//! The parser's output, before it is turned into a [`VectorImage`](crate::VectorImage).
//!
//! The layout follows what SVG parsers in the nanosvg family produce: fixed size
//! NUL-terminated id buffers, packed colors, paint type tags and flat point buffers
//! holding cubic bézier control points. Nothing here is meant to be kept around
//! after loading; the image builder copies what it needs.

use crate::tessellation::{FillRule, LineCap, LineJoin};

/// Size of the id buffer of a shape, including the NUL terminator.
pub const SHAPE_ID_LEN: usize = 64;

/// Maximum number of values in a stroke dash array.
pub const MAX_DASHES: usize = 8;

/// The shape is visible.
pub const FLAGS_VISIBLE: u8 = 0x01;

/// A parsed SVG document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDocument {
    /// Width of the document in the requested units.
    pub width: f32,
    /// Height of the document in the requested units.
    pub height: f32,
    /// Shapes in paint order.
    pub shapes: Vec<RawShape>,
}

impl RawDocument {
    pub fn new(width: f32, height: f32) -> Self {
        RawDocument {
            width,
            height,
            shapes: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawPaintKind {
    None,
    Color,
    LinearGradient,
    RadialGradient,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawPaint {
    pub kind: RawPaintKind,
    /// Packed color, red in the least significant byte.
    pub color: u32,
}

impl RawPaint {
    pub const NONE: Self = RawPaint {
        kind: RawPaintKind::None,
        color: 0,
    };

    #[inline]
    pub const fn color(color: u32) -> Self {
        RawPaint {
            kind: RawPaintKind::Color,
            color,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawShape {
    /// Optional id of the shape or of its group, NUL-terminated.
    pub id: [u8; SHAPE_ID_LEN],
    pub flags: u8,
    /// `[x, y, width, height]`.
    pub bounds: [f32; 4],
    pub fill: RawPaint,
    pub stroke: RawPaint,
    pub stroke_width: f32,
    pub stroke_dash_offset: f32,
    pub stroke_dash_array: [f32; MAX_DASHES],
    pub stroke_dash_count: u8,
    pub stroke_line_join: LineJoin,
    pub stroke_line_cap: LineCap,
    pub miter_limit: f32,
    pub fill_rule: FillRule,
    pub paths: Vec<RawPath>,
}

impl RawShape {
    /// A visible shape with no paint, no id and no paths.
    pub fn new() -> Self {
        RawShape {
            id: [0; SHAPE_ID_LEN],
            flags: FLAGS_VISIBLE,
            bounds: [0.0; 4],
            fill: RawPaint::NONE,
            stroke: RawPaint::NONE,
            stroke_width: 1.0,
            stroke_dash_offset: 0.0,
            stroke_dash_array: [0.0; MAX_DASHES],
            stroke_dash_count: 0,
            stroke_line_join: LineJoin::Miter,
            stroke_line_cap: LineCap::Butt,
            miter_limit: 4.0,
            fill_rule: FillRule::NonZero,
            paths: Vec::new(),
        }
    }

    /// Writes `id` into the id buffer, truncating it on a character boundary so
    /// that the NUL terminator fits.
    ///
    /// Returns `false` if the id had to be truncated.
    pub fn set_id(&mut self, id: &str) -> bool {
        let mut len = id.len().min(SHAPE_ID_LEN - 1);
        while !id.is_char_boundary(len) {
            len -= 1;
        }

        self.id = [0; SHAPE_ID_LEN];
        self.id[..len].copy_from_slice(&id.as_bytes()[..len]);

        len == id.len()
    }

    /// The id up to its NUL terminator, or `None` if the buffer isn't terminated.
    pub fn id_bytes(&self) -> Option<&[u8]> {
        let end = self.id.iter().position(|&byte| byte == 0)?;
        Some(&self.id[..end])
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.flags & FLAGS_VISIBLE != 0
    }

    /// The used part of the dash array.
    #[inline]
    pub fn dashes(&self) -> &[f32] {
        let count = (self.stroke_dash_count as usize).min(MAX_DASHES);
        &self.stroke_dash_array[..count]
    }
}

impl Default for RawShape {
    fn default() -> Self {
        Self::new()
    }
}

/// A single sub-path as a flat buffer of `x, y` pairs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawPath {
    pub points: Vec<f32>,
    pub closed: bool,
}

impl RawPath {
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len() / 2
    }
}

#[test]
fn shape_ids() {
    let mut shape = RawShape::new();
    assert_eq!(shape.id_bytes(), Some(&b""[..]));

    assert!(shape.set_id("logo"));
    assert_eq!(shape.id_bytes(), Some(&b"logo"[..]));

    let long = "x".repeat(100);
    assert!(!shape.set_id(&long));
    assert_eq!(shape.id_bytes().map(|id| id.len()), Some(SHAPE_ID_LEN - 1));

    // 'é' is two bytes long and must not be split.
    let accents = "é".repeat(40);
    assert!(!shape.set_id(&accents));
    let id = shape.id_bytes().unwrap();
    assert_eq!(id.len(), 62);
    assert!(std::str::from_utf8(id).is_ok());

    shape.id = [b'a'; SHAPE_ID_LEN];
    assert_eq!(shape.id_bytes(), None);
}

#[test]
fn dash_count_is_clamped() {
    let mut shape = RawShape::new();
    assert!(shape.dashes().is_empty());
    shape.stroke_dash_array[0] = 5.0;
    shape.stroke_dash_array[1] = 2.0;
    shape.stroke_dash_count = 2;
    assert_eq!(shape.dashes(), &[5.0, 2.0]);
    shape.stroke_dash_count = 200;
    assert_eq!(shape.dashes().len(), MAX_DASHES);
}
