//! The vector image data structure.

use crate::color::Color;
use crate::document::{RawDocument, RawPaint, RawPaintKind, RawShape};
use crate::edge::{self, VectorEdge};
use crate::error::LoadError;
use crate::geom::euclid;
use crate::tessellation::{FillRule, LineCap, LineJoin};

use std::fmt;
use std::iter::FusedIterator;
use std::mem;

/// Axis-aligned rectangle stored as origin and size.
pub type Rect = euclid::default::Rect<f32>;

/// How a fill or a stroke is painted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Paint {
    None,
    Solid(Color),
}

impl Paint {
    /// Only solid colors are supported, other paint types (gradients) become `None`.
    #[inline]
    pub fn from_raw(paint: &RawPaint) -> Self {
        match paint.kind {
            RawPaintKind::Color => Paint::Solid(Color::from_packed(paint.color)),
            _ => Paint::None,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Paint::None
    }

    #[inline]
    pub fn color(&self) -> Option<Color> {
        match *self {
            Paint::Solid(color) => Some(color),
            Paint::None => None,
        }
    }
}

/// Stroke parameters of a shape.
///
/// The dash array is stored in the image, see [`VectorShape::dashes`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
    pub miter_limit: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub dash_offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct ShapeDescriptor {
    name: (u32, u32),
    paths: (u32, u32),
    dashes: (u32, u32),
    visible: bool,
    opacity: f32,
    bounds: Rect,
    fill: Paint,
    fill_rule: FillRule,
    stroke: Stroke,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct PathDescriptor {
    edges: (u32, u32),
    closed: bool,
}

/// A loaded SVG document.
///
/// # Representation
///
/// All shapes, paths and edges of the document are stored contiguously in a few
/// buffers owned by the image, in paint order. Shapes and paths are ranges into
/// these buffers:
///
/// ```ascii
///  shapes  | shape 0         | shape 1  | ...
///  paths   | p0 | p1 | p2    | p3       | ...
///  edges   | e e | e e e | e | e e e e  | ...
/// ```
///
/// The buffers are sized by a counting pass over the parsed document before being
/// filled, so building an image performs a fixed number of allocations and dropping
/// it releases everything at once. Images are never modified after construction.
///
/// Shapes and paths are accessed through the borrowing views [`VectorShape`] and
/// [`VectorPath`].
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VectorImage {
    width: f32,
    height: f32,
    shapes: Vec<ShapeDescriptor>,
    paths: Vec<PathDescriptor>,
    edges: Vec<VectorEdge>,
    names: String,
    dashes: Vec<f32>,
}

impl VectorImage {
    /// Creates an empty image.
    #[inline]
    pub fn new() -> Self {
        VectorImage::default()
    }

    fn with_capacity(shapes: usize, paths: usize, edges: usize, name_bytes: usize, dashes: usize) -> Self {
        VectorImage {
            width: 0.0,
            height: 0.0,
            shapes: Vec::with_capacity(shapes),
            paths: Vec::with_capacity(paths),
            edges: Vec::with_capacity(edges),
            names: String::with_capacity(name_bytes),
            dashes: Vec::with_capacity(dashes),
        }
    }

    /// Builds an image from a parsed document.
    ///
    /// Fails with `LoadError::CorruptShapeId` if the id buffer of a shape is not
    /// NUL-terminated, in which case nothing is built.
    pub fn from_document(document: &RawDocument) -> Result<Self, LoadError> {
        let mut num_paths = 0;
        let mut num_edges = 0;
        let mut name_bytes = 0;
        let mut num_dashes = 0;
        for (idx, shape) in document.shapes.iter().enumerate() {
            let id = shape
                .id_bytes()
                .ok_or(LoadError::CorruptShapeId { shape: idx })?;
            // Invalid UTF-8 is replaced, which can change the length.
            name_bytes += String::from_utf8_lossy(id).len();
            num_dashes += shape.dashes().len();
            num_paths += shape.paths.len();
            for path in &shape.paths {
                num_edges += edge::num_edges(path.num_points());
            }
        }

        let mut image = VectorImage::with_capacity(
            document.shapes.len(),
            num_paths,
            num_edges,
            name_bytes,
            num_dashes,
        );
        image.width = document.width;
        image.height = document.height;

        for shape in &document.shapes {
            image.push_shape(shape);
        }

        debug_assert_eq!(image.paths.len(), num_paths);
        debug_assert_eq!(image.edges.len(), num_edges);
        debug_assert_eq!(image.dashes.len(), num_dashes);
        debug_assert_eq!(image.names.len(), name_bytes);

        log::debug!(
            "Built a vector image with {} shapes, {} paths and {} edges",
            image.shapes.len(),
            image.paths.len(),
            image.edges.len(),
        );

        Ok(image)
    }

    // The id must have been validated by the caller.
    fn push_shape(&mut self, shape: &RawShape) {
        let name_start = self.names.len() as u32;
        if let Some(id) = shape.id_bytes() {
            self.names.push_str(&String::from_utf8_lossy(id));
        }
        let name_end = self.names.len() as u32;

        let dashes_start = self.dashes.len() as u32;
        self.dashes.extend_from_slice(shape.dashes());
        let dashes_end = self.dashes.len() as u32;

        let paths_start = self.paths.len() as u32;
        for path in &shape.paths {
            let edges_start = self.edges.len() as u32;
            self.edges.extend(edge::extract_edges(&path.points));
            let edges_end = self.edges.len() as u32;
            self.paths.push(PathDescriptor {
                edges: (edges_start, edges_end),
                closed: path.closed,
            });
        }
        let paths_end = self.paths.len() as u32;

        let [x, y, w, h] = shape.bounds;

        let descriptor = ShapeDescriptor {
            name: (name_start, name_end),
            paths: (paths_start, paths_end),
            dashes: (dashes_start, dashes_end),
            visible: shape.is_visible(),
            // The parser doesn't provide a per-shape opacity.
            opacity: 1.0,
            bounds: euclid::rect(x, y, w, h),
            fill: Paint::from_raw(&shape.fill),
            fill_rule: shape.fill_rule,
            stroke: Stroke {
                paint: Paint::from_raw(&shape.stroke),
                width: shape.stroke_width,
                miter_limit: shape.miter_limit,
                line_cap: shape.stroke_line_cap,
                line_join: shape.stroke_line_join,
                dash_offset: shape.stroke_dash_offset,
            },
        };

        log::trace!("shape #{} {:?}", self.shapes.len(), descriptor);

        self.shapes.push(descriptor);
    }

    /// Width of the document.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of the document.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns the shape at a given index.
    #[inline]
    pub fn shape(&self, index: usize) -> Option<VectorShape> {
        self.shapes.get(index).map(|desc| VectorShape { image: self, desc })
    }

    /// Iterates over the shapes in paint order.
    #[inline]
    pub fn shapes(&self) -> Shapes {
        Shapes {
            image: self,
            iter: self.shapes.iter(),
        }
    }

    /// Number of shapes.
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Total number of paths across all shapes.
    #[inline]
    pub fn num_paths(&self) -> usize {
        self.paths.len()
    }

    /// Total number of edges across all shapes.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of heap bytes owned by the image.
    pub fn memory_size(&self) -> usize {
        self.shapes.capacity() * mem::size_of::<ShapeDescriptor>()
            + self.paths.capacity() * mem::size_of::<PathDescriptor>()
            + self.edges.capacity() * mem::size_of::<VectorEdge>()
            + self.names.capacity()
            + self.dashes.capacity() * mem::size_of::<f32>()
    }

    #[inline]
    fn path_at(&self, desc: &PathDescriptor) -> VectorPath {
        VectorPath {
            edges: &self.edges[desc.edges.0 as usize..desc.edges.1 as usize],
            closed: desc.closed,
        }
    }
}

impl fmt::Debug for VectorImage {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "VectorImage {{ size: {}x{}, shapes: {}, paths: {}, edges: {}, ",
            self.width,
            self.height,
            self.shapes.len(),
            self.paths.len(),
            self.edges.len(),
        )?;
        for (idx, shape) in self.shapes().enumerate() {
            write!(formatter, "#{idx:?}: {shape:?}, ")?;
        }
        write!(formatter, "}}")
    }
}

/// A view on a shape of a [`VectorImage`].
#[derive(Copy, Clone)]
pub struct VectorShape<'l> {
    image: &'l VectorImage,
    desc: &'l ShapeDescriptor,
}

impl<'l> VectorShape<'l> {
    /// The id of the shape or of its group. May be empty.
    #[inline]
    pub fn name(&self) -> &'l str {
        &self.image.names[self.desc.name.0 as usize..self.desc.name.1 as usize]
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.desc.visible
    }

    /// Always `1.0` for now.
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.desc.opacity
    }

    /// Axis-aligned bounds as origin and size.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.desc.bounds
    }

    #[inline]
    pub fn fill(&self) -> Paint {
        self.desc.fill
    }

    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.desc.fill_rule
    }

    /// `true` for the non-zero fill rule, `false` for even-odd.
    #[inline]
    pub fn fill_odd_sections(&self) -> bool {
        self.desc.fill_rule == FillRule::NonZero
    }

    #[inline]
    pub fn stroke(&self) -> &'l Stroke {
        &self.desc.stroke
    }

    /// The stroke dash array, empty for solid strokes.
    #[inline]
    pub fn dashes(&self) -> &'l [f32] {
        &self.image.dashes[self.desc.dashes.0 as usize..self.desc.dashes.1 as usize]
    }

    /// Returns the path at a given index within this shape.
    #[inline]
    pub fn path(&self, index: usize) -> Option<VectorPath<'l>> {
        self.descriptors()
            .get(index)
            .map(|desc| self.image.path_at(desc))
    }

    /// Iterates over the paths of this shape in order.
    #[inline]
    pub fn paths(&self) -> Paths<'l> {
        Paths {
            image: self.image,
            iter: self.descriptors().iter(),
        }
    }

    #[inline]
    pub fn num_paths(&self) -> usize {
        self.descriptors().len()
    }

    /// Number of edges across all paths of this shape.
    pub fn num_edges(&self) -> usize {
        self.paths().map(|path| path.len()).sum()
    }

    #[inline]
    fn descriptors(&self) -> &'l [PathDescriptor] {
        &self.image.paths[self.desc.paths.0 as usize..self.desc.paths.1 as usize]
    }
}

impl<'l> fmt::Debug for VectorShape<'l> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("VectorShape")
            .field("name", &self.name())
            .field("visible", &self.is_visible())
            .field("bounds", &self.bounds())
            .field("fill", &self.fill())
            .field("fill_rule", &self.fill_rule())
            .field("stroke", self.stroke())
            .field("paths", &self.num_paths())
            .field("edges", &self.num_edges())
            .finish()
    }
}

/// A view on a path of a [`VectorImage`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VectorPath<'l> {
    edges: &'l [VectorEdge],
    closed: bool,
}

impl<'l> VectorPath<'l> {
    #[inline]
    pub fn edges(&self) -> &'l [VectorEdge] {
        self.edges
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// An iterator over the shapes of a [`VectorImage`].
#[derive(Clone)]
pub struct Shapes<'l> {
    image: &'l VectorImage,
    iter: std::slice::Iter<'l, ShapeDescriptor>,
}

impl<'l> Iterator for Shapes<'l> {
    type Item = VectorShape<'l>;

    #[inline]
    fn next(&mut self) -> Option<VectorShape<'l>> {
        let image = self.image;
        self.iter.next().map(|desc| VectorShape { image, desc })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'l> DoubleEndedIterator for Shapes<'l> {
    #[inline]
    fn next_back(&mut self) -> Option<VectorShape<'l>> {
        let image = self.image;
        self.iter.next_back().map(|desc| VectorShape { image, desc })
    }
}

impl<'l> ExactSizeIterator for Shapes<'l> {}
impl<'l> FusedIterator for Shapes<'l> {}

/// An iterator over the paths of a [`VectorShape`].
#[derive(Clone)]
pub struct Paths<'l> {
    image: &'l VectorImage,
    iter: std::slice::Iter<'l, PathDescriptor>,
}

impl<'l> Iterator for Paths<'l> {
    type Item = VectorPath<'l>;

    #[inline]
    fn next(&mut self) -> Option<VectorPath<'l>> {
        let image = self.image;
        self.iter.next().map(|desc| image.path_at(desc))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'l> ExactSizeIterator for Paths<'l> {}
impl<'l> FusedIterator for Paths<'l> {}

impl<'l> IntoIterator for &'l VectorImage {
    type Item = VectorShape<'l>;
    type IntoIter = Shapes<'l>;

    fn into_iter(self) -> Shapes<'l> {
        self.shapes()
    }
}

#[cfg(test)]
use crate::document::{RawPath, SHAPE_ID_LEN};
#[cfg(test)]
use crate::edge::CurveKind;
#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn shape_with_paths(id: &str, paths: &[&[f32]]) -> RawShape {
    let mut shape = RawShape::new();
    shape.set_id(id);
    for points in paths {
        shape.paths.push(RawPath {
            points: points.to_vec(),
            closed: false,
        });
    }
    shape
}

#[test]
fn empty_document() {
    let image = VectorImage::from_document(&RawDocument::new(10.0, 20.0)).unwrap();
    assert!(image.is_empty());
    assert_eq!(image.shapes().count(), 0);
    assert_eq!(image.width(), 10.0);
    assert_eq!(image.height(), 20.0);
    assert!(image.shape(0).is_none());
}

#[test]
fn shape_attributes() {
    let mut shape = shape_with_paths("blue", &[]);
    shape.bounds = [10.0, 20.0, 100.0, 50.0];
    shape.fill = RawPaint::color(0xFFF8_3333);
    shape.fill_rule = FillRule::EvenOdd;
    shape.stroke = RawPaint {
        kind: RawPaintKind::LinearGradient,
        color: 0xFF00_FF00,
    };
    shape.stroke_width = 3.0;
    shape.miter_limit = 8.0;
    shape.stroke_line_cap = LineCap::Round;
    shape.stroke_line_join = LineJoin::Bevel;
    shape.stroke_dash_array[0] = 4.0;
    shape.stroke_dash_array[1] = 1.0;
    shape.stroke_dash_count = 2;
    shape.stroke_dash_offset = 0.5;

    let mut hidden = shape_with_paths("hidden", &[]);
    hidden.flags = 0;

    let mut document = RawDocument::new(100.0, 100.0);
    document.shapes.push(shape);
    document.shapes.push(hidden);

    let image = VectorImage::from_document(&document).unwrap();
    assert_eq!(image.len(), 2);

    let shape = image.shape(0).unwrap();
    assert_eq!(shape.name(), "blue");
    assert!(shape.is_visible());
    assert_eq!(shape.opacity(), 1.0);
    let bounds: crate::Rect = shape.bounds();
    assert_eq!(bounds, euclid::rect(10.0, 20.0, 100.0, 50.0));
    assert_eq!(bounds.origin, point(10.0, 20.0));
    assert_eq!(shape.bounds().size.width, 100.0);
    assert_eq!(shape.bounds().size.height, 50.0);
    assert_eq!(shape.fill(), Paint::Solid(Color::rgba(0x33, 0x33, 0xF8, 0xFF)));
    assert_eq!(shape.fill_rule(), FillRule::EvenOdd);
    assert!(!shape.fill_odd_sections());
    // Gradients are not supported.
    assert_eq!(shape.stroke().paint, Paint::None);
    assert_eq!(shape.stroke().width, 3.0);
    assert_eq!(shape.stroke().miter_limit, 8.0);
    assert_eq!(shape.stroke().line_cap, LineCap::Round);
    assert_eq!(shape.stroke().line_join, LineJoin::Bevel);
    assert_eq!(shape.stroke().dash_offset, 0.5);
    assert_eq!(shape.dashes(), &[4.0, 1.0]);

    let hidden = image.shape(1).unwrap();
    assert_eq!(hidden.name(), "hidden");
    assert!(!hidden.is_visible());
    assert!(hidden.fill_odd_sections());
    assert!(hidden.dashes().is_empty());
}

#[test]
fn paths_and_edges() {
    let line: &[f32] = &[0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 10.0, 0.0];
    let two_curves: &[f32] = &[
        0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 10.0, 0.0, 12.0, 2.0, 14.0, 2.0, 16.0, 0.0,
    ];
    let empty: &[f32] = &[];

    let mut document = RawDocument::default();
    document.shapes.push(shape_with_paths("a", &[line, empty, two_curves]));
    document.shapes.push(shape_with_paths("b", &[two_curves]));

    let image = VectorImage::from_document(&document).unwrap();
    assert_eq!(image.num_paths(), 4);
    assert_eq!(image.num_edges(), 5);

    let a = image.shape(0).unwrap();
    assert_eq!(a.num_paths(), 3);
    assert_eq!(a.num_edges(), 3);
    let lens: Vec<usize> = a.paths().map(|p| p.len()).collect();
    assert_eq!(lens, vec![1, 0, 2]);
    assert!(a.path(1).unwrap().is_empty());
    assert!(a.path(3).is_none());

    let first = a.path(0).unwrap().edges()[0];
    assert_eq!(first.kind, CurveKind::Line);
    assert_eq!(first.end, point(10.0, 0.0));

    let curves = a.path(2).unwrap();
    assert_eq!(curves.edges()[0].kind, CurveKind::QuadraticFrom1);
    assert_eq!(curves.edges()[1].kind, CurveKind::Cubic);
    assert_eq!(curves.edges()[0].end, curves.edges()[1].start);

    let b = image.shape(1).unwrap();
    assert_eq!(b.path(0), a.path(2));
}

#[test]
fn corrupt_id_builds_nothing() {
    let mut document = RawDocument::default();
    document.shapes.push(shape_with_paths("fine", &[]));
    let mut corrupt = shape_with_paths("", &[]);
    corrupt.id = [b'z'; SHAPE_ID_LEN];
    document.shapes.push(corrupt);

    match VectorImage::from_document(&document) {
        Err(LoadError::CorruptShapeId { shape }) => assert_eq!(shape, 1),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn buffers_are_sized_upfront() {
    let curve: &[f32] = &[0.0, 0.0, 1.0, 1.0, 2.0, 1.0, 3.0, 0.0];
    let mut document = RawDocument::default();
    for i in 0..10 {
        document
            .shapes
            .push(shape_with_paths(&format!("shape{i}"), &[curve, curve]));
    }

    let image = VectorImage::from_document(&document).unwrap();
    assert_eq!(image.shapes.capacity(), 10);
    assert_eq!(image.paths.capacity(), 20);
    assert_eq!(image.edges.capacity(), 20);
    assert!(image.memory_size() >= 20 * mem::size_of::<VectorEdge>());
}

#[test]
fn outlives_the_document() {
    let mut document = RawDocument::default();
    document.shapes.push(shape_with_paths(
        "kept",
        &[&[0.0, 0.0, 1.0, 1.0, 2.0, 1.0, 3.0, 0.0]],
    ));

    let image = VectorImage::from_document(&document).unwrap();
    drop(document);

    let shape = image.shapes().next().unwrap();
    assert_eq!(shape.name(), "kept");
    assert_eq!(shape.path(0).unwrap().edges()[0].end, point(3.0, 0.0));
}

#[test]
fn names_with_invalid_utf8() {
    let mut shape = shape_with_paths("", &[]);
    shape.id[..3].copy_from_slice(&[0xFF, b'a', 0xFE]);
    let mut document = RawDocument::new(1.0, 1.0);
    document.shapes.push(shape);
    document.shapes.push(shape_with_paths("b", &[]));

    let image = VectorImage::from_document(&document).unwrap();
    assert_eq!(image.shape(0).unwrap().name(), "\u{FFFD}a\u{FFFD}");
    assert_eq!(image.shape(1).unwrap().name(), "b");
    assert_eq!(image.names.len(), 8);
    assert_eq!(image.names.capacity(), 8);
}
