//! Replays vector images into lyon paths and tessellator options.
//!
//! ```no_run
//! # extern crate vector_image;
//! # use vector_image::tessellation::{FillOptions, StrokeOptions};
//! # use vector_image::path::Path;
//! # use vector_image::math::Transform;
//! # use vector_image::{Color, Renderer};
//! struct Counter { fills: usize, strokes: usize }
//!
//! impl Renderer for Counter {
//!     fn fill_path(&mut self, _: &Path, _: Color, _: &FillOptions) { self.fills += 1; }
//!     fn stroke_path(&mut self, _: &Path, _: Color, _: &StrokeOptions) { self.strokes += 1; }
//! }
//!
//! # fn main() -> Result<(), vector_image::LoadError> {
//! let image = vector_image::load_vector_image("assets/blue_shape.svg")?;
//! let mut counter = Counter { fills: 0, strokes: 0 };
//! vector_image::render_vector_image(&image, &Transform::identity(), &mut counter);
//! # Ok(())
//! # }
//! ```

use crate::color::Color;
use crate::edge::CurveKind;
use crate::image::{VectorImage, VectorPath, VectorShape};
use crate::math::Transform;
use crate::path::builder::{NoAttributes, PathBuilder};
use crate::path::Path;
use crate::tessellation::{FillOptions, StrokeOptions};

impl<'l> VectorPath<'l> {
    /// Appends this path as a sub-path to a lyon path builder.
    ///
    /// Each edge is emitted with the cheapest primitive matching its kind. Empty
    /// paths emit nothing.
    pub fn build<B: PathBuilder>(&self, builder: &mut NoAttributes<B>) {
        let edges = self.edges();
        let first = match edges.first() {
            Some(edge) => edge,
            None => return,
        };

        builder.begin(first.start);
        for edge in edges {
            match edge.kind {
                CurveKind::Line => {
                    builder.line_to(edge.end);
                }
                CurveKind::QuadraticFrom1 => {
                    builder.quadratic_bezier_to(edge.control2, edge.end);
                }
                CurveKind::QuadraticFrom2 => {
                    builder.quadratic_bezier_to(edge.control1, edge.end);
                }
                CurveKind::Cubic => {
                    builder.cubic_bezier_to(edge.control1, edge.control2, edge.end);
                }
            }
        }
        builder.end(self.is_closed());
    }
}

impl<'l> VectorShape<'l> {
    /// All paths of the shape as a single lyon path.
    pub fn to_path(&self) -> Path {
        let mut builder = Path::builder();
        for path in self.paths() {
            path.build(&mut builder);
        }

        builder.build()
    }

    pub fn to_path_with_transform(&self, transform: &Transform) -> Path {
        self.to_path().transformed(transform)
    }

    /// Fill tessellation options matching the fill rule of the shape.
    pub fn fill_options(&self) -> FillOptions {
        FillOptions::DEFAULT.with_fill_rule(self.fill_rule())
    }

    /// Stroke tessellation options matching the stroke of the shape.
    ///
    /// Dashes are not applied.
    pub fn stroke_options(&self) -> StrokeOptions {
        let stroke = self.stroke();
        StrokeOptions::DEFAULT
            .with_line_width(stroke.width)
            .with_line_cap(stroke.line_cap)
            .with_line_join(stroke.line_join)
            .with_miter_limit(stroke.miter_limit.max(StrokeOptions::MINIMUM_MITER_LIMIT))
    }
}

/// Receives the geometry of an image, shape by shape.
pub trait Renderer {
    fn fill_path(&mut self, path: &Path, color: Color, options: &FillOptions);
    fn stroke_path(&mut self, path: &Path, color: Color, options: &StrokeOptions);
}

impl<'l, R: Renderer + ?Sized> Renderer for &'l mut R {
    fn fill_path(&mut self, path: &Path, color: Color, options: &FillOptions) {
        (**self).fill_path(path, color, options)
    }

    fn stroke_path(&mut self, path: &Path, color: Color, options: &StrokeOptions) {
        (**self).stroke_path(path, color, options)
    }
}

/// Walks the visible shapes of an image in paint order.
///
/// Each shape is filled, then stroked. Shapes without a solid paint for either
/// operation skip it. Gradients are not supported and are treated as no paint.
pub fn render_vector_image<R: Renderer + ?Sized>(
    image: &VectorImage,
    transform: &Transform,
    renderer: &mut R,
) {
    for shape in image.shapes() {
        if !shape.is_visible() || shape.num_paths() == 0 {
            continue;
        }

        let fill = shape.fill().color();
        let stroke = shape.stroke().paint.color().filter(|_| shape.stroke().width > 0.0);
        if fill.is_none() && stroke.is_none() {
            log::trace!("Shape {:?} has nothing to render", shape.name());
            continue;
        }

        let path = shape.to_path_with_transform(transform);

        if let Some(color) = fill {
            renderer.fill_path(&path, color, &shape.fill_options());
        }

        if let Some(color) = stroke {
            let scale = transform_scale(transform);
            let mut options = shape.stroke_options();
            options.line_width *= scale;
            renderer.stroke_path(&path, color, &options);
        }
    }
}

// Stroke widths are expressed before the transform is applied.
fn transform_scale(transform: &Transform) -> f32 {
    let sx = (transform.m11 * transform.m11 + transform.m12 * transform.m12).sqrt();
    let sy = (transform.m21 * transform.m21 + transform.m22 * transform.m22).sqrt();
    (sx + sy) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RawDocument, RawPaint, RawPath, RawShape};
    use crate::math::point;
    use crate::path::PathEvent;
    use crate::tessellation::{FillRule, LineCap, LineJoin};

    fn shape(points: &[f32], closed: bool) -> RawShape {
        let mut shape = RawShape::new();
        shape.fill = RawPaint::color(0xFF0000FF);
        shape.paths.push(RawPath {
            points: points.to_vec(),
            closed,
        });
        shape
    }

    fn image(shapes: Vec<RawShape>) -> VectorImage {
        let mut doc = RawDocument::new(100.0, 100.0);
        doc.shapes = shapes;
        VectorImage::from_document(&doc).unwrap()
    }

    #[rustfmt::skip]
    const MIXED: &[f32] = &[
        // line
        0.0, 0.0,   0.0, 0.0,   10.0, 0.0,   10.0, 0.0,
        // quadratic, first control point collapsed
        10.0, 0.0,   10.0, 10.0,   0.0, 10.0,
        // cubic
        -5.0, 5.0,   -5.0, 2.0,   0.0, 0.0,
    ];

    #[test]
    fn build_path() {
        let image = image(vec![shape(MIXED, true)]);
        let path = image.shape(0).unwrap().to_path();
        let events: Vec<PathEvent> = path.iter().collect();

        assert_eq!(
            events,
            vec![
                PathEvent::Begin { at: point(0.0, 0.0) },
                PathEvent::Line { from: point(0.0, 0.0), to: point(10.0, 0.0) },
                PathEvent::Quadratic {
                    from: point(10.0, 0.0),
                    ctrl: point(10.0, 10.0),
                    to: point(0.0, 10.0),
                },
                PathEvent::Cubic {
                    from: point(0.0, 10.0),
                    ctrl1: point(-5.0, 5.0),
                    ctrl2: point(-5.0, 2.0),
                    to: point(0.0, 0.0),
                },
                PathEvent::End { last: point(0.0, 0.0), first: point(0.0, 0.0), close: true },
            ]
        );
    }

    #[test]
    fn open_paths_stay_open() {
        let image = image(vec![shape(&[0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 5.0], false)]);
        let path = image.shape(0).unwrap().to_path();
        let last = path.iter().last();

        assert_eq!(
            last,
            Some(PathEvent::End { last: point(5.0, 5.0), first: point(0.0, 0.0), close: false })
        );
    }

    #[test]
    fn transformed_path() {
        let image = image(vec![shape(&[0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 5.0], false)]);
        let transform = Transform::scale(2.0, 2.0).then_translate(crate::math::vector(1.0, 0.0));
        let path = image.shape(0).unwrap().to_path_with_transform(&transform);

        let first = path.iter().next();
        assert_eq!(first, Some(PathEvent::Begin { at: point(1.0, 0.0) }));
    }

    #[test]
    fn tessellator_options() {
        let mut raw = shape(MIXED, true);
        raw.fill_rule = FillRule::EvenOdd;
        raw.stroke_width = 3.0;
        raw.stroke_line_cap = LineCap::Round;
        raw.stroke_line_join = LineJoin::Bevel;
        raw.miter_limit = 0.5;
        let image = image(vec![raw]);
        let shape = image.shape(0).unwrap();

        assert_eq!(shape.fill_options().fill_rule, FillRule::EvenOdd);

        let stroke = shape.stroke_options();
        assert_eq!(stroke.line_width, 3.0);
        assert_eq!(stroke.start_cap, LineCap::Round);
        assert_eq!(stroke.end_cap, LineCap::Round);
        assert_eq!(stroke.line_join, LineJoin::Bevel);
        assert_eq!(stroke.miter_limit, StrokeOptions::MINIMUM_MITER_LIMIT);
    }

    #[derive(Default)]
    struct Recorder {
        fills: Vec<Color>,
        strokes: Vec<(Color, f32)>,
    }

    impl Renderer for Recorder {
        fn fill_path(&mut self, _: &Path, color: Color, _: &FillOptions) {
            self.fills.push(color);
        }

        fn stroke_path(&mut self, _: &Path, color: Color, options: &StrokeOptions) {
            self.strokes.push((color, options.line_width));
        }
    }

    #[test]
    fn render_walk() {
        let filled = shape(MIXED, true);

        let mut stroked = shape(MIXED, true);
        stroked.fill = RawPaint::NONE;
        stroked.stroke = RawPaint::color(0xFF00FF00);
        stroked.stroke_width = 2.0;

        let mut hidden = shape(MIXED, true);
        hidden.flags = 0;

        let mut gradient = shape(MIXED, true);
        gradient.fill.kind = crate::document::RawPaintKind::LinearGradient;

        let image = image(vec![filled, stroked, hidden, gradient]);
        let mut recorder = Recorder::default();
        render_vector_image(&image, &Transform::scale(3.0, 3.0), &mut recorder);

        assert_eq!(recorder.fills, vec![Color::rgba(255, 0, 0, 255)]);
        assert_eq!(recorder.strokes, vec![(Color::rgba(0, 255, 0, 255), 6.0)]);
    }
}
