#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Loads SVG documents into a self-contained vector image.
//!
//! The SVG parser produces shapes made of paths, and each path is a flat buffer of
//! cubic bézier control points. This crate walks that output once, classifies the
//! true order of every curve segment and stores the whole document in a handful of
//! contiguous buffers owned by a single [`VectorImage`].
//!
//! # Examples
//!
//! ```no_run
//! # extern crate vector_image;
//! # fn main() -> Result<(), vector_image::LoadError> {
//! use vector_image::{load_vector_image, CurveKind};
//!
//! let image = load_vector_image("assets/blue_shape.svg")?;
//!
//! for shape in image.shapes() {
//!     println!("{:?} visible: {}", shape.name(), shape.is_visible());
//!     for path in shape.paths() {
//!         for edge in path.edges() {
//!             match edge.kind {
//!                 CurveKind::Line => println!("  line to {:?}", edge.end),
//!                 CurveKind::Cubic => println!("  cubic to {:?}", edge.end),
//!                 _ => println!("  quadratic to {:?}", edge.end),
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Loading pipeline
//!
//! - The [`Loader`] reads the file into a scratch buffer and hands the NUL-terminated
//!   text to an [`SvgParser`] (by default [`UsvgParser`]).
//! - The parser returns a [`RawDocument`](document::RawDocument) in which every segment
//!   is encoded as a cubic curve. Lines and quadratic curves are encoded by placing a
//!   control point on one of the endpoints.
//! - [`VectorImage::from_document`] counts everything first, reserves its buffers once
//!   and then fills them, running the curve extractor from the [`edge`] module on
//!   each path.
//!
//! The [`render`] module replays images into lyon's path builders and tessellator
//! options.

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub extern crate lyon_tessellation as tessellation;

pub use crate::tessellation::geom;
pub use crate::tessellation::math;
pub use crate::tessellation::path;

mod color;
pub mod document;
pub mod edge;
mod error;
mod image;
mod loader;
pub mod parser;
pub mod render;

#[cfg(test)]
mod loader_tests;

#[doc(inline)]
pub use crate::color::Color;
#[doc(inline)]
pub use crate::edge::{extract_edges, num_edges, CurveKind, EdgeSegment, Edges, VectorEdge};
#[doc(inline)]
pub use crate::error::{LoadError, ParseError};
#[doc(inline)]
pub use crate::image::{Paint, Paths, Rect, Shapes, Stroke, VectorImage, VectorPath, VectorShape};
#[doc(inline)]
pub use crate::loader::{load_vector_image, LoadOptions, Loader};
#[doc(inline)]
pub use crate::parser::{SvgParser, Units, UsvgParser};
#[doc(inline)]
pub use crate::render::{render_vector_image, Renderer};

pub use crate::tessellation::{FillRule, LineCap, LineJoin};
