//! TrueType glyph outlines and analytic rasterization
//!
//! Reads a TrueType/OpenType font from raw bytes, extracts quadratic
//! glyph outlines as [`Shape`]s, and renders flattened shapes into 8-bit
//! grayscale coverage with a single-pass analytic rasterizer.
//!
//! A text image is produced in three steps:
//!
//! ```no_run
//! use fastglyph::{Rasterizer, Shape, Transform, Typeface};
//!
//! let face = Typeface::new(std::fs::read("font.ttf").unwrap()).unwrap();
//!
//! // Accumulate glyph outlines, advancing the pen per glyph.
//! let mut text = Shape::new();
//! let mut pen = Transform::from_scale(0.01);
//! let mut prev = 0u16;
//! for ch in "Ab".chars() {
//!   let gid = face.glyph_index(ch as u32);
//!   pen.tx += face.kerning(prev, gid) * 0.01;
//!   text.add_shape(&face.glyph_shape(gid), &pen);
//!   pen.tx += face.glyph_metrics(gid).advance * 0.01;
//!   prev = gid;
//! }
//!
//! // Flatten curves, then rasterize into a caller-owned buffer.
//! let flat = text.flatten(0.35);
//! let (w, h) = (64usize, 16usize);
//! let mut pixels = vec![0u8; w * h];
//! Rasterizer::new(&mut pixels, w, h, w).rasterize(&flat, 0.0, 4.0);
//! ```
//!
//! Rows come out bottom-up (font y points up); encoders that want y-down
//! images iterate rows in reverse.

pub mod error;
pub mod font;
pub mod geometry;
pub mod metrics;
pub mod raster;
pub mod shape;

pub use error::{Error, FontError, Result};
pub use font::{FontData, Tag, Typeface};
pub use geometry::{BBox, Point, Transform};
pub use metrics::{FontMetrics, GlyphMetrics};
pub use raster::{CoverageMode, Rasterizer};
pub use shape::{Contour, Shape, Vertex};
