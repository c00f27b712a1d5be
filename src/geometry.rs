//! Core geometry types for glyph outlines
//!
//! This module provides the geometric primitives the rest of the crate is
//! built on. All units are font design units unless a transform has mapped
//! them to pixels.
//!
//! # Coordinate System
//!
//! Font outlines use the TrueType convention:
//! - Positive X extends to the right
//! - Positive Y extends upward (toward the ascender)
//!
//! Rasterization keeps this orientation; row 0 of a target pixel buffer is
//! the bottom scanline. Callers that need top-down image rows flip rows
//! when encoding.

use std::fmt;

/// A 2D point
///
/// # Examples
///
/// ```
/// use fastglyph::Point;
///
/// let p = Point::new(10.0, 20.0);
/// assert_eq!(p.x, 10.0);
/// assert_eq!(Point::ZERO, Point::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  /// X coordinate (increases to the right)
  pub x: f32,
  /// Y coordinate (increases upward)
  pub y: f32,
}

impl Point {
  /// The zero point at the origin (0, 0)
  pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

  /// Creates a new point at the given coordinates
  pub const fn new(x: f32, y: f32) -> Self {
    Self { x, y }
  }
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.x, self.y)
  }
}

/// A 2×3 affine transform
///
/// The linear part is row-major (`m00 m01 / m10 m11`) with a translation
/// `(tx, ty)` applied after it:
///
/// ```text
/// x' = m00·x + m01·y + tx
/// y' = m10·x + m11·y + ty
/// ```
///
/// Composite glyph components carry their own scale or 2×2 matrix, so the
/// crate only ever applies transforms at read time; there is no compose
/// operation.
///
/// # Examples
///
/// ```
/// use fastglyph::{Point, Transform};
///
/// let t = Transform::from_scale_translate(2.0, 2.0, 10.0, 0.0);
/// assert_eq!(t.apply(Point::new(3.0, 4.0)), Point::new(16.0, 8.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
  pub m00: f32,
  pub m01: f32,
  pub m10: f32,
  pub m11: f32,
  pub tx: f32,
  pub ty: f32,
}

impl Transform {
  /// The identity transform
  pub const IDENTITY: Self = Self {
    m00: 1.0,
    m01: 0.0,
    m10: 0.0,
    m11: 1.0,
    tx: 0.0,
    ty: 0.0,
  };

  /// Creates a transform from all six coefficients
  pub const fn new(m00: f32, m01: f32, m10: f32, m11: f32, tx: f32, ty: f32) -> Self {
    Self { m00, m01, m10, m11, tx, ty }
  }

  /// Uniform scale with no translation
  pub const fn from_scale(scale: f32) -> Self {
    Self::new(scale, 0.0, 0.0, scale, 0.0, 0.0)
  }

  /// Translation with an identity linear part
  pub const fn from_translate(tx: f32, ty: f32) -> Self {
    Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
  }

  /// Axis-aligned scale followed by a translation
  pub const fn from_scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Self {
    Self::new(sx, 0.0, 0.0, sy, tx, ty)
  }

  /// Applies the transform to a point
  #[inline]
  pub fn apply(&self, p: Point) -> Point {
    Point::new(
      self.m00 * p.x + self.m01 * p.y + self.tx,
      self.m10 * p.x + self.m11 * p.y + self.ty,
    )
  }
}

impl Default for Transform {
  fn default() -> Self {
    Self::IDENTITY
  }
}

/// An axis-aligned bounding box
///
/// Shapes cache their bounds as `Option<BBox>`; `None` stands for "nothing
/// inserted yet" and is replaced by the first insertion's bounds rather
/// than folded into a degenerate sentinel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
  pub min_x: f32,
  pub min_y: f32,
  pub max_x: f32,
  pub max_y: f32,
}

impl BBox {
  /// Creates a bounding box from its corner coordinates
  pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
    Self { min_x, min_y, max_x, max_y }
  }

  /// The degenerate box containing exactly one point
  pub const fn from_point(p: Point) -> Self {
    Self::new(p.x, p.y, p.x, p.y)
  }

  pub fn width(&self) -> f32 {
    self.max_x - self.min_x
  }

  pub fn height(&self) -> f32 {
    self.max_y - self.min_y
  }

  /// Grows the box to include a point
  pub fn extend(&mut self, p: Point) {
    self.min_x = self.min_x.min(p.x);
    self.min_y = self.min_y.min(p.y);
    self.max_x = self.max_x.max(p.x);
    self.max_y = self.max_y.max(p.y);
  }

  /// The smallest box containing both operands
  pub fn union(&self, other: &BBox) -> BBox {
    BBox::new(
      self.min_x.min(other.min_x),
      self.min_y.min(other.min_y),
      self.max_x.max(other.max_x),
      self.max_y.max(other.max_y),
    )
  }

  /// Bounds of this box under an affine transform
  ///
  /// All four corners are mapped so the result stays a valid enclosure
  /// under axis flips and 2×2 component matrices, not just translation.
  pub fn transformed(&self, t: &Transform) -> BBox {
    let c0 = t.apply(Point::new(self.min_x, self.min_y));
    let c1 = t.apply(Point::new(self.max_x, self.min_y));
    let c2 = t.apply(Point::new(self.min_x, self.max_y));
    let c3 = t.apply(Point::new(self.max_x, self.max_y));
    let mut out = BBox::from_point(c0);
    out.extend(c1);
    out.extend(c2);
    out.extend(c3);
    out
  }
}
