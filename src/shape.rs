//! Glyph outline shapes
//!
//! A [`Shape`] is an ordered list of closed contours, each a run of
//! vertices that are either on the outline (anchors) or off it (quadratic
//! Bézier control points). Shapes come out of
//! [`Typeface::glyph_shape`](crate::Typeface::glyph_shape) in font units;
//! callers accumulate them with [`Shape::add_shape`], map them to pixels
//! with [`Shape::transform`], and hand the result to the rasterizer after
//! [`Shape::flatten`].
//!
//! The vertex encoding follows the TrueType simple-glyph convention: two
//! consecutive off-curve points imply an on-curve anchor at their midpoint,
//! and the segment from the last vertex back to the first closes the
//! contour.

use crate::geometry::{BBox, Point, Transform};

/// A single outline vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
  pub x: f32,
  pub y: f32,
  /// True for anchors on the outline, false for quadratic control points
  pub on_curve: bool,
}

/// A closed contour; the last vertex connects back to the first
pub type Contour = Vec<Vertex>;

/// A set of contours with cached bounds
///
/// The bounds are `None` until the first vertex or sub-shape is inserted
/// and enclose every vertex thereafter. `flat` is maintained incrementally:
/// it is true while no off-curve vertex has been added, which is what the
/// rasterizer checks before deciding it must flatten.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
  contours: Vec<Contour>,
  bounds: Option<BBox>,
  flat: bool,
}

impl Default for Shape {
  fn default() -> Self {
    Self::new()
  }
}

impl Shape {
  /// Creates an empty shape with uninitialized bounds
  pub fn new() -> Self {
    Self {
      contours: Vec::new(),
      bounds: None,
      flat: true,
    }
  }

  /// Creates an empty shape with pre-seeded bounds and contour capacity
  ///
  /// Glyph decoding uses this so the shape carries the glyph header's
  /// bounding box even when the outline does not touch every edge of it.
  pub fn with_bounds(bounds: BBox, contour_hint: usize) -> Self {
    Self {
      contours: Vec::with_capacity(contour_hint),
      bounds: Some(bounds),
      flat: true,
    }
  }

  /// A copy of `other` with `t` applied to every vertex
  pub fn from_shape(other: &Shape, t: &Transform) -> Self {
    let mut shape = Shape::new();
    shape.add_shape(other, t);
    shape
  }

  pub fn num_contours(&self) -> usize {
    self.contours.len()
  }

  pub fn contour(&self, i: usize) -> &Contour {
    &self.contours[i]
  }

  pub fn contours(&self) -> &[Contour] {
    &self.contours
  }

  pub fn is_empty(&self) -> bool {
    self.contours.is_empty()
  }

  /// True while every vertex is on-curve
  pub fn is_flat(&self) -> bool {
    self.flat
  }

  /// Cached bounds, `None` when nothing has been inserted
  pub fn bounds(&self) -> Option<BBox> {
    self.bounds
  }

  pub fn min_x(&self) -> f32 {
    self.bounds.map_or(0.0, |b| b.min_x)
  }

  pub fn min_y(&self) -> f32 {
    self.bounds.map_or(0.0, |b| b.min_y)
  }

  pub fn max_x(&self) -> f32 {
    self.bounds.map_or(0.0, |b| b.max_x)
  }

  pub fn max_y(&self) -> f32 {
    self.bounds.map_or(0.0, |b| b.max_y)
  }

  pub fn width(&self) -> f32 {
    self.max_x() - self.min_x()
  }

  pub fn height(&self) -> f32 {
    self.max_y() - self.min_y()
  }

  /// Opens a new empty contour
  pub fn add_contour(&mut self) {
    self.contours.push(Vec::new());
  }

  /// Opens a new contour with reserved vertex capacity
  pub fn add_contour_with_capacity(&mut self, capacity: usize) {
    self.contours.push(Vec::with_capacity(capacity));
  }

  /// Appends a vertex to the current contour
  ///
  /// A contour must have been opened first. The cached bounds grow to
  /// include the vertex; control points count too, since a quadratic
  /// never leaves its control hull.
  pub fn add_vertex(&mut self, x: f32, y: f32, on_curve: bool) {
    debug_assert!(!self.contours.is_empty(), "add_vertex before add_contour");
    self.flat &= on_curve;
    let p = Point::new(x, y);
    match &mut self.bounds {
      Some(b) => b.extend(p),
      None => self.bounds = Some(BBox::from_point(p)),
    }
    self
      .contours
      .last_mut()
      .expect("contour present")
      .push(Vertex { x, y, on_curve });
  }

  /// Appends every contour of `other`, mapping each vertex through `t`
  ///
  /// The bounds are extended by the transformed bounds of `other`; an
  /// uninitialized target adopts them outright.
  pub fn add_shape(&mut self, other: &Shape, t: &Transform) {
    if let Some(ob) = other.bounds {
      let tb = ob.transformed(t);
      self.bounds = Some(match self.bounds {
        Some(b) => b.union(&tb),
        None => tb,
      });
    }

    self.contours.reserve(other.num_contours());
    for cont in &other.contours {
      self.add_contour_with_capacity(cont.len());
      for v in cont {
        let p = t.apply(Point::new(v.x, v.y));
        self.add_vertex(p.x, p.y, v.on_curve);
      }
    }
  }

  /// Applies `t` to every vertex and to the cached bounds
  pub fn transform(&mut self, t: &Transform) {
    if self.is_empty() {
      return;
    }

    self.bounds = self.bounds.map(|b| b.transformed(t));
    for cont in &mut self.contours {
      for v in cont.iter_mut() {
        let p = t.apply(Point::new(v.x, v.y));
        v.x = p.x;
        v.y = p.y;
      }
    }
  }

  /// Replaces every quadratic with a polyline approximation
  ///
  /// Returns a new shape whose vertices are all on-curve and whose bounds
  /// equal this shape's bounds exactly. `flatness` is the maximum allowed
  /// squared deviation between a curve and its chord at the subdivision
  /// midpoint; smaller values produce more segments. A shape that is
  /// already flat is returned as a plain copy.
  ///
  /// Contours that open with an off-curve point get their starting anchor
  /// synthesized first: the final vertex if it is on-curve, otherwise the
  /// midpoint of the final and first control points.
  pub fn flatten(&self, flatness: f32) -> Shape {
    if self.flat {
      return self.clone();
    }

    let mut result = match self.bounds {
      Some(b) => Shape::with_bounds(b, self.contours.len()),
      None => Shape::new(),
    };

    for cont in &self.contours {
      if cont.is_empty() {
        continue;
      }
      result.add_contour_with_capacity(cont.len());

      let n = cont.len();
      let last = cont[n - 1];
      let (start, from, until) = if cont[0].on_curve {
        (Point::new(cont[0].x, cont[0].y), 1, n)
      } else if last.on_curve {
        (Point::new(last.x, last.y), 0, n - 1)
      } else {
        let mid = Point::new((last.x + cont[0].x) / 2.0, (last.y + cont[0].y) / 2.0);
        (mid, 0, n)
      };
      result.add_vertex(start.x, start.y, true);

      // (ex, ey) is the previous on-curve anchor, (cx, cy) the pending
      // control point when the previous vertex was off-curve.
      let mut ex = start.x;
      let mut ey = start.y;
      let mut cx = 0.0f32;
      let mut cy = 0.0f32;
      let mut prev_on = true;

      for v in &cont[from..until] {
        if v.on_curve {
          if prev_on {
            result.add_vertex(v.x, v.y, true);
          } else {
            result.add_tessellated_curve(flatness, ex, ey, cx, cy, v.x, v.y, true);
          }
          ex = v.x;
          ey = v.y;
        } else {
          if !prev_on {
            let nx = (v.x + cx) / 2.0;
            let ny = (v.y + cy) / 2.0;
            result.add_tessellated_curve(flatness, ex, ey, cx, cy, nx, ny, true);
            ex = nx;
            ey = ny;
          }
          cx = v.x;
          cy = v.y;
        }
        prev_on = v.on_curve;
      }

      if !prev_on {
        // Close with the final quadratic back to the starting anchor. The
        // anchor already opened the contour, so its emit is suppressed.
        result.add_tessellated_curve(flatness, ex, ey, cx, cy, start.x, start.y, false);
      }
    }

    result
  }

  /// Recursively subdivides the quadratic (x0,y0)-(x1,y1)-(x2,y2)
  #[allow(clippy::too_many_arguments)]
  fn add_tessellated_curve(
    &mut self,
    flatness: f32,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    emit_end: bool,
  ) {
    // Curve midpoint (t = 0.5) versus chord midpoint.
    let mx = (x0 + 2.0 * x1 + x2) / 4.0;
    let my = (y0 + 2.0 * y1 + y2) / 4.0;
    let dx = (x0 + x2) / 2.0 - mx;
    let dy = (y0 + y2) / 2.0 - my;

    if dx * dx + dy * dy > flatness {
      self.add_tessellated_curve(
        flatness,
        x0,
        y0,
        (x0 + x1) / 2.0,
        (y0 + y1) / 2.0,
        mx,
        my,
        true,
      );
      self.add_tessellated_curve(
        flatness,
        mx,
        my,
        (x1 + x2) / 2.0,
        (y1 + y2) / 2.0,
        x2,
        y2,
        emit_end,
      );
    } else if emit_end {
      self.add_vertex(x2, y2, true);
    }
  }
}
