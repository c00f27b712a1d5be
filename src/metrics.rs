//! Font and glyph metrics
//!
//! All values are in font design units and must be scaled by
//! `pixel_size / (ascent - descent)` (or whatever em mapping the caller
//! chooses) before they mean anything on screen.

/// Vertical metrics shared by every glyph of a typeface
///
/// Extracted from the `hhea` table. `descent` is typically negative, so
/// `height()` is the full ascender-to-descender extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
  /// Maximum height above the baseline (positive)
  pub ascent: f32,
  /// Maximum depth below the baseline (usually negative)
  pub descent: f32,
  /// Extra spacing between lines beyond ascent and descent
  pub line_gap: f32,
}

impl FontMetrics {
  /// Ascender-to-descender extent
  pub fn height(&self) -> f32 {
    self.ascent - self.descent
  }

  /// Baseline-to-baseline distance
  pub fn linespace(&self) -> f32 {
    self.height() + self.line_gap
  }

  /// Metrics uniformly scaled by `s`
  pub fn scaled(&self, s: f32) -> FontMetrics {
    FontMetrics {
      ascent: self.ascent * s,
      descent: self.descent * s,
      line_gap: self.line_gap * s,
    }
  }
}

/// Horizontal metrics and bounds for a single glyph
///
/// Advance and left side bearing come from the `hmtx` table; the bounding
/// box comes from the glyph's own header in `glyf`. Glyphs without an
/// outline (such as a space) report a zero box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
  /// Distance from the pen position to the outline's left edge
  pub left_side_bearing: f32,
  /// Pen advance to the next glyph
  pub advance: f32,
  pub x_min: f32,
  pub y_min: f32,
  pub x_max: f32,
  pub y_max: f32,
}

impl GlyphMetrics {
  /// Metrics uniformly scaled by `s`
  pub fn scaled(&self, s: f32) -> GlyphMetrics {
    GlyphMetrics {
      left_side_bearing: self.left_side_bearing * s,
      advance: self.advance * s,
      x_min: self.x_min * s,
      y_min: self.y_min * s,
      x_max: self.x_max * s,
      y_max: self.y_max * s,
    }
  }
}
