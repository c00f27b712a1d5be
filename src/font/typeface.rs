//! TrueType typeface parsing
//!
//! Parses the sfnt container and answers the four questions a text
//! renderer asks of a font: which glyph a codepoint maps to (`cmap`),
//! what outline a glyph has (`loca` + `glyf`), how wide it is (`hmtx` +
//! `hhea`), and how a glyph pair kerns (`kern`).
//!
//! All table walking happens once, in [`Typeface::new`]. The constructor
//! resolves which `cmap` subtable format and which `loca` index width the
//! font uses and stores both as enums; lookups just match on them. After
//! construction a typeface is immutable and can be queried from any number
//! of threads.

use crate::error::{FontError, Result};
use crate::font::data::{EncodingRecord, FontData, GlyphHeader, Tag, TableRecord};
use crate::geometry::{BBox, Transform};
use crate::metrics::{FontMetrics, GlyphMetrics};
use crate::shape::Shape;
use rustc_hash::FxHashMap;
use std::sync::Arc;

// Simple glyph flag bits.
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

// Composite glyph flag bits.
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_WINDOWS: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_UNICODE_FULL: u16 = 10;

/// Divisor turning an F2Dot14 component scale into a float
const F2DOT14_UNIT: f32 = 16384.0;

/// Composite nesting bound; real fonts stay in single digits
const MAX_COMPOSITE_DEPTH: usize = 32;

/// The cmap subtable chosen at construction, tagged by its format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmapSubtable {
  /// Format 0: one byte per codepoint
  ByteEncoding(usize),
  /// Format 4: segment-mapped BMP coverage
  SegmentMapped(usize),
  /// Format 6: a single trimmed codepoint range
  Trimmed(usize),
}

/// Width of the entries in the loca table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocaFormat {
  /// 16-bit offsets, doubled on use
  Short,
  /// 32-bit offsets
  Long,
}

/// A parsed TrueType font
///
/// Owns the font bytes behind an `Arc`; cloning a typeface shares the
/// buffer. Queries never fail loudly; see the crate error policy.
///
/// # Examples
///
/// ```no_run
/// use fastglyph::Typeface;
///
/// let bytes: Vec<u8> = std::fs::read("font.ttf").unwrap();
/// let face = Typeface::new(bytes).unwrap();
/// let gid = face.glyph_index('A' as u32);
/// let outline = face.glyph_shape(gid);
/// ```
#[derive(Clone)]
pub struct Typeface {
  data: Arc<FontData>,
  cmap: CmapSubtable,
  loca_format: LocaFormat,
  loca: usize,
  glyf: usize,
  hmtx: Option<usize>,
  num_glyphs: u16,
  number_of_h_metrics: u16,
  font_metrics: FontMetrics,
  kerning: FxHashMap<u16, FxHashMap<u16, f32>>,
}

impl Typeface {
  /// Parses a font from its raw file bytes
  ///
  /// Fails when the buffer is not an sfnt container with the tables glyph
  /// extraction needs (`cmap`, `head`, `glyf`, `loca`), or when the font
  /// uses a cmap or loca format this crate does not read.
  pub fn new(bytes: Vec<u8>) -> Result<Self> {
    let data = Arc::new(FontData::new(bytes));

    let required = |tag: Tag| -> Result<usize> {
      Ok(find_table(&data, tag)?.ok_or(FontError::MissingTable(tag))?)
    };
    let cmap = required(Tag::CMAP)?;
    let head = required(Tag::HEAD)?;
    let glyf = required(Tag::GLYF)?;
    let loca = required(Tag::LOCA)?;
    let hmtx = find_table(&data, Tag::HMTX)?;
    let hhea = find_table(&data, Tag::HHEA)?;
    let maxp = find_table(&data, Tag::MAXP)?;
    let kern = find_table(&data, Tag::KERN)?;

    let cmap = select_cmap_subtable(&data, cmap)?;

    let loca_format = match data.read_u16(head + 50)? {
      0 => LocaFormat::Short,
      1 => LocaFormat::Long,
      format => return Err(FontError::UnsupportedLocaFormat(format).into()),
    };

    // Without maxp the glyph count is unknown; stay permissive and let
    // loca bounds checking reject bad indices.
    let num_glyphs = match maxp {
      Some(maxp) => data.read_u16(maxp + 4)?,
      None => 0xFFFF,
    };

    let mut font_metrics = FontMetrics::default();
    let mut number_of_h_metrics = 0;
    if let Some(hhea) = hhea {
      font_metrics = FontMetrics {
        ascent: data.read_i16(hhea + 4)? as f32,
        descent: data.read_i16(hhea + 6)? as f32,
        line_gap: data.read_i16(hhea + 8)? as f32,
      };
      number_of_h_metrics = data.read_u16(hhea + 34)?;
    }

    let kerning = match kern {
      Some(kern) => parse_kerning(&data, kern)?,
      None => FxHashMap::default(),
    };

    Ok(Self {
      data,
      cmap,
      loca_format,
      loca,
      glyf,
      hmtx,
      num_glyphs,
      number_of_h_metrics,
      font_metrics,
      kerning,
    })
  }

  /// The sfnt version word at the font base
  pub fn version(&self) -> u32 {
    self.data.read_u32(0).unwrap_or(0)
  }

  /// Number of glyphs the font declares (0xFFFF when maxp is absent)
  pub fn num_glyphs(&self) -> u16 {
    self.num_glyphs
  }

  /// Maps a Unicode codepoint to a glyph index
  ///
  /// Unmapped codepoints return 0, the `.notdef` glyph.
  pub fn glyph_index(&self, codepoint: u32) -> u16 {
    self.try_glyph_index(codepoint).unwrap_or(0)
  }

  /// Extracts a glyph's outline
  ///
  /// Returns an empty shape for absent glyphs, glyph indices past the
  /// glyph count, and glyphs whose records cannot be read.
  pub fn glyph_shape(&self, glyph_index: u16) -> Shape {
    let mut visited = Vec::new();
    self
      .glyph_shape_impl(glyph_index, 0, &mut visited)
      .unwrap_or_default()
  }

  /// Horizontal metrics and bounding box for one glyph
  pub fn glyph_metrics(&self, glyph_index: u16) -> GlyphMetrics {
    self.try_glyph_metrics(glyph_index).unwrap_or_default()
  }

  /// The font-wide vertical metrics from `hhea`
  pub fn metrics(&self) -> &FontMetrics {
    &self.font_metrics
  }

  /// Kerning adjustment for a glyph pair, 0 when none is defined
  pub fn kerning(&self, left: u16, right: u16) -> f32 {
    self
      .kerning
      .get(&left)
      .and_then(|pairs| pairs.get(&right))
      .copied()
      .unwrap_or(0.0)
  }

  fn try_glyph_index(&self, codepoint: u32) -> Result<u16> {
    match self.cmap {
      CmapSubtable::ByteEncoding(at) => self.byte_encoding_index(at, codepoint),
      CmapSubtable::SegmentMapped(at) => self.segment_mapped_index(at, codepoint),
      CmapSubtable::Trimmed(at) => self.trimmed_index(at, codepoint),
    }
  }

  fn byte_encoding_index(&self, at: usize, codepoint: u32) -> Result<u16> {
    let length = self.data.read_u16(at + 2)? as u32;
    if codepoint < length.saturating_sub(6) {
      Ok(self.data.read_u8(at + 6 + codepoint as usize)? as u16)
    } else {
      Ok(0)
    }
  }

  fn segment_mapped_index(&self, at: usize, codepoint: u32) -> Result<u16> {
    if codepoint > 0xFFFF {
      // Format 4 only covers the basic multilingual plane.
      return Ok(0);
    }
    let cp = codepoint as u16;
    let d = &self.data;

    let seg_count = (d.read_u16(at + 6)? >> 1) as usize;
    let mut search_range = d.read_u16(at + 8)? as usize;
    let mut entry_selector = d.read_u16(at + 10)?;
    let range_shift = d.read_u16(at + 12)? as usize;

    // The table is laid out for this exact power-of-two search: start at
    // endCode[], optionally shift past the non-power-of-two tail, then
    // halve searchRange entrySelector times.
    let end_codes = at + 14;
    let mut search = end_codes;
    if cp > d.read_u16(search + range_shift)? {
      search += range_shift;
    }
    search -= 2;
    while entry_selector > 0 {
      search_range >>= 1;
      if cp > d.read_u16(search + search_range)? {
        search += search_range;
      }
      entry_selector -= 1;
    }
    search += 2;

    let item = (search - end_codes) >> 1;
    let start = d.read_u16(end_codes + seg_count * 2 + 2 + 2 * item)?;
    if cp < start {
      return Ok(0);
    }

    let range_offset = d.read_u16(end_codes + seg_count * 6 + 2 + 2 * item)? as usize;
    if range_offset == 0 {
      let delta = d.read_u16(end_codes + seg_count * 4 + 2 + 2 * item)?;
      return Ok(cp.wrapping_add(delta));
    }

    // idRangeOffset is relative to its own position inside the table.
    d.read_u16(end_codes + range_offset + (cp - start) as usize * 2 + seg_count * 6 + 2 + 2 * item)
  }

  fn trimmed_index(&self, at: usize, codepoint: u32) -> Result<u16> {
    let first = self.data.read_u16(at + 6)? as u32;
    let count = self.data.read_u16(at + 8)? as u32;
    if codepoint >= first && codepoint < first + count {
      self.data.read_u16(at + 10 + (codepoint - first) as usize * 2)
    } else {
      Ok(0)
    }
  }

  /// Offset of a glyph's record in glyf, `None` when the glyph is empty
  fn glyph_offset(&self, glyph_index: u16) -> Result<Option<usize>> {
    if glyph_index >= self.num_glyphs {
      return Ok(None);
    }
    let (this, next) = match self.loca_format {
      LocaFormat::Short => {
        let at = self.loca + glyph_index as usize * 2;
        (
          self.data.read_u16(at)? as usize * 2,
          self.data.read_u16(at + 2)? as usize * 2,
        )
      }
      LocaFormat::Long => {
        let at = self.loca + glyph_index as usize * 4;
        (
          self.data.read_u32(at)? as usize,
          self.data.read_u32(at + 4)? as usize,
        )
      }
    };
    // Equal consecutive offsets mean the glyph has no outline.
    Ok(if this == next { None } else { Some(self.glyf + this) })
  }

  fn glyph_shape_impl(
    &self,
    glyph_index: u16,
    depth: usize,
    visited: &mut Vec<u16>,
  ) -> Result<Shape> {
    if depth > MAX_COMPOSITE_DEPTH {
      return Err(FontError::RecursionLimit(glyph_index).into());
    }
    let Some(offset) = self.glyph_offset(glyph_index)? else {
      return Ok(Shape::new());
    };
    let header = self.data.read_glyph_header(offset)?;
    if header.number_of_contours > 0 {
      self.simple_glyph_shape(offset, &header)
    } else if header.number_of_contours < 0 {
      self.composite_glyph_shape(offset, glyph_index, depth, visited)
    } else {
      Ok(Shape::new())
    }
  }

  fn simple_glyph_shape(&self, offset: usize, header: &GlyphHeader) -> Result<Shape> {
    let num_contours = header.number_of_contours as usize;
    let end_pts_offset = offset + GlyphHeader::SIZE;
    let instruction_length = self.data.read_u16(end_pts_offset + num_contours * 2)? as usize;

    let mut end_pts = self.data.cursor(end_pts_offset);
    let mut points = self
      .data
      .cursor(end_pts_offset + num_contours * 2 + 2 + instruction_length);

    let num_points = end_pts.peek_u16((num_contours - 1) * 2)? as usize + 1;

    // Flags, expanded through the repeat mechanism.
    let mut flags = Vec::with_capacity(num_points);
    let mut repeat = 0u8;
    let mut current = 0u8;
    for _ in 0..num_points {
      if repeat == 0 {
        current = points.read_u8()?;
        if current & REPEAT_FLAG != 0 {
          repeat = points.read_u8()?;
        }
      } else {
        repeat -= 1;
      }
      flags.push(current);
    }

    // Coordinates are deltas against the previous point, x array first.
    let mut xs = Vec::with_capacity(num_points);
    let mut x = 0i16;
    for &f in &flags {
      if f & X_SHORT_VECTOR != 0 {
        let d = points.read_u8()? as i16;
        x = x.wrapping_add(if f & X_IS_SAME_OR_POSITIVE != 0 { d } else { -d });
      } else if f & X_IS_SAME_OR_POSITIVE == 0 {
        x = x.wrapping_add(points.read_i16()?);
      }
      xs.push(x);
    }

    let mut ys = Vec::with_capacity(num_points);
    let mut y = 0i16;
    for &f in &flags {
      if f & Y_SHORT_VECTOR != 0 {
        let d = points.read_u8()? as i16;
        y = y.wrapping_add(if f & Y_IS_SAME_OR_POSITIVE != 0 { d } else { -d });
      } else if f & Y_IS_SAME_OR_POSITIVE == 0 {
        y = y.wrapping_add(points.read_i16()?);
      }
      ys.push(y);
    }

    let mut shape = Shape::with_bounds(
      BBox::new(
        header.x_min as f32,
        header.y_min as f32,
        header.x_max as f32,
        header.y_max as f32,
      ),
      num_contours,
    );

    let mut next_contour = 0usize;
    for i in 0..num_points {
      if i == next_contour {
        next_contour = end_pts.read_u16()? as usize + 1;
        shape.add_contour_with_capacity(next_contour.saturating_sub(i));
      }
      shape.add_vertex(xs[i] as f32, ys[i] as f32, flags[i] & ON_CURVE_POINT != 0);
    }

    Ok(shape)
  }

  fn composite_glyph_shape(
    &self,
    offset: usize,
    glyph_index: u16,
    depth: usize,
    visited: &mut Vec<u16>,
  ) -> Result<Shape> {
    let mut stream = self.data.cursor(offset + GlyphHeader::SIZE);
    let mut result = Shape::new();
    visited.push(glyph_index);

    let mut flags = MORE_COMPONENTS;
    while flags & MORE_COMPONENTS != 0 {
      flags = stream.read_u16()?;
      let component = stream.read_u16()?;

      let mut t = Transform::IDENTITY;
      if flags & ARGS_ARE_XY_VALUES != 0 {
        if flags & ARG_1_AND_2_ARE_WORDS != 0 {
          t.tx = stream.read_i16()? as f32;
          t.ty = stream.read_i16()? as f32;
        } else {
          t.tx = stream.read_i8()? as f32;
          t.ty = stream.read_i8()? as f32;
        }
      } else if flags & ARG_1_AND_2_ARE_WORDS != 0 {
        // Attach-point positioning: the arguments index a point in the
        // assembled parent and one in the child. The indices are consumed
        // but the alignment is not applied, so the component lands
        // untranslated.
        let _parent_point = stream.read_u16()?;
        let _child_point = stream.read_u16()?;
      } else {
        let _parent_point = stream.read_u8()?;
        let _child_point = stream.read_u8()?;
      }

      if flags & WE_HAVE_A_SCALE != 0 {
        let s = stream.read_i16()? as f32 / F2DOT14_UNIT;
        t.m00 = s;
        t.m11 = s;
      } else if flags & WE_HAVE_X_AND_Y_SCALE != 0 {
        t.m00 = stream.read_i16()? as f32 / F2DOT14_UNIT;
        t.m11 = stream.read_i16()? as f32 / F2DOT14_UNIT;
      } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
        // Stored order: xscale, scale01, scale10, yscale; scale01 feeds
        // output y from input x.
        t.m00 = stream.read_i16()? as f32 / F2DOT14_UNIT;
        t.m10 = stream.read_i16()? as f32 / F2DOT14_UNIT;
        t.m01 = stream.read_i16()? as f32 / F2DOT14_UNIT;
        t.m11 = stream.read_i16()? as f32 / F2DOT14_UNIT;
      }

      if visited.contains(&component) {
        // Self-referential composite. Drop the component and keep what
        // has been assembled so far.
        continue;
      }
      let child = self.glyph_shape_impl(component, depth + 1, visited)?;
      result.add_shape(&child, &t);
    }

    visited.pop();
    Ok(result)
  }

  fn try_glyph_metrics(&self, glyph_index: u16) -> Result<GlyphMetrics> {
    let mut m = GlyphMetrics::default();

    if let Some(hmtx) = self.hmtx {
      if glyph_index < self.number_of_h_metrics {
        let at = hmtx + glyph_index as usize * 4;
        m.advance = self.data.read_u16(at)? as f32;
        m.left_side_bearing = self.data.read_i16(at + 2)? as f32;
      } else if self.number_of_h_metrics > 0 {
        // Past the long metrics the advance repeats the last entry and
        // only bare side bearings are stored.
        let last = hmtx + (self.number_of_h_metrics as usize - 1) * 4;
        m.advance = self.data.read_u16(last)? as f32;
        let lsb_at = hmtx
          + self.number_of_h_metrics as usize * 4
          + (glyph_index - self.number_of_h_metrics) as usize * 2;
        m.left_side_bearing = self.data.read_i16(lsb_at)? as f32;
      }
    }

    if let Some(offset) = self.glyph_offset(glyph_index)? {
      m.x_min = self.data.read_i16(offset + 2)? as f32;
      m.y_min = self.data.read_i16(offset + 4)? as f32;
      m.x_max = self.data.read_i16(offset + 6)? as f32;
      m.y_max = self.data.read_i16(offset + 8)? as f32;
    }

    Ok(m)
  }
}

fn find_table(data: &FontData, tag: Tag) -> Result<Option<usize>> {
  let num_tables = data.read_u16(4)?;
  for i in 0..num_tables as usize {
    let record = data.read_table_record(12 + i * TableRecord::SIZE)?;
    if record.tag == tag {
      return Ok(Some(record.offset as usize));
    }
  }
  Ok(None)
}

fn select_cmap_subtable(data: &FontData, cmap: usize) -> Result<CmapSubtable> {
  let num_records = data.read_u16(cmap + 2)?;

  // Later records win so a full-repertoire Windows subtable overrides an
  // earlier BMP-only one.
  let mut selected: Option<usize> = None;
  for i in 0..num_records as usize {
    let record = data.read_encoding_record(cmap + 4 + i * EncodingRecord::SIZE)?;
    match record.platform_id {
      PLATFORM_WINDOWS => {
        if record.encoding_id == WINDOWS_UNICODE_BMP
          || record.encoding_id == WINDOWS_UNICODE_FULL
        {
          selected = Some(cmap + record.subtable_offset as usize);
        }
      }
      PLATFORM_UNICODE => selected = Some(cmap + record.subtable_offset as usize),
      _ => {}
    }
  }
  let at = selected.ok_or(FontError::NoCharacterMap)?;

  match data.read_u16(at)? {
    0 => Ok(CmapSubtable::ByteEncoding(at)),
    4 => Ok(CmapSubtable::SegmentMapped(at)),
    6 => Ok(CmapSubtable::Trimmed(at)),
    format => Err(FontError::UnsupportedCmapFormat(format).into()),
  }
}

fn parse_kerning(data: &FontData, kern: usize) -> Result<FxHashMap<u16, FxHashMap<u16, f32>>> {
  let mut map = FxHashMap::default();

  let version = data.read_u16(kern)?;
  let n_tables = data.read_u16(kern + 2)?;
  if version != 0 || n_tables == 0 {
    return Ok(map);
  }

  // First horizontal format-0 subtable wins.
  let mut offset = kern + 4;
  let mut subtable = None;
  for _ in 0..n_tables {
    let sub_version = data.read_u16(offset)?;
    let length = data.read_u16(offset + 2)? as usize;
    let coverage = data.read_u16(offset + 4)?;
    let format = coverage >> 8;
    let horizontal = coverage & 1 != 0;
    if sub_version == 0 && format == 0 && horizontal {
      subtable = Some(offset);
      break;
    }
    if length == 0 {
      break;
    }
    offset += length;
  }
  let Some(subtable) = subtable else {
    return Ok(map);
  };

  let n_pairs = data.read_u16(subtable + 6)?;
  let mut stream = data.cursor(subtable + 14);
  for _ in 0..n_pairs {
    let left = stream.read_u16()?;
    let right = stream.read_u16()?;
    let value = stream.read_i16()?;
    map
      .entry(left)
      .or_insert_with(FxHashMap::default)
      .insert(right, value as f32);
  }

  Ok(map)
}
