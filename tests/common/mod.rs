//! In-memory font assembly for integration tests
//!
//! Builds just enough of an sfnt container to exercise the parser: a
//! table directory plus hand-assembled `cmap`, `head`, `maxp`, `hhea`,
//! `hmtx`, `loca`, `glyf` and `kern` tables. All values are big-endian,
//! matching the format on disk.

#![allow(dead_code)]

/// Assembles a font file from raw table bodies
pub struct FontBuilder {
  tables: Vec<([u8; 4], Vec<u8>)>,
}

impl FontBuilder {
  pub fn new() -> Self {
    Self { tables: Vec::new() }
  }

  pub fn table(mut self, tag: &[u8; 4], body: Vec<u8>) -> Self {
    self.tables.push((*tag, body));
    self
  }

  pub fn build(self) -> Vec<u8> {
    let n = self.tables.len();
    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // sfnt version
    out.extend_from_slice(&(n as u16).to_be_bytes());
    out.extend_from_slice(&[0u8; 6]); // search fields, unused by the parser

    let mut offset = 12 + 16 * n;
    for (tag, body) in &self.tables {
      out.extend_from_slice(tag);
      out.extend_from_slice(&0u32.to_be_bytes()); // checksum
      out.extend_from_slice(&(offset as u32).to_be_bytes());
      out.extend_from_slice(&(body.len() as u32).to_be_bytes());
      offset += body.len();
    }
    for (_, body) in &self.tables {
      out.extend_from_slice(body);
    }
    out
  }
}

pub fn head(index_to_loc_format: i16) -> Vec<u8> {
  let mut t = vec![0u8; 54];
  t[50..52].copy_from_slice(&index_to_loc_format.to_be_bytes());
  t
}

pub fn maxp(num_glyphs: u16) -> Vec<u8> {
  let mut t = vec![0u8; 6];
  t[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
  t[4..6].copy_from_slice(&num_glyphs.to_be_bytes());
  t
}

pub fn hhea(ascent: i16, descent: i16, line_gap: i16, number_of_h_metrics: u16) -> Vec<u8> {
  let mut t = vec![0u8; 36];
  t[4..6].copy_from_slice(&ascent.to_be_bytes());
  t[6..8].copy_from_slice(&descent.to_be_bytes());
  t[8..10].copy_from_slice(&line_gap.to_be_bytes());
  t[34..36].copy_from_slice(&number_of_h_metrics.to_be_bytes());
  t
}

/// Long metrics for the first glyphs, bare side bearings for the rest
pub fn hmtx(long_metrics: &[(u16, i16)], extra_lsbs: &[i16]) -> Vec<u8> {
  let mut t = Vec::new();
  for &(advance, lsb) in long_metrics {
    t.extend_from_slice(&advance.to_be_bytes());
    t.extend_from_slice(&lsb.to_be_bytes());
  }
  for &lsb in extra_lsbs {
    t.extend_from_slice(&lsb.to_be_bytes());
  }
  t
}

/// Wraps one subtable in a cmap table with a single encoding record
pub fn cmap(platform_id: u16, encoding_id: u16, subtable: Vec<u8>) -> Vec<u8> {
  cmap_multi(&[(platform_id, encoding_id, subtable)])
}

/// A cmap table with several encoding records
pub fn cmap_multi(records: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
  let n = records.len();
  let mut t = Vec::new();
  t.extend_from_slice(&0u16.to_be_bytes()); // version
  t.extend_from_slice(&(n as u16).to_be_bytes());
  let mut offset = 4 + 8 * n;
  for (platform_id, encoding_id, subtable) in records {
    t.extend_from_slice(&platform_id.to_be_bytes());
    t.extend_from_slice(&encoding_id.to_be_bytes());
    t.extend_from_slice(&(offset as u32).to_be_bytes());
    offset += subtable.len();
  }
  for (_, _, subtable) in records {
    t.extend_from_slice(subtable);
  }
  t
}

/// Format 0 subtable mapping byte codepoints through a 256-entry array
pub fn cmap_format0(mapping: &[(u8, u8)]) -> Vec<u8> {
  let mut t = Vec::new();
  t.extend_from_slice(&0u16.to_be_bytes()); // format
  t.extend_from_slice(&262u16.to_be_bytes()); // length
  t.extend_from_slice(&0u16.to_be_bytes()); // language
  let mut ids = [0u8; 256];
  for &(cp, gid) in mapping {
    ids[cp as usize] = gid;
  }
  t.extend_from_slice(&ids);
  t
}

/// Format 4 subtable from `(start, end, id_delta)` segments
///
/// Segments get `idRangeOffset == 0`; the mandatory terminal 0xFFFF
/// segment is appended automatically.
pub fn cmap_format4(segments: &[(u16, u16, i16)]) -> Vec<u8> {
  let mut segs: Vec<(u16, u16, u16)> = segments
    .iter()
    .map(|&(start, end, delta)| (start, end, delta as u16))
    .collect();
  segs.push((0xFFFF, 0xFFFF, 1)); // maps 0xFFFF to glyph 0

  let seg_count = segs.len() as u16;
  let mut pow = 1u16;
  let mut entry_selector = 0u16;
  while pow * 2 <= seg_count {
    pow *= 2;
    entry_selector += 1;
  }
  let search_range = pow * 2;
  let range_shift = seg_count * 2 - search_range;
  let length = 16 + 8 * seg_count;

  let mut t = Vec::new();
  t.extend_from_slice(&4u16.to_be_bytes());
  t.extend_from_slice(&length.to_be_bytes());
  t.extend_from_slice(&0u16.to_be_bytes()); // language
  t.extend_from_slice(&(seg_count * 2).to_be_bytes());
  t.extend_from_slice(&search_range.to_be_bytes());
  t.extend_from_slice(&entry_selector.to_be_bytes());
  t.extend_from_slice(&range_shift.to_be_bytes());
  for &(_, end, _) in &segs {
    t.extend_from_slice(&end.to_be_bytes());
  }
  t.extend_from_slice(&0u16.to_be_bytes()); // reserved pad
  for &(start, _, _) in &segs {
    t.extend_from_slice(&start.to_be_bytes());
  }
  for &(_, _, delta) in &segs {
    t.extend_from_slice(&delta.to_be_bytes());
  }
  for _ in &segs {
    t.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset
  }
  t
}

/// Format 6 subtable covering `first..first + glyphs.len()`
pub fn cmap_format6(first: u16, glyphs: &[u16]) -> Vec<u8> {
  let mut t = Vec::new();
  t.extend_from_slice(&6u16.to_be_bytes());
  t.extend_from_slice(&((10 + 2 * glyphs.len()) as u16).to_be_bytes());
  t.extend_from_slice(&0u16.to_be_bytes()); // language
  t.extend_from_slice(&first.to_be_bytes());
  t.extend_from_slice(&(glyphs.len() as u16).to_be_bytes());
  for gid in glyphs {
    t.extend_from_slice(&gid.to_be_bytes());
  }
  t
}

/// A subtable with an arbitrary (possibly unsupported) format word
pub fn cmap_raw_format(format: u16) -> Vec<u8> {
  let mut t = Vec::new();
  t.extend_from_slice(&format.to_be_bytes());
  t.extend_from_slice(&[0u8; 14]);
  t
}

/// A simple glyph record; every coordinate is stored as a 16-bit delta
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> Vec<u8> {
  let points: Vec<(i16, i16, bool)> = contours.iter().flat_map(|c| c.iter().copied()).collect();
  assert!(!points.is_empty());

  let x_min = points.iter().map(|p| p.0).min().unwrap();
  let x_max = points.iter().map(|p| p.0).max().unwrap();
  let y_min = points.iter().map(|p| p.1).min().unwrap();
  let y_max = points.iter().map(|p| p.1).max().unwrap();

  let mut t = Vec::new();
  t.extend_from_slice(&(contours.len() as i16).to_be_bytes());
  t.extend_from_slice(&x_min.to_be_bytes());
  t.extend_from_slice(&y_min.to_be_bytes());
  t.extend_from_slice(&x_max.to_be_bytes());
  t.extend_from_slice(&y_max.to_be_bytes());

  let mut end = 0usize;
  for c in contours {
    end += c.len();
    t.extend_from_slice(&((end - 1) as u16).to_be_bytes());
  }
  t.extend_from_slice(&0u16.to_be_bytes()); // instruction length

  for &(_, _, on_curve) in &points {
    t.push(if on_curve { 0x01 } else { 0x00 });
  }
  let mut prev = 0i16;
  for &(x, _, _) in &points {
    t.extend_from_slice(&x.wrapping_sub(prev).to_be_bytes());
    prev = x;
  }
  prev = 0;
  for &(_, y, _) in &points {
    t.extend_from_slice(&y.wrapping_sub(prev).to_be_bytes());
    prev = y;
  }
  t
}

/// A composite glyph record from `(child, dx, dy)` components
pub fn composite_glyph(bbox: (i16, i16, i16, i16), components: &[(u16, i16, i16)]) -> Vec<u8> {
  const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
  const ARGS_ARE_XY_VALUES: u16 = 0x0002;
  const MORE_COMPONENTS: u16 = 0x0020;

  let mut t = Vec::new();
  t.extend_from_slice(&(-1i16).to_be_bytes());
  t.extend_from_slice(&bbox.0.to_be_bytes());
  t.extend_from_slice(&bbox.1.to_be_bytes());
  t.extend_from_slice(&bbox.2.to_be_bytes());
  t.extend_from_slice(&bbox.3.to_be_bytes());

  for (i, &(child, dx, dy)) in components.iter().enumerate() {
    let mut flags = ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES;
    if i + 1 < components.len() {
      flags |= MORE_COMPONENTS;
    }
    t.extend_from_slice(&flags.to_be_bytes());
    t.extend_from_slice(&child.to_be_bytes());
    t.extend_from_slice(&dx.to_be_bytes());
    t.extend_from_slice(&dy.to_be_bytes());
  }
  t
}

/// Builds matching loca + glyf tables; `short` selects the loca format
///
/// Glyph records are padded to even length so short offsets stay exact.
pub fn loca_and_glyf(glyphs: &[Vec<u8>], short: bool) -> (Vec<u8>, Vec<u8>) {
  let mut glyf = Vec::new();
  let mut offsets = vec![0u32];
  for g in glyphs {
    glyf.extend_from_slice(g);
    if glyf.len() % 2 != 0 {
      glyf.push(0);
    }
    offsets.push(glyf.len() as u32);
  }

  let mut loca = Vec::new();
  for &o in &offsets {
    if short {
      loca.extend_from_slice(&((o / 2) as u16).to_be_bytes());
    } else {
      loca.extend_from_slice(&o.to_be_bytes());
    }
  }
  (loca, glyf)
}

/// A version-0 kern table with one horizontal format-0 subtable
pub fn kern(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
  let mut t = Vec::new();
  t.extend_from_slice(&0u16.to_be_bytes()); // table version
  t.extend_from_slice(&1u16.to_be_bytes()); // one subtable

  let length = (14 + 6 * pairs.len()) as u16;
  t.extend_from_slice(&0u16.to_be_bytes()); // subtable version
  t.extend_from_slice(&length.to_be_bytes());
  t.extend_from_slice(&0x0001u16.to_be_bytes()); // coverage: horizontal, format 0
  t.extend_from_slice(&(pairs.len() as u16).to_be_bytes());
  t.extend_from_slice(&[0u8; 6]); // search fields, unread
  for &(left, right, value) in pairs {
    t.extend_from_slice(&left.to_be_bytes());
    t.extend_from_slice(&right.to_be_bytes());
    t.extend_from_slice(&value.to_be_bytes());
  }
  t
}

/// The font most parse tests share
///
/// Four glyphs: 0 is empty, 1 is a 50×50 square with a curve-free
/// contour, 2 is a smaller triangle, 3 is a composite placing glyph 2 at
/// (100, 0). Codepoints A–Z map to glyphs 1–26 via a format 4 segment.
pub fn standard_font(short_loca: bool) -> Vec<u8> {
  let square: &[(i16, i16, bool)] = &[(0, 0, true), (50, 0, true), (50, 50, true), (0, 50, true)];
  let triangle: &[(i16, i16, bool)] = &[(0, 0, true), (50, 0, true), (25, 50, true)];
  let glyphs = vec![
    Vec::new(), // .notdef, no outline
    simple_glyph(&[square]),
    simple_glyph(&[triangle]),
    composite_glyph((100, 0, 150, 50), &[(2, 100, 0)]),
  ];
  let (loca, glyf) = loca_and_glyf(&glyphs, short_loca);

  FontBuilder::new()
    .table(b"cmap", cmap(3, 1, cmap_format4(&[(65, 90, -64)])))
    .table(b"head", head(if short_loca { 0 } else { 1 }))
    .table(b"maxp", maxp(4))
    .table(b"hhea", hhea(800, -200, 100, 2))
    .table(b"hmtx", hmtx(&[(500, 10), (600, 20)], &[30, 40]))
    .table(b"loca", loca)
    .table(b"glyf", glyf)
    .table(b"kern", kern(&[(1, 2, -50)]))
    .build()
}
