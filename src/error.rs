//! Error types for fastglyph
//!
//! Font parsing has exactly one failure surface: the byte buffer handed to
//! [`Typeface::new`](crate::Typeface::new) does not describe a font this
//! crate can read. Everything after construction degrades instead of
//! failing: unknown codepoints map to glyph 0, unreadable glyphs come back
//! as empty shapes, and kerning lookups for absent pairs return 0.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use crate::font::Tag;
use thiserror::Error;

/// Result type alias for fastglyph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for fastglyph
///
/// Font parsing is the crate's only fallible subsystem, so this wraps
/// [`FontError`] and nothing else; the variant keeps the door open for
/// sibling subsystems without changing caller signatures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
  /// Font parsing error
  #[error(transparent)]
  Font(#[from] FontError),
}

/// Errors raised while reading a font file
///
/// These surface from `Typeface::new` when the buffer is not a usable
/// TrueType font. They are also produced internally by per-glyph decoding,
/// where the policy is to swallow them and return an empty shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
  /// A typed read ran past the end of the font data
  #[error("unexpected end of font data: {len} byte read at offset {offset}")]
  UnexpectedEof { offset: usize, len: usize },

  /// A table required for glyph extraction is absent
  #[error("required table '{0}' is missing")]
  MissingTable(Tag),

  /// The cmap table has no subtable for a supported platform/encoding
  #[error("no usable character-to-glyph subtable")]
  NoCharacterMap,

  /// The selected cmap subtable uses a format other than 0, 4 or 6
  #[error("unsupported cmap subtable format {0}")]
  UnsupportedCmapFormat(u16),

  /// `indexToLocFormat` in the head table is neither 0 nor 1
  #[error("unsupported index-to-location format {0}")]
  UnsupportedLocaFormat(u16),

  /// Composite glyph nesting exceeded the recursion limit
  #[error("composite recursion limit reached at glyph {0}")]
  RecursionLimit(u16),
}
