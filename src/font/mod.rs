//! TrueType font container parsing
//!
//! [`data`] owns the byte-level view of an sfnt file; [`typeface`] builds
//! the queryable font on top of it.

pub mod data;
pub mod typeface;

pub use data::{Cursor, EncodingRecord, FontData, GlyphHeader, TableRecord, Tag};
pub use typeface::Typeface;
