//! Formula/text typesetting seam.
//!
//! The engine never shapes glyphs itself; it only needs each payload split into keyed
//! fragments with an approximate footprint so layout and transform-matching have something
//! stable to work with. [`TokenTypesetter`] is the built-in implementation.

mod tokens;

use crate::foundation::error::KinetexResult;
use crate::scene::payload::Payload;

pub use tokens::TokenTypesetter;
pub(crate) use tokens::{layout_tokens, validate_font_size, word_tokens};

/// Consumed typesetting engine: turns markup into a payload with keyed substructure.
pub trait Typesetter: Send + Sync {
    /// Lay out formula markup at `font_size`.
    ///
    /// Fragment keys must be stable across calls so two formulas sharing a sub-expression
    /// produce equal keys for it.
    fn layout_formula(&self, source: &str, font_size: f64) -> KinetexResult<Payload>;
}

/// Glyph box height in scene units for a font size.
pub(crate) fn glyph_height(font_size: f64) -> f64 {
    font_size / 100.0
}

/// Horizontal advance of one glyph in scene units.
pub(crate) fn glyph_advance(font_size: f64) -> f64 {
    glyph_height(font_size) * 0.55
}
