//! Rendered width of pin labels.
//!
//! Widths are in grid units (mil) for KiCad's default 50 mil pin-name font,
//! one entry per printable ASCII glyph from `' '` to `'~'`.

use crate::pin::PinRecord;
use crate::SymbolError;

#[rustfmt::skip]
const GLYPH_WIDTHS: [i64; 95] = [
    // ' ' to '/'
    38, 24, 38, 50, 48, 57, 62, 24, 33, 33, 38, 62, 24, 62, 24, 52,
    // '0' to '?'
    48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 24, 24, 62, 62, 62, 43,
    // '@' to 'O'
    64, 43, 50, 50, 50, 45, 43, 50, 52, 24, 38, 50, 40, 57, 52, 52,
    // 'P' to '_'
    50, 52, 50, 48, 38, 52, 43, 57, 48, 43, 48, 33, 33, 33, 29, 38,
    // '`' to 'o'
    19, 45, 45, 43, 45, 43, 29, 45, 45, 24, 24, 40, 26, 67, 45, 45,
    // 'p' to '~'
    45, 45, 31, 40, 29, 45, 38, 52, 40, 38, 40, 33, 48, 33, 36,
];

/// Room reserved next to a label for the marker drawn at each alternate
/// function.
pub const ALTERNATE_MARKER_WIDTH: i64 = 50;

pub fn glyph_width(glyph: char) -> Option<i64> {
    let index = (glyph as u32).checked_sub(' ' as u32)?;
    GLYPH_WIDTHS.get(index as usize).copied()
}

pub fn text_width(text: &str) -> Result<i64, SymbolError> {
    text.chars().try_fold(0, |width: i64, glyph| {
        glyph_width(glyph)
            .map(|w| width + w)
            .ok_or_else(|| SymbolError::UnsupportedGlyph {
                glyph,
                label: text.to_string(),
            })
    })
}

/// Width a pin's full label occupies in the layout, including the markers
/// for its alternate functions.
pub fn label_width(pin: &PinRecord) -> Result<i64, SymbolError> {
    let markers = ALTERNATE_MARKER_WIDTH * pin.alternates.len() as i64;
    Ok(text_width(&pin.label())? + markers)
}

/// Widest [`label_width`] among `pins`, zero when there are none.
pub fn widest_label<'a, I>(pins: I) -> Result<i64, SymbolError>
where
    I: IntoIterator<Item = &'a PinRecord>,
{
    pins.into_iter()
        .try_fold(0, |widest: i64, pin| -> Result<i64, SymbolError> {
            Ok(widest.max(label_width(pin)?))
        })
}
