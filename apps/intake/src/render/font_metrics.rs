//! Glyph-width table for the standard Helvetica font.
//!
//! Widths are the Adobe core-font AFM advances in thousandths of an em and cover
//! ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.
//! Helvetica is one of the 14 standard PDF fonts, so viewers supply the glyphs and
//! the document never embeds a font file.

/// Font ascent in thousandths of an em (distance from the top of a line to its baseline).
pub const HELVETICA_ASCENT: f32 = 718.0;

/// Vertical advance per line, as a multiple of the font size (ascent + descent + line gap).
pub const LINE_HEIGHT_FACTOR: f32 = 1.156;

/// Static character-width table for a font.
///
/// `widths[i]` = advance of ASCII character `(i + 32)` in 1/1000 em.
pub struct FontMetricTable {
    pub base_font: &'static str,
    widths: [u16; 95],
    /// Fallback width for characters outside the table.
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in points at `font_size`.
    ///
    /// Characters outside printable ASCII fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str, font_size: f32) -> f32 {
        let units: u32 = s
            .chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] as u32
                } else {
                    self.average_char_width as u32
                }
            })
            .sum();
        units as f32 * font_size / 1000.0
    }

    /// Height of one text line in points at `font_size`.
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * LINE_HEIGHT_FACTOR
    }

    /// Distance from the top of a line box to its baseline at `font_size`.
    pub fn ascent(&self, font_size: f32) -> f32 {
        HELVETICA_ASCENT * font_size / 1000.0
    }
}

/// Helvetica, the default sans-serif of every PDF viewer.
pub static HELVETICA: FontMetricTable = FontMetricTable {
    base_font: "Helvetica",
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
