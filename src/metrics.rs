//! Static Helvetica width tables for deterministic text measurement.
//!
//! Widths are the standard Type 1 AFM advance widths in 1/1000 em, covering ASCII
//! 0x20..=0x7E. Index = (char as usize) - 32. Other characters fall back to the
//! table's average width.

use serde::{Deserialize, Serialize};

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub face: FontFace,
    pub size: f32,
}

impl FontSpec {
    pub fn regular(size: f32) -> Self {
        Self {
            face: FontFace::Helvetica,
            size,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            face: FontFace::HelveticaBold,
            size,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_FACTOR
    }
}

pub struct FontMetricTable {
    pub face: FontFace,
    widths: [u16; 95],
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Advance width of `s` in points at `size`.
    pub fn measure_str(&self, s: &str, size: f32) -> f32 {
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
        units as f32 * size / 1000.0
    }

    /// Number of lines `text` occupies when word-wrapped at `max_width`.
    ///
    /// Greedy wrap; a word wider than the line is broken by character. Explicit
    /// newlines start a new line. Empty text occupies zero lines.
    pub fn wrapped_lines(&self, text: &str, size: f32, max_width: f32) -> usize {
        if text.trim().is_empty() {
            return 0;
        }
        let space = self.measure_str(" ", size);

        text.split('\n')
            .map(|paragraph| {
                let mut lines = 1usize;
                let mut current = 0.0_f32;
                let mut first_on_line = true;

                for word in paragraph.split_whitespace() {
                    let word_w = self.measure_str(word, size);
                    let space_w = if first_on_line { 0.0 } else { space };

                    if word_w > max_width {
                        // Long word: starts on a fresh line and breaks by character.
                        if !first_on_line {
                            lines += 1;
                        }
                        let mut run = 0.0_f32;
                        for ch in word.chars() {
                            let ch_w = self.measure_str(ch.encode_utf8(&mut [0; 4]), size);
                            if run > 0.0 && run + ch_w > max_width {
                                lines += 1;
                                run = 0.0;
                            }
                            run += ch_w;
                        }
                        current = run;
                        first_on_line = false;
                    } else if !first_on_line && current + space_w + word_w > max_width {
                        lines += 1;
                        current = word_w;
                    } else {
                        current += space_w + word_w;
                        first_on_line = false;
                    }
                }
                lines
            })
            .sum()
    }
}

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::Helvetica,
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
    average_char_width: 513,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: FontFace::HelveticaBold,
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    average_char_width: 552,
};

pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Helvetica => &HELVETICA_TABLE,
        FontFace::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}
