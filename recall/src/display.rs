//! # 7-Segment Display
//!
//! Eight character cells. Each cell is a `u16` the display refresh shifts out
//! as-is: the high byte selects the position, the low byte lights segments.
//!
//! ```text
//!   cell = (position << 8) | segments
//!
//!        a             segments bit:  7  6  5  4  3  2  1  0
//!      f   b                         dp  g  f  e  d  c  b  a
//!        g
//!      e   c
//!        d   dp
//! ```
//!
//! Text goes through [`encode`], which covers digits, letters (either case,
//! drawn the only way seven segments can) and a handful of punctuation marks.
//! Anything else is drawn blank.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let mut display = Display::new(&SHARED.display);
//! display.print("PRESS # ");
//! display.show_score(120);   // "SCORE120"
//! display.show_digit(7);     // "7       "
//! display.clear();
//! ```

use core::fmt::Write;
use core::sync::atomic::AtomicU16;
use core::sync::atomic::Ordering::Relaxed;

use heapless::String;

use crate::hal::DisplaySink;

pub const CELL_COUNT: usize = 8;

/// Segments of a dark cell.
pub const BLANK: u8 = 0x00;

/// Canonical characters and their segments. Earlier entries win when two
/// characters share a shape, which is what [`decode`] returns.
const GLYPH_LIST: &[(u8, u8)] = &[
    (b'0', 0x3F),
    (b'1', 0x06),
    (b'2', 0x5B),
    (b'3', 0x4F),
    (b'4', 0x66),
    (b'5', 0x6D),
    (b'6', 0x7D),
    (b'7', 0x07),
    (b'8', 0x7F),
    (b'9', 0x6F),
    (b'A', 0x77),
    (b'B', 0x7C),
    (b'C', 0x39),
    (b'D', 0x5E),
    (b'E', 0x79),
    (b'F', 0x71),
    (b'G', 0x3D),
    (b'H', 0x76),
    (b'I', 0x30),
    (b'J', 0x1E),
    (b'K', 0x75),
    (b'L', 0x38),
    (b'M', 0x37),
    (b'N', 0x54),
    (b'O', 0x3F),
    (b'P', 0x73),
    (b'Q', 0x67),
    (b'R', 0x50),
    (b'S', 0x6D),
    (b'T', 0x78),
    (b'U', 0x3E),
    (b'V', 0x3E),
    (b'W', 0x2A),
    (b'X', 0x76),
    (b'Y', 0x6E),
    (b'Z', 0x5B),
    (b' ', BLANK),
    (b'-', 0x40),
    (b'_', 0x08),
    (b'.', 0x80),
    (b'!', 0x86),
    (b'?', 0x53),
    (b'#', 0x49),
    (b'=', 0x48),
];

/// Segments for every 7-bit character.
pub static GLYPHS: [u8; 128] = {
    let mut table = [BLANK; 128];
    let mut i = 0;
    while i < GLYPH_LIST.len() {
        let (c, segments) = GLYPH_LIST[i];
        table[c as usize] = segments;
        table[c.to_ascii_lowercase() as usize] = segments;
        i += 1;
    }
    table
};

#[inline]
pub fn encode(c: char) -> u8 {
    if c.is_ascii() {
        GLYPHS[c as usize]
    } else {
        BLANK
    }
}

/// The character a segment pattern reads as, if any glyph draws it.
pub fn decode(segments: u8) -> Option<char> {
    GLYPH_LIST
        .iter()
        .find(|&&(_, glyph)| glyph == segments)
        .map(|&(c, _)| c as char)
}

#[inline]
pub const fn cell(position: usize, segments: u8) -> u16 {
    ((position as u16) << 8) | segments as u16
}

/// Cells for `text`, left aligned. Characters past the eighth are dropped.
pub fn encode_text(text: &str) -> [u16; CELL_COUNT] {
    let mut cells = blank_cells();
    for (position, c) in text.chars().take(CELL_COUNT).enumerate() {
        cells[position] = cell(position, encode(c));
    }
    cells
}

/// Cells with every segment off.
pub const fn blank_cells() -> [u16; CELL_COUNT] {
    let mut cells = [0; CELL_COUNT];
    let mut position = 0;
    while position < CELL_COUNT {
        cells[position] = cell(position, BLANK);
        position += 1;
    }
    cells
}

/// Read cells back as text, `?` standing in for patterns no glyph draws.
pub fn decode_cells(cells: &[u16; CELL_COUNT]) -> String<CELL_COUNT> {
    let mut text = String::new();
    for &cell in cells {
        // eight cells always fit
        let _ = text.push(decode(cell as u8).unwrap_or('?'));
    }
    text
}

/// The display buffer a DMA channel refreshes from.
///
/// Only the foreground writes it, through [`DisplaySink`] on `&DisplayCells`.
pub struct DisplayCells([AtomicU16; CELL_COUNT]);

impl DisplayCells {
    pub const fn new() -> Self {
        let blank = blank_cells();
        let mut cells = [const { AtomicU16::new(0) }; CELL_COUNT];
        let mut position = 0;
        while position < CELL_COUNT {
            cells[position] = AtomicU16::new(blank[position]);
            position += 1;
        }
        Self(cells)
    }

    /// Address of the first cell, for pointing the DMA channel at.
    pub fn as_ptr(&self) -> *const u16 {
        self.0.as_ptr() as *const u16
    }

    pub fn snapshot(&self) -> [u16; CELL_COUNT] {
        core::array::from_fn(|position| self.0[position].load(Relaxed))
    }
}

impl Default for DisplayCells {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for &DisplayCells {
    fn show(&mut self, cells: &[u16; CELL_COUNT]) {
        for (slot, &cell) in self.0.iter().zip(cells) {
            slot.store(cell, Relaxed);
        }
    }
}

/// Text-level front end for a [`DisplaySink`].
pub struct Display<D> {
    sink: D,
    cells: [u16; CELL_COUNT],
}

impl<D: DisplaySink> Display<D> {
    pub fn new(sink: D) -> Self {
        Self {
            sink,
            cells: blank_cells(),
        }
    }

    pub fn print(&mut self, text: &str) {
        self.cells = encode_text(text);
        self.sink.show(&self.cells);
    }

    pub fn clear(&mut self) {
        self.cells = blank_cells();
        self.sink.show(&self.cells);
    }

    /// `SCORE` and the score right aligned in the last three cells.
    pub fn show_score(&mut self, score: u16) {
        self.print_labelled("SCORE", score);
    }

    pub fn show_level(&mut self, level: u8) {
        self.print_labelled("LEVEL", level as u16);
    }

    /// A single digit in the first cell.
    pub fn show_digit(&mut self, digit: u8) {
        let mut buf = [0; 4];
        let digit = char::from(b'0' + digit % 10);
        self.print(digit.encode_utf8(&mut buf));
    }

    /// What the display currently reads.
    pub fn text(&self) -> String<CELL_COUNT> {
        decode_cells(&self.cells)
    }

    #[inline]
    pub fn cells(&self) -> &[u16; CELL_COUNT] {
        &self.cells
    }

    fn print_labelled(&mut self, label: &str, value: u16) {
        let mut text: String<CELL_COUNT> = String::new();
        if write!(text, "{label}{:>3}", value.min(999)).is_err() {
            text.clear();
            let _ = text.push_str(label);
        }
        self.print(&text);
    }
}
