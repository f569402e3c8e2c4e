//! # Board collaborators
//!
//! The core never touches pins or peripherals directly. It talks to the board
//! through these traits, and [`board`](crate::board) implements them for the
//! STM32F0 register blocks. The host simulator and the tests bring their own
//! implementations.
//!
//! | Trait            | Used by                  | Context    |
//! |------------------|--------------------------|------------|
//! | [`KeypadPort`]   | keypad scan tick         | scan IRQ   |
//! | [`DacOutput`]    | synth sample tick        | audio IRQ  |
//! | [`DisplaySink`]  | [`Display`](crate::display::Display) | foreground |
//! | [`RgbSink`]      | game, cues               | foreground |
//! | [`Delay`]        | game, cues, key polling  | foreground |
//! | [`RandomSource`] | sequence generation      | foreground |

use core::time::Duration;

use crate::display::CELL_COUNT;
use crate::keypad::Rows;

/// The keypad matrix wiring: four column drive lines and four row inputs.
pub trait KeypadPort {
    /// Sample the four row lines for the column that is currently driven.
    fn read_rows(&mut self) -> Rows;

    /// Assert `column` (0..=3) and de-assert the other three.
    fn drive_column(&mut self, column: u8);
}

/// A 12-bit, right-aligned DAC channel.
pub trait DacOutput {
    fn write(&mut self, code: u16);
}

/// The 8-cell display buffer. Each cell is `(position << 8) | segments`.
///
/// The buffer is refreshed continuously by something outside the core
/// (a DMA channel on the real board), so `show` only has to store the cells.
pub trait DisplaySink {
    fn show(&mut self, cells: &[u16; CELL_COUNT]);
}

/// The RGB indicator. Every channel is a percentage, 0..=100.
pub trait RgbSink {
    fn set_color(&mut self, r: u8, g: u8, b: u8);

    /// Set all three channels to the same level.
    fn set_brightness(&mut self, level: u8) {
        self.set_color(level, level, level);
    }
}

/// Blocking, monotonic delay. A wait cannot be cancelled: it returns once
/// `duration` of real time has passed.
pub trait Delay {
    fn wait(&mut self, duration: Duration);
}

/// Source of the pattern digits.
pub trait RandomSource {
    fn seed(&mut self, seed: u64);

    /// Uniform value in `lo..=hi`.
    fn next_int_range(&mut self, lo: u32, hi: u32) -> u32;
}

impl<T: KeypadPort + ?Sized> KeypadPort for &mut T {
    fn read_rows(&mut self) -> Rows {
        (**self).read_rows()
    }

    fn drive_column(&mut self, column: u8) {
        (**self).drive_column(column)
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn show(&mut self, cells: &[u16; CELL_COUNT]) {
        (**self).show(cells)
    }
}

impl<T: RgbSink + ?Sized> RgbSink for &mut T {
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        (**self).set_color(r, g, b)
    }

    fn set_brightness(&mut self, level: u8) {
        (**self).set_brightness(level)
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn wait(&mut self, duration: Duration) {
        (**self).wait(duration)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn seed(&mut self, seed: u64) {
        (**self).seed(seed)
    }

    fn next_int_range(&mut self, lo: u32, hi: u32) -> u32 {
        (**self).next_int_range(lo, hi)
    }
}
