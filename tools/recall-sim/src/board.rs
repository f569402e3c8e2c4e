//! Host stand-ins for the board: a keypad matrix other threads can press
//! keys on, and display/LED sinks that log instead of lighting anything.

use std::sync::atomic::AtomicU16;
use std::sync::atomic::Ordering::Relaxed;
use std::thread;
use std::time::Duration;

use recall::display::{CELL_COUNT, blank_cells, decode_cells};
use recall::hal::{Delay, DisplaySink, KeypadPort, RgbSink};
use recall::keypad::{Key, ROWS, Rows};
use recall::led::Color;
use tracing::info;

/// Which keys are closed, one bit per key index.
#[derive(Default)]
pub struct Matrix(AtomicU16);

impl Matrix {
    pub fn press(&self, key: Key) {
        self.0.fetch_or(1 << key.index(), Relaxed);
    }

    pub fn release(&self, key: Key) {
        self.0.fetch_and(!(1 << key.index()), Relaxed);
    }

    pub fn port(&self) -> MatrixPort<'_> {
        MatrixPort {
            matrix: self,
            driven: 0,
        }
    }
}

pub struct MatrixPort<'m> {
    matrix: &'m Matrix,
    driven: u8,
}

impl KeypadPort for MatrixPort<'_> {
    fn read_rows(&mut self) -> Rows {
        let closed = self.matrix.0.load(Relaxed);
        (0..ROWS as u8)
            .filter(|&row| closed & (1 << Key::at(row, self.driven).index()) != 0)
            .fold(Rows::empty(), |rows, row| rows | Rows::only(row))
    }

    fn drive_column(&mut self, column: u8) {
        self.driven = column;
    }
}

/// Logs the display text whenever it changes.
pub struct TraceDisplay {
    last: [u16; CELL_COUNT],
}

impl Default for TraceDisplay {
    fn default() -> Self {
        Self {
            last: blank_cells(),
        }
    }
}

impl DisplaySink for TraceDisplay {
    fn show(&mut self, cells: &[u16; CELL_COUNT]) {
        if *cells != self.last {
            self.last = *cells;
            info!(target: "display", "[{}]", decode_cells(cells));
        }
    }
}

#[derive(Default)]
pub struct TraceLed {
    last: Color,
}

impl RgbSink for TraceLed {
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        let color = Color::rgb(r, g, b);
        if color != self.last {
            self.last = color;
            info!(target: "led", "rgb({r}, {g}, {b})");
        }
    }
}

pub struct HostDelay;

impl Delay for HostDelay {
    fn wait(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
