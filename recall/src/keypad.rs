//! # Keypad
//!
//! A 4x4 matrix keypad, scanned one column per scan tick:
//!
//! ```text
//!            col 0  col 1  col 2  col 3
//!   row 0      1      2      3      A
//!   row 1      4      5      6      B
//!   row 2      7      8      9      C
//!   row 3      *      0      #      D
//! ```
//!
//! Key indices are row-major (`row * 4 + column`), so `1` is key 0 and `D`
//! is key 15.
//!
//! ## Two halves
//!
//! The keypad is split between the two contexts that touch it:
//!
//! - [`KeyHistory`] is the shared half. The scan interrupt calls
//!   [`KeyHistory::on_scan_tick`] once per millisecond; it samples the rows of
//!   the driven column, shifts one bit into each of that column's four key
//!   windows, and moves the drive line to the next column.
//! - [`KeyEvents`] is the foreground half. It owns its own "seen" counters and
//!   turns the shared edge counters into [`KeyEvent`]s.
//!
//! ```ignore
//! // scan IRQ, every 1ms
//! SHARED.keys.on_scan_tick(&mut keypad_pins);
//!
//! // foreground
//! let mut events = KeyEvents::new(&SHARED.keys);
//! let key = events.wait_press(&mut delay);
//! ```
//!
//! ## Debouncing
//!
//! Transitions are detected by the scan context at the moment the completing
//! sample is appended, and counted in a per-key edge counter. Nothing but the
//! scan context ever writes the windows or the counters; the foreground only
//! compares the counters against its own copy. See
//! [`DebouncePolicy`] for the two detection rules.

use core::fmt;
use core::sync::atomic::AtomicU8;
use core::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use bit_field::BitField;
use log::trace;

use crate::config::DebouncePolicy;
use crate::hal::{Delay, KeypadPort};
use crate::timing::POLL_INTERVAL;

pub const ROWS: usize = 4;
pub const COLUMNS: usize = 4;
pub const KEY_COUNT: usize = ROWS * COLUMNS;

/// Key characters in index order.
pub const KEYMAP: [u8; KEY_COUNT] = *b"123A456B789C*0#D";

/// Consecutive equal samples needed by [`DebouncePolicy::Stable`].
pub const STABLE_WINDOW: u32 = 5;

/// Bit 7 of an encoded [`KeyEvent`] marks a release.
pub const RELEASE_MARKER: u8 = 0x80;

const STABLE_MASK: u8 = (1 << STABLE_WINDOW) - 1;
const RISING_EDGE_MASK: u8 = 0b111;
const RISING_EDGE: u8 = 0b001;

bitflags::bitflags! {
    /// One row sample. A set bit means the row reads active while the current
    /// column is driven, i.e. the key at (row, column) is closed.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Rows: u8 {
        const ROW_0 = 0b0001;
        const ROW_1 = 0b0010;
        const ROW_2 = 0b0100;
        const ROW_3 = 0b1000;
    }
}

impl Rows {
    /// Rows sample with only `row` active.
    pub const fn only(row: u8) -> Rows {
        Rows::from_bits_truncate(1 << (row & 0b11))
    }
}

/// One of the sixteen keys.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    /// `#`, the default start key.
    pub const HASH: Key = Key(14);

    pub const fn at(row: u8, column: u8) -> Key {
        Key((row & 0b11) * COLUMNS as u8 + (column & 0b11))
    }

    pub const fn from_index(index: usize) -> Option<Key> {
        if index < KEY_COUNT {
            Some(Key(index as u8))
        } else {
            None
        }
    }

    /// Look up a key by its printed character. Letters match either case.
    pub const fn from_char(c: char) -> Option<Key> {
        let c = c.to_ascii_uppercase();
        let mut i = 0;
        while i < KEY_COUNT {
            if KEYMAP[i] as char == c {
                return Some(Key(i as u8));
            }
            i += 1;
        }
        None
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / COLUMNS as u8
    }

    #[inline]
    pub const fn column(self) -> u8 {
        self.0 % COLUMNS as u8
    }

    #[inline]
    pub const fn char(self) -> char {
        KEYMAP[self.0 as usize] as char
    }

    /// Numeric value for `0`..`9`, `None` for `A`-`D`, `*` and `#`.
    pub const fn digit(self) -> Option<u8> {
        match KEYMAP[self.0 as usize] {
            c @ b'0'..=b'9' => Some(c - b'0'),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A debounced key transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key),
}

impl KeyEvent {
    #[inline]
    pub const fn key(self) -> Key {
        match self {
            KeyEvent::Press(key) | KeyEvent::Release(key) => key,
        }
    }

    #[inline]
    pub const fn is_press(self) -> bool {
        matches!(self, KeyEvent::Press(_))
    }

    /// The key character, with [`RELEASE_MARKER`] set for releases.
    pub const fn to_byte(self) -> u8 {
        match self {
            KeyEvent::Press(key) => KEYMAP[key.index()],
            KeyEvent::Release(key) => KEYMAP[key.index()] | RELEASE_MARKER,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<KeyEvent> {
        let Some(key) = Key::from_char((byte & !RELEASE_MARKER) as char) else {
            return None;
        };
        if byte & RELEASE_MARKER != 0 {
            Some(KeyEvent::Release(key))
        } else {
            Some(KeyEvent::Press(key))
        }
    }
}

/// Shared keypad state. Written only by the scan context.
pub struct KeyHistory {
    policy: DebouncePolicy,
    /// Last eight raw samples per key, newest in bit 0.
    windows: [AtomicU8; KEY_COUNT],
    /// Debounced transitions seen so far per key (wrapping).
    edges: [AtomicU8; KEY_COUNT],
    /// Column currently driven, read back by the display refresh.
    column: AtomicU8,
}

impl KeyHistory {
    pub const fn new(policy: DebouncePolicy) -> Self {
        Self {
            policy,
            windows: [const { AtomicU8::new(0) }; KEY_COUNT],
            edges: [const { AtomicU8::new(0) }; KEY_COUNT],
            column: AtomicU8::new(0),
        }
    }

    #[inline]
    pub fn policy(&self) -> DebouncePolicy {
        self.policy
    }

    /// The column the port is currently driving.
    #[inline]
    pub fn column(&self) -> u8 {
        self.column.load(Relaxed)
    }

    /// Raw sample window of `key`, newest sample in bit 0.
    #[inline]
    pub fn window(&self, key: Key) -> u8 {
        self.windows[key.index()].load(Relaxed)
    }

    /// Debounced state of `key`. Only meaningful under
    /// [`DebouncePolicy::Stable`], where presses and releases alternate.
    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.edges[key.index()].load(Acquire) & 1 == 1
    }

    /// The whole scan interrupt: sample the driven column, then drive the next.
    ///
    /// Must only be called from one context. The port is expected to start
    /// with column 0 driven.
    pub fn on_scan_tick(&self, port: &mut impl KeypadPort) {
        let column = self.column.load(Relaxed);
        let rows = port.read_rows();
        self.scan_tick(column, rows);

        let next = (column + 1) % COLUMNS as u8;
        self.column.store(next, Relaxed);
        port.drive_column(next);
    }

    /// Shift one sample into each key of `column`.
    pub fn scan_tick(&self, column: u8, rows: Rows) {
        let column = column % COLUMNS as u8;
        for row in 0..ROWS as u8 {
            let closed = rows.bits().get_bit(row as usize);
            self.append(Key::at(row, column), closed);
        }
    }

    fn append(&self, key: Key, closed: bool) {
        let slot = key.index();
        let window = (self.windows[slot].load(Relaxed) << 1) | closed as u8;
        self.windows[slot].store(window, Relaxed);

        let edges = self.edges[slot].load(Relaxed);
        let edge = match self.policy {
            DebouncePolicy::RisingEdge => window & RISING_EDGE_MASK == RISING_EDGE,
            DebouncePolicy::Stable => {
                let recent = window & STABLE_MASK;
                if edges & 1 == 1 {
                    recent == 0
                } else {
                    recent == STABLE_MASK
                }
            }
        };

        if edge {
            self.edges[slot].store(edges.wrapping_add(1), Release);
            trace!("key {} edge {} (window {:08b})", key, edges.wrapping_add(1), window);
        }
    }
}

/// Foreground reader of the keypad.
///
/// Owns one counter per key recording how many edges it has already
/// reported, so reading events never writes to shared state.
pub struct KeyEvents<'s> {
    history: &'s KeyHistory,
    seen: [u8; KEY_COUNT],
}

impl<'s> KeyEvents<'s> {
    /// Start reading. Transitions that happened before this call are not reported.
    pub fn new(history: &'s KeyHistory) -> Self {
        let mut events = Self {
            history,
            seen: [0; KEY_COUNT],
        };
        events.discard_pending();
        events
    }

    /// First pending transition in key index order, if any.
    pub fn poll_event(&mut self) -> Option<KeyEvent> {
        for (slot, seen) in self.seen.iter_mut().enumerate() {
            let edges = self.history.edges[slot].load(Acquire);
            if edges == *seen {
                continue;
            }

            *seen = seen.wrapping_add(1);
            let key = Key(slot as u8);
            let event = match self.history.policy {
                DebouncePolicy::RisingEdge => KeyEvent::Press(key),
                // odd edge counts are presses: every key starts released
                DebouncePolicy::Stable if *seen & 1 == 1 => KeyEvent::Press(key),
                DebouncePolicy::Stable => KeyEvent::Release(key),
            };
            return Some(event);
        }
        None
    }

    pub fn has_pending(&self) -> bool {
        self.seen
            .iter()
            .enumerate()
            .any(|(slot, seen)| self.history.edges[slot].load(Acquire) != *seen)
    }

    /// Forget every transition that has not been read yet.
    pub fn discard_pending(&mut self) {
        for (slot, seen) in self.seen.iter_mut().enumerate() {
            *seen = self.history.edges[slot].load(Acquire);
        }
    }

    /// Block until the next transition. Only future scan ticks can satisfy
    /// this, so the scan interrupt must be running.
    pub fn wait_event(&mut self, delay: &mut impl Delay) -> KeyEvent {
        loop {
            if let Some(event) = self.poll_event() {
                return event;
            }
            delay.wait(POLL_INTERVAL);
        }
    }

    /// Block until the next press, skipping releases.
    pub fn wait_press(&mut self, delay: &mut impl Delay) -> Key {
        loop {
            if let KeyEvent::Press(key) = self.wait_event(delay) {
                return key;
            }
        }
    }
}
