//! # recall
//!
//! The real-time core of a "repeat the pattern" memory game running on a
//! small microcontroller board:
//!
//! - an 8-cell 7-segment display ([`display`]),
//! - a 4x4 matrix keypad scanned one column per millisecond ([`keypad`]),
//! - a two-voice sine wavetable synth feeding a 12-bit DAC at 20kHz ([`synth`]),
//! - an RGB LED ([`led`]).
//!
//! There is no scheduler. Two periodic timer interrupts do the time-critical
//! work and the game itself runs in the foreground:
//!
//! ```ignore
//! static SHARED: Shared = Shared::new(&GameConfig::DEFAULT);
//!
//! // 1kHz keypad timer
//! fn scan_irq() {
//!     SHARED.keys.on_scan_tick(&mut keypad_pins);
//! }
//!
//! // 20kHz audio timer
//! fn audio_irq() {
//!     SHARED.synth.on_sample_tick_to(&mut dac);
//! }
//!
//! fn main() -> ! {
//!     let mut game = Game::new(
//!         GameConfig::DEFAULT,
//!         &SHARED,
//!         &SHARED.display,
//!         pwm_led,
//!         BusyWait::new(48_000_000),
//!         StdRandom::new(),
//!     );
//!     game.run()
//! }
//! ```
//!
//! Everything the interrupts and the foreground share lives in [`Shared`],
//! and every field in it has exactly one writer. See [`shared`] for the
//! ownership table.
#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod config;
pub mod cue;
pub mod display;
pub mod game;
pub mod hal;
pub mod keypad;
pub mod led;
pub mod random;
pub mod shared;
pub mod synth;
pub mod timing;
pub mod wavetable;

pub use config::{ConfigError, DebouncePolicy, GameConfig, GameOverPolicy};
pub use game::{Game, GameSession, Phase};
pub use keypad::{Key, KeyEvent};
pub use shared::Shared;
pub use synth::Channel;
