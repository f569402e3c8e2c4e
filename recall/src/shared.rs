//! State shared between the two timer interrupts and the foreground.
//!
//! | field               | written by  | read by          |
//! |---------------------|-------------|------------------|
//! | key windows, edges  | scan IRQ    | foreground       |
//! | scan column         | scan IRQ    | display refresh  |
//! | synth steps, volume | foreground  | audio IRQ        |
//! | synth phases        | audio IRQ   | audio IRQ        |
//! | display cells       | foreground  | display DMA      |
//!
//! The foreground also stores a zero phase when it stops a voice. The audio
//! tick stores zero as well for as long as the step is zero, so that race
//! settles within one sample.
//!
//! Every field is an atomic touched with plain loads and stores, which is all
//! a Cortex-M0 has.

use crate::config::GameConfig;
use crate::display::DisplayCells;
use crate::keypad::KeyHistory;
use crate::synth::Synth;

pub struct Shared {
    pub keys: KeyHistory,
    pub synth: Synth,
    pub display: DisplayCells,
}

impl Shared {
    pub const fn new(config: &GameConfig) -> Self {
        Self {
            keys: KeyHistory::new(config.debounce),
            synth: Synth::new(config.volume),
            display: DisplayCells::new(),
        }
    }
}
