//! Short sound and light sequences the game plays at fixed moments.
//!
//! A [`Cue`] is a list of steps played back in the foreground, each step
//! holding for its duration before the next one starts. Cues block; nothing
//! else happens on the foreground while one plays.

use core::time::Duration;

use log::debug;

use crate::hal::{Delay, RgbSink};
use crate::led::Color;
use crate::synth::{Channel, Synth};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Both voices, in hertz. 0 keeps a voice silent.
    Tone { a: u32, b: u32, ms: u16 },
    Light { color: Color, ms: u16 },
}

impl Step {
    const fn ms(&self) -> u16 {
        match *self {
            Step::Tone { ms, .. } | Step::Light { ms, .. } => ms,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Cue {
    pub name: &'static str,
    pub steps: &'static [Step],
    /// Times the step list runs, at least once.
    pub repeat: u8,
}

pub const STARTUP: Cue = Cue {
    name: "startup",
    steps: &[
        Step::Tone { a: 440, b: 0, ms: 100 },
        Step::Tone { a: 587, b: 0, ms: 100 },
        Step::Tone { a: 880, b: 0, ms: 200 },
    ],
    repeat: 1,
};

pub const SUCCESS: Cue = Cue {
    name: "success",
    steps: &[Step::Tone { a: 1000, b: 1500, ms: 200 }],
    repeat: 1,
};

pub const FAILURE: Cue = Cue {
    name: "failure",
    steps: &[Step::Tone { a: 200, b: 300, ms: 500 }],
    repeat: 1,
};

pub const WIN: Cue = Cue {
    name: "win",
    steps: &[
        Step::Light { color: Color::YELLOW, ms: 200 },
        Step::Light { color: Color::GREEN, ms: 200 },
    ],
    repeat: 5,
};

impl Cue {
    /// Total playing time.
    pub fn duration(&self) -> Duration {
        let per_pass: u64 = self.steps.iter().map(|step| step.ms() as u64).sum();
        Duration::from_millis(per_pass * self.repeat.max(1) as u64)
    }

    /// Play every step, then leave the voices silent and the LED off if the
    /// cue touched them.
    pub fn play(&self, synth: &Synth, led: &mut impl RgbSink, delay: &mut impl Delay) {
        debug!("cue {}", self.name);

        let mut sounded = false;
        let mut lit = false;
        for _ in 0..self.repeat.max(1) {
            for step in self.steps {
                match *step {
                    Step::Tone { a, b, .. } => {
                        synth.set_frequency(Channel::A, a);
                        synth.set_frequency(Channel::B, b);
                        sounded = true;
                    }
                    Step::Light { color, .. } => {
                        color.apply(led);
                        lit = true;
                    }
                }
                delay.wait(Duration::from_millis(step.ms() as u64));
            }
        }

        if sounded {
            synth.silence();
        }
        if lit {
            Color::OFF.apply(led);
        }
    }
}
