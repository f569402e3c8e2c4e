//! # Two-Voice Sine Synthesizer
//!
//! Two oscillators read the shared sine [`WAVETABLE`], their samples are
//! summed, scaled by a master volume and biased to the middle of a 12-bit DAC.
//! One sample is produced per audio tick at [`SAMPLE_RATE`].
//!
//! - **Frequency** - whole hertz, 0 (silent) up to [`NYQUIST_HZ`]
//! - **Volume** - 0 (silent) to 4095 (full 12-bit swing), shared by both voices
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! // audio IRQ, 20kHz
//! SHARED.synth.on_sample_tick_to(&mut dac);
//!
//! // foreground: a fifth
//! SHARED.synth.set_frequency(Channel::A, 440);
//! SHARED.synth.set_frequency(Channel::B, 660);
//! delay.wait(Duration::from_millis(200));
//! SHARED.synth.silence();
//! ```
//!
//! ## Phase accumulators
//!
//! Each voice keeps a 16.16 fixed-point position in the table. The high half
//! indexes [`WAVETABLE`], the low half carries the fraction, so a step is
//! `hz * TABLE_LEN / SAMPLE_RATE` table entries per sample with 16 fractional
//! bits:
//!
//! ```text
//! 440Hz: 440 * 1000 / 20000 = 22.0 entries -> step 0x0016_0000
//! ```
//!
//! Steps and the volume are written by the foreground, phases by the audio
//! tick. A step of 0 parks the voice at phase 0.

use core::fmt;
use core::sync::atomic::Ordering::Relaxed;
use core::sync::atomic::{AtomicU16, AtomicU32};

use log::warn;

use crate::hal::DacOutput;
use crate::wavetable::{TABLE_LEN, WAVETABLE};

pub const SAMPLE_RATE: u32 = 20_000;
pub const NYQUIST_HZ: u32 = SAMPLE_RATE / 2;
pub const FRACTION_BITS: u32 = 16;
/// One full table period in phase units.
pub const PHASE_MODULUS: u32 = (TABLE_LEN as u32) << FRACTION_BITS;

pub const MAX_VOLUME: u16 = 4095;
pub const DEFAULT_VOLUME: u16 = 2048;
/// DAC code of silence.
pub const MID_SCALE: u16 = 2048;

const VOLUME_SHIFT: u32 = 17;

/// One of the two oscillators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    A = 0,
    B = 1,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::A, Channel::B];

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Channel::A),
            1 => Ok(Channel::B),
            other => Err(InvalidChannel(other)),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidChannel(pub u8);

impl fmt::Display for InvalidChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no synth channel {}, there are only two", self.0)
    }
}

impl core::error::Error for InvalidChannel {}

/// Phase increment for `hz`, rounded to nearest. `hz` must not exceed
/// [`NYQUIST_HZ`] for the result to stay below one table length.
pub const fn step_for(hz: u32) -> u32 {
    let scaled = (hz as u64 * TABLE_LEN as u64) << FRACTION_BITS;
    ((scaled + SAMPLE_RATE as u64 / 2) / SAMPLE_RATE as u64) as u32
}

pub struct Synth {
    steps: [AtomicU32; 2],
    phases: [AtomicU32; 2],
    volume: AtomicU16,
}

impl Synth {
    /// A silent synth. `volume` is clamped to [`MAX_VOLUME`].
    pub const fn new(volume: u16) -> Self {
        let volume = if volume > MAX_VOLUME { MAX_VOLUME } else { volume };
        Self {
            steps: [AtomicU32::new(0), AtomicU32::new(0)],
            phases: [AtomicU32::new(0), AtomicU32::new(0)],
            volume: AtomicU16::new(volume),
        }
    }

    /// Tune `channel` to `hz`. 0 stops the voice and rewinds it.
    pub fn set_frequency(&self, channel: Channel, hz: u32) {
        let slot = channel.slot();
        if hz == 0 {
            self.steps[slot].store(0, Relaxed);
            self.phases[slot].store(0, Relaxed);
            return;
        }

        let hz = if hz > NYQUIST_HZ {
            warn!("{hz}Hz on channel {channel:?} is above {NYQUIST_HZ}Hz, clamping");
            NYQUIST_HZ
        } else {
            hz
        };
        self.steps[slot].store(step_for(hz), Relaxed);
    }

    /// Stop both voices.
    pub fn silence(&self) {
        for channel in Channel::ALL {
            self.set_frequency(channel, 0);
        }
    }

    pub fn set_volume(&self, volume: u16) {
        let volume = if volume > MAX_VOLUME {
            warn!("volume {volume} above {MAX_VOLUME}, clamping");
            MAX_VOLUME
        } else {
            volume
        };
        self.volume.store(volume, Relaxed);
    }

    #[inline]
    pub fn volume(&self) -> u16 {
        self.volume.load(Relaxed)
    }

    #[inline]
    pub fn step(&self, channel: Channel) -> u32 {
        self.steps[channel.slot()].load(Relaxed)
    }

    #[inline]
    pub fn phase(&self, channel: Channel) -> u32 {
        self.phases[channel.slot()].load(Relaxed)
    }

    #[inline]
    pub fn is_silent(&self) -> bool {
        Channel::ALL.iter().all(|&channel| self.step(channel) == 0)
    }

    /// Advance both voices one sample and return the 12-bit DAC code.
    ///
    /// Only the audio context may call this. Runs in constant time.
    pub fn on_sample_tick(&self) -> u16 {
        let mut sum = 0i32;
        for slot in 0..2 {
            let step = self.steps[slot].load(Relaxed);
            if step == 0 {
                self.phases[slot].store(0, Relaxed);
                continue;
            }

            let mut phase = self.phases[slot].load(Relaxed) + step;
            if phase >= PHASE_MODULUS {
                phase -= PHASE_MODULUS;
            }
            self.phases[slot].store(phase, Relaxed);
            sum += WAVETABLE[(phase >> FRACTION_BITS) as usize] as i32;
        }

        let volume = self.volume.load(Relaxed) as i32;
        // |sum| <= 2 * 32767 and volume <= 4095 keep this inside -2048..=2047
        let scaled = (sum * volume) >> VOLUME_SHIFT;
        (scaled + MID_SCALE as i32) as u16
    }

    /// [`on_sample_tick`](Self::on_sample_tick) straight into a DAC.
    #[inline]
    pub fn on_sample_tick_to(&self, dac: &mut impl DacOutput) {
        dac.write(self.on_sample_tick());
    }
}
