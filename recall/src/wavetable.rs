//! One period of a sine wave, computed at compile time.

use core::f64::consts::{FRAC_PI_2, PI, TAU};

pub const TABLE_LEN: usize = 1000;
pub const AMPLITUDE: i16 = i16::MAX;

/// `AMPLITUDE * sin(2π * i / TABLE_LEN)`, rounded to nearest.
pub static WAVETABLE: [i16; TABLE_LEN] = {
    let mut table = [0i16; TABLE_LEN];
    let mut i = 0;
    while i < TABLE_LEN {
        let angle = i as f64 * TAU / TABLE_LEN as f64;
        let scaled = const_sin(angle) * AMPLITUDE as f64;
        let rounded = if scaled < 0.0 { scaled - 0.5 } else { scaled + 0.5 };
        table[i] = if rounded > AMPLITUDE as f64 {
            AMPLITUDE
        } else if rounded < -(AMPLITUDE as f64) {
            -AMPLITUDE
        } else {
            rounded as i16
        };
        i += 1;
    }
    table
};

/// Taylor series sine for `x` in `0..2π`.
const fn const_sin(x: f64) -> f64 {
    // fold onto [-π/2, π/2] where the series converges fastest
    let x = if x > PI + FRAC_PI_2 {
        x - TAU
    } else if x > FRAC_PI_2 {
        PI - x
    } else {
        x
    };

    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    let x9 = x7 * x2;
    let x11 = x9 * x2;

    x - x3 / 6.0 + x5 / 120.0 - x7 / 5040.0 + x9 / 362_880.0 - x11 / 39_916_800.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_points() {
        assert_eq!(WAVETABLE[0], 0);
        assert_eq!(WAVETABLE[250], 32767);
        assert_eq!(WAVETABLE[500], 0);
        assert_eq!(WAVETABLE[750], -32767);
    }

    #[test]
    fn odd_symmetry() {
        for i in 1..TABLE_LEN / 2 {
            let sum = WAVETABLE[i] as i32 + WAVETABLE[TABLE_LEN - i] as i32;
            assert!(sum.abs() <= 1, "index {i}");
        }
    }

    #[test]
    fn close_to_libm() {
        for (i, &sample) in WAVETABLE.iter().enumerate() {
            let exact = (i as f64 * TAU / TABLE_LEN as f64).sin() * 32767.0;
            assert!((sample as f64 - exact).abs() <= 0.5 + 1e-6, "index {i}: {sample} vs {exact}");
        }
    }
}
