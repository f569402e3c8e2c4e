//! RGB indicator colors.

use crate::hal::RgbSink;

/// Percent brightness per channel, 0..=100.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(100, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 100, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 100);
    pub const YELLOW: Color = Color::rgb(100, 100, 0);
    pub const MAGENTA: Color = Color::rgb(100, 0, 100);
    pub const CYAN: Color = Color::rgb(0, 100, 100);
    pub const ORANGE: Color = Color::rgb(100, 50, 0);
    pub const PURPLE: Color = Color::rgb(50, 0, 100);
    pub const WHITE: Color = Color::rgb(100, 100, 100);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// The color a pattern digit is shown in.
    pub const fn for_digit(digit: u8) -> Color {
        match digit {
            1 => Color::RED,
            2 => Color::GREEN,
            3 => Color::BLUE,
            4 => Color::YELLOW,
            5 => Color::MAGENTA,
            6 => Color::CYAN,
            7 => Color::ORANGE,
            8 => Color::PURPLE,
            9 => Color::WHITE,
            _ => Color::OFF,
        }
    }

    #[inline]
    pub fn apply(self, led: &mut impl RgbSink) {
        led.set_color(self.r, self.g, self.b);
    }
}
