//! # STM32F0 Board Support
//!
//! Register-block views of the peripherals the game board wires up, and the
//! [`hal`](crate::hal) implementations on top of them.
//!
//! | Peripheral | Base          | Used for                                   |
//! |------------|---------------|--------------------------------------------|
//! | `GPIOB`    | `$4800_0400`  | display segments (0-7), digit select (8-10)|
//! | `GPIOC`    | `$4800_0800`  | keypad rows (0-3, in), columns (4-7, out)  |
//! | `DAC`      | `$4000_7400`  | audio, channel 1                           |
//! | `TIM1`     | `$4001_2C00`  | RGB LED PWM, compare channels 1-3          |
//! | `TIM6`     | `$4000_1000`  | 20kHz audio tick, DAC trigger              |
//! | `TIM7`     | `$4000_1400`  | 1kHz keypad scan tick                      |
//!
//! Clock and peripheral enables are the startup code's job; nothing here
//! touches RCC.
//!
//! ```ignore
//! let keypad = KeypadPins::new(unsafe { Gpio::new(GPIOC_BASE) });
//! let dac = DacChannel1::new(unsafe { Dac::new() });
//! let led = PwmLed::new(unsafe { AdvancedTimer::new() }, LED_PERIOD);
//!
//! // in the TIM7 handler
//! unsafe { BasicTimer::new(TIM7_BASE) }.acknowledge();
//! SHARED.keys.on_scan_tick(&mut keypad);
//! ```

use bit_field::BitField;
use volatile_register::{RO, RW, WO};

use crate::hal::{DacOutput, KeypadPort, RgbSink};
use crate::keypad::Rows;

pub const GPIOB_BASE: usize = 0x4800_0400;
pub const GPIOC_BASE: usize = 0x4800_0800;
pub const DAC_BASE: usize = 0x4000_7400;
pub const TIM1_BASE: usize = 0x4001_2C00;
pub const TIM6_BASE: usize = 0x4000_1000;
pub const TIM7_BASE: usize = 0x4000_1400;

/// TIM1 counts 0..LED_PERIOD at 48MHz, a 20kHz PWM.
pub const LED_PERIOD: u32 = 2400;

bitflags::bitflags! {
    /// Timer status register (`TIMx_SR`).
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TimerStatus: u32 {
        /// Update interrupt pending. Cleared by writing 0.
        const UIF = 1 << 0;
        const CC1IF = 1 << 1;
        const CC2IF = 1 << 2;
        const CC3IF = 1 << 3;
        const CC4IF = 1 << 4;
    }
}

#[repr(C)]
pub struct Gpio {
    pub moder: RW<u32>,
    pub otyper: RW<u32>,
    pub ospeedr: RW<u32>,
    pub pupdr: RW<u32>,
    pub idr: RO<u32>,
    pub odr: RW<u32>,
    pub bsrr: WO<u32>,
    pub lckr: RW<u32>,
    pub afrl: RW<u32>,
    pub afrh: RW<u32>,
    pub brr: WO<u32>,
}

impl Gpio {
    /// # Safety
    /// `base` must be a GPIO port and nothing else may hold it.
    pub unsafe fn new(base: usize) -> &'static mut Gpio {
        unsafe { &mut *(base as *mut Gpio) }
    }
}

#[repr(C)]
pub struct Dac {
    pub cr: RW<u32>,
    pub swtrigr: WO<u32>,
    pub dhr12r1: RW<u32>,
    pub dhr12l1: RW<u32>,
    pub dhr8r1: RW<u32>,
    pub dhr12r2: RW<u32>,
    pub dhr12l2: RW<u32>,
    pub dhr8r2: RW<u32>,
    pub dhr12rd: RW<u32>,
    pub dhr12ld: RW<u32>,
    pub dhr8rd: RW<u32>,
    pub dor1: RO<u32>,
    pub dor2: RO<u32>,
    pub sr: RW<u32>,
}

impl Dac {
    /// # Safety
    /// Nothing else may hold the DAC.
    pub unsafe fn new() -> &'static mut Dac {
        unsafe { &mut *(DAC_BASE as *mut Dac) }
    }
}

/// TIM6/TIM7.
#[repr(C)]
pub struct BasicTimer {
    pub cr1: RW<u32>,
    pub cr2: RW<u32>,
    _reserved0: u32,
    pub dier: RW<u32>,
    pub sr: RW<u32>,
    pub egr: WO<u32>,
    _reserved1: [u32; 3],
    pub cnt: RW<u32>,
    pub psc: RW<u32>,
    pub arr: RW<u32>,
}

impl BasicTimer {
    /// # Safety
    /// `base` must be TIM6 or TIM7, owned by the caller's interrupt handler.
    pub unsafe fn new(base: usize) -> &'static mut BasicTimer {
        unsafe { &mut *(base as *mut BasicTimer) }
    }

    /// Clear the pending update interrupt. Call first thing in the handler.
    #[inline(always)]
    pub fn acknowledge(&mut self) {
        unsafe { self.sr.modify(|sr| sr & !TimerStatus::UIF.bits()) }
    }

    pub fn pending(&self) -> TimerStatus {
        TimerStatus::from_bits_truncate(self.sr.read())
    }
}

/// TIM1, only as far as PWM output needs it.
#[repr(C)]
pub struct AdvancedTimer {
    pub cr1: RW<u32>,
    pub cr2: RW<u32>,
    pub smcr: RW<u32>,
    pub dier: RW<u32>,
    pub sr: RW<u32>,
    pub egr: WO<u32>,
    pub ccmr1: RW<u32>,
    pub ccmr2: RW<u32>,
    pub ccer: RW<u32>,
    pub cnt: RW<u32>,
    pub psc: RW<u32>,
    pub arr: RW<u32>,
    pub rcr: RW<u32>,
    pub ccr1: RW<u32>,
    pub ccr2: RW<u32>,
    pub ccr3: RW<u32>,
    pub ccr4: RW<u32>,
    pub bdtr: RW<u32>,
    pub dcr: RW<u32>,
    pub dmar: RW<u32>,
}

impl AdvancedTimer {
    /// # Safety
    /// Nothing else may hold TIM1.
    pub unsafe fn new() -> &'static mut AdvancedTimer {
        unsafe { &mut *(TIM1_BASE as *mut AdvancedTimer) }
    }
}

/// Rows on PC0-PC3 with pull-ups, columns on PC4-PC7 open-drain.
pub struct KeypadPins<'a> {
    gpio: &'a mut Gpio,
}

const ROW_BITS: core::ops::Range<usize> = 0..4;
const COLUMN_SHIFT: usize = 4;
const COLUMN_MASK: u32 = 0xF << COLUMN_SHIFT;

impl<'a> KeypadPins<'a> {
    /// Put PC0-PC7 in keypad mode and drive column 0.
    pub fn new(gpio: &'a mut Gpio) -> Self {
        unsafe {
            // PC4-PC7 general purpose outputs, PC0-PC3 inputs
            gpio.moder.modify(|m| (m & !0x0000_FFFF) | 0x0000_5500);
            gpio.pupdr.modify(|p| (p & !0x0000_00FF) | 0x0000_0055);
            gpio.otyper.modify(|o| o | COLUMN_MASK);
        }
        let mut pins = Self { gpio };
        pins.drive_column(0);
        pins
    }
}

impl KeypadPort for KeypadPins<'_> {
    fn read_rows(&mut self) -> Rows {
        Rows::from_bits_truncate(self.gpio.idr.read().get_bits(ROW_BITS) as u8)
    }

    fn drive_column(&mut self, column: u8) {
        let line = COLUMN_SHIFT + (column & 0b11) as usize;
        unsafe {
            // reset half of BSRR first, then set the one line
            self.gpio.bsrr.write(COLUMN_MASK << 16);
            self.gpio.bsrr.write(1 << line);
        }
    }
}

pub struct DacChannel1<'a> {
    dac: &'a mut Dac,
}

impl<'a> DacChannel1<'a> {
    pub fn new(dac: &'a mut Dac) -> Self {
        Self { dac }
    }
}

impl DacOutput for DacChannel1<'_> {
    #[inline(always)]
    fn write(&mut self, code: u16) {
        unsafe { self.dac.dhr12r1.write(code as u32 & 0x0FFF) }
    }
}

/// Common-anode RGB LED on TIM1 CH1-CH3. Outputs are active low, so a
/// brighter channel gets a smaller compare value.
pub struct PwmLed<'a> {
    tim: &'a mut AdvancedTimer,
    period: u32,
}

impl<'a> PwmLed<'a> {
    pub fn new(tim: &'a mut AdvancedTimer, period: u32) -> Self {
        Self { tim, period }
    }

    /// Compare value for a brightness percentage.
    pub fn compare(&self, level: u8) -> u32 {
        self.period * (100 - level.min(100) as u32) / 100
    }
}

impl RgbSink for PwmLed<'_> {
    fn set_color(&mut self, r: u8, g: u8, b: u8) {
        let (r, g, b) = (self.compare(r), self.compare(g), self.compare(b));
        unsafe {
            self.tim.ccr1.write(r);
            self.tim.ccr2.write(g);
            self.tim.ccr3.write(b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_wo(register: &WO<u32>) -> u32 {
        unsafe { core::ptr::read_volatile(register as *const WO<u32> as *const u32) }
    }

    #[test]
    fn register_offsets() {
        assert_eq!(core::mem::offset_of!(Gpio, idr), 0x10);
        assert_eq!(core::mem::offset_of!(Gpio, bsrr), 0x18);
        assert_eq!(core::mem::offset_of!(Gpio, brr), 0x28);
        assert_eq!(core::mem::offset_of!(Dac, dhr12r1), 0x08);
        assert_eq!(core::mem::offset_of!(Dac, sr), 0x34);
        assert_eq!(core::mem::offset_of!(BasicTimer, sr), 0x10);
        assert_eq!(core::mem::offset_of!(BasicTimer, arr), 0x2C);
        assert_eq!(core::mem::offset_of!(AdvancedTimer, ccr1), 0x34);
        assert_eq!(core::mem::offset_of!(AdvancedTimer, bdtr), 0x44);
    }

    #[test]
    fn keypad_pins_configure_and_scan() {
        let mut gpio: Gpio = unsafe { core::mem::zeroed() };
        {
            let mut pins = KeypadPins::new(&mut gpio);
            pins.drive_column(2);
        }
        assert_eq!(gpio.moder.read(), 0x5500);
        assert_eq!(gpio.pupdr.read(), 0x55);
        assert_eq!(gpio.otyper.read(), 0xF0);
        assert_eq!(read_wo(&gpio.bsrr), 1 << 6);

        unsafe { core::ptr::write_volatile(&mut gpio.idr as *mut RO<u32> as *mut u32, 0xFFF5) };
        let mut pins = KeypadPins { gpio: &mut gpio };
        assert_eq!(pins.read_rows(), Rows::ROW_0 | Rows::ROW_2);
    }

    #[test]
    fn dac_keeps_twelve_bits() {
        let mut dac: Dac = unsafe { core::mem::zeroed() };
        let mut channel = DacChannel1::new(&mut dac);
        channel.write(0xF123);
        assert_eq!(dac.dhr12r1.read(), 0x123);
    }

    #[test]
    fn led_is_active_low() {
        let mut tim: AdvancedTimer = unsafe { core::mem::zeroed() };
        let mut led = PwmLed::new(&mut tim, LED_PERIOD);
        led.set_color(100, 50, 0);
        assert_eq!(tim.ccr1.read(), 0);
        assert_eq!(tim.ccr2.read(), 1200);
        assert_eq!(tim.ccr3.read(), 2400);

        let mut led = PwmLed::new(&mut tim, LED_PERIOD);
        led.set_brightness(250);
        assert_eq!(tim.ccr2.read(), 0);
    }

    #[test]
    fn acknowledge_clears_update_flag() {
        let mut tim: BasicTimer = unsafe { core::mem::zeroed() };
        unsafe { tim.sr.write(0b11) };
        tim.acknowledge();
        assert_eq!(tim.pending(), TimerStatus::CC1IF);
    }
}
