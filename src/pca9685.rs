// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! PCA9685 16-channel PWM expander driver.
//!
//! This module handles I2C framing and register access for the PCA9685.
//! Motor, servo and sensor-rail control are layered on top of these
//! primitives.
//!
//! # Device Model
//!
//! Each of the 16 channels holds an on-tick and an off-tick inside a
//! 4096-step cycle; the pair is written as a single 4-byte register
//! block. The cycle frequency is global and derived from the internal
//! 25 MHz oscillator through an 8-bit prescaler, which may only be
//! written while the oscillator sleeps.
//!
//! The driver keeps no retry logic. Bus failures surface as
//! [`Error::Bus`] and are left to the caller.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::config::{PCA9685_ADDRESS, PWM_FREQUENCY_HZ, SENSOR_POWER_CHANNEL};
use crate::Error;

/// Register addresses
pub mod reg {
    pub const MODE1: u8 = 0x00;
    pub const MODE2: u8 = 0x01;
    pub const SUBADR1: u8 = 0x02;
    pub const SUBADR2: u8 = 0x03;
    pub const SUBADR3: u8 = 0x04;
    pub const LED0_ON_L: u8 = 0x06;
    pub const ALL_LED_ON_L: u8 = 0xFA;
    pub const ALL_LED_OFF_L: u8 = 0xFC;
    pub const PRESCALE: u8 = 0xFE;
}

/// MODE1 restart bit; must not survive a sleep entry.
const MODE1_RESTART: u8 = 0x80;
/// MODE1 sleep bit; the oscillator is off while it is set.
const MODE1_SLEEP: u8 = 0x10;
/// MODE1 restart + register auto-increment + allcall, written after wake.
const MODE1_RESTART_AI_ALLCALL: u8 = 0xA1;

/// Internal oscillator frequency in Hz.
const OSC_CLOCK_HZ: u32 = 25_000_000;
/// Counter steps per PWM cycle.
const COUNTER_STEPS: u32 = 4096;
/// Highest addressable channel.
const CHANNEL_MAX: u8 = 15;
/// Oscillator settle time after leaving sleep, in microseconds.
const WAKE_SETTLE_US: u32 = 5_000;

/// Highest on/off tick value within one cycle.
pub const TICK_MAX: u16 = 4095;

/// PCA9685 driver bound to an I2C bus.
///
/// The driver is lazily initialized: the first actuation call puts the
/// device into a known state (50 Hz frame, sensor rail on, every other
/// channel off). Construction itself performs no bus traffic.
pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
    initialized: bool,
}

impl<I2C, E> Pca9685<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Constructs a driver for the expander at the default address.
    ///
    /// # Arguments
    ///
    /// * `i2c` - two-wire bus the expander is attached to
    ///
    /// # Returns
    ///
    /// A driver in the uninitialized state; no bus traffic occurs until
    /// the first operation.
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: PCA9685_ADDRESS,
            initialized: false,
        }
    }

    /// Releases the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Error::Bus)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Error<E>> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut value)
            .map_err(Error::Bus)?;
        Ok(value[0])
    }

    /// Programs one channel's duty-cycle pair.
    ///
    /// On- and off-ticks are clamped to 0..=4095 and written as a single
    /// 4-byte block.
    ///
    /// # Arguments
    ///
    /// * `channel` - output channel, 0..=15
    /// * `on` - tick at which the output asserts
    /// * `off` - tick at which the output deasserts
    ///
    /// # Returns
    ///
    /// * `Ok(())` on success
    /// * `Err(Error::InvalidChannel)` if `channel` is out of range
    /// * `Err(Error::Bus)` on bus failure
    pub fn set_channel(&mut self, channel: u8, on: u16, off: u16) -> Result<(), Error<E>> {
        if channel > CHANNEL_MAX {
            return Err(Error::InvalidChannel);
        }
        let on = on.min(TICK_MAX);
        let off = off.min(TICK_MAX);
        let frame = [
            reg::LED0_ON_L + 4 * channel,
            (on & 0xFF) as u8,
            (on >> 8) as u8,
            (off & 0xFF) as u8,
            (off >> 8) as u8,
        ];
        self.i2c.write(self.address, &frame).map_err(Error::Bus)
    }

    /// Reprograms the global PWM frequency.
    ///
    /// The prescaler can only be written while the oscillator sleeps, so
    /// the sequence is: enter sleep, write the prescaler, restore the
    /// previous mode, wait for the oscillator to settle, then re-enable
    /// outputs with restart and auto-increment.
    ///
    /// # Arguments
    ///
    /// * `freq_hz` - target frame frequency in Hz
    /// * `delay` - blocking delay provider for the settle window
    pub fn set_frequency<D: DelayNs>(&mut self, freq_hz: u16, delay: &mut D) -> Result<(), Error<E>> {
        let prescale = prescale_for(freq_hz);
        let old_mode = self.read_register(reg::MODE1)?;
        let sleep_mode = (old_mode & !MODE1_RESTART) | MODE1_SLEEP;
        self.write_register(reg::MODE1, sleep_mode)?;
        self.write_register(reg::PRESCALE, prescale)?;
        self.write_register(reg::MODE1, old_mode)?;
        delay.delay_us(WAKE_SETTLE_US);
        self.write_register(reg::MODE1, old_mode | MODE1_RESTART_AI_ALLCALL)
    }

    /// Puts the device into its known starting state.
    ///
    /// Resets MODE1, programs the 50 Hz frame, switches the sensor power
    /// rail fully on and zeroes every other channel, then marks the
    /// driver ready.
    ///
    /// # Arguments
    ///
    /// * `delay` - blocking delay provider for the frequency settle window
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        self.write_register(reg::MODE1, 0x00)?;
        self.set_frequency(PWM_FREQUENCY_HZ, delay)?;
        self.set_channel(SENSOR_POWER_CHANNEL, 0, TICK_MAX)?;
        for channel in 1..=CHANNEL_MAX {
            self.set_channel(channel, 0, 0)?;
        }
        self.initialized = true;
        #[cfg(feature = "defmt")]
        defmt::info!("PWM expander initialized");
        Ok(())
    }

    /// Initializes the device on first use; later calls are free.
    pub fn ensure_initialized<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        if self.initialized {
            return Ok(());
        }
        self.initialize(delay)
    }
}

/// Prescaler value for the given frame frequency.
///
/// `prescale = round(25 MHz / 4096 / freq) - 1`, computed in integer
/// arithmetic and saturated to the 8-bit register range.
fn prescale_for(freq_hz: u16) -> u8 {
    let freq = freq_hz as u32;
    let cycle = OSC_CLOCK_HZ / COUNTER_STEPS;
    (((cycle + freq / 2) / freq).saturating_sub(1)).min(0xFF) as u8
}
