// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Ultrasonic ranging over a trigger/echo pin pair.
//!
//! Independent of the line-following core: the ranger shares no state
//! with the PWM expander or the reflectance array.
//!
//! # Measurement
//!
//! A 10 microsecond trigger pulse starts a ping; the sensor then raises
//! the echo line for as long as the sound round-trip took. The distance
//! in centimeters is the echo width in microseconds divided by 58. A
//! missing echo (nothing in range, or a disconnected sensor) times out
//! and reads as 0.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Monotonic microsecond clock.
///
/// The pulse measurement only needs a forward-moving microsecond
/// timestamp; firmware backs this with its timebase, tests with a
/// scripted counter.
pub trait Monotonic {
    /// Returns the current timestamp in microseconds.
    fn now_micros(&mut self) -> u64;
}

/// Settle time before the trigger pulse, in microseconds.
const TRIGGER_SETTLE_US: u32 = 2;
/// Width of the trigger pulse, in microseconds.
const TRIGGER_PULSE_US: u32 = 10;
/// Longest echo worth waiting for, in microseconds (about two meters).
const ECHO_TIMEOUT_US: u64 = 11_600;
/// Echo microseconds per centimeter of distance.
const US_PER_CM: u32 = 58;

/// Ultrasonic ranger on a trigger/echo pin pair.
pub struct Ultrasonic<TRIG, ECHO, CLK> {
    trigger: TRIG,
    echo: ECHO,
    clock: CLK,
}

impl<TRIG, ECHO, CLK> Ultrasonic<TRIG, ECHO, CLK>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    CLK: Monotonic,
{
    /// Creates a ranger from its pins and a microsecond clock.
    pub fn new(trigger: TRIG, echo: ECHO, clock: CLK) -> Self {
        Self {
            trigger,
            echo,
            clock,
        }
    }

    /// Releases the pins and the clock.
    pub fn release(self) -> (TRIG, ECHO, CLK) {
        (self.trigger, self.echo, self.clock)
    }

    /// Fires one ping and returns the measured distance in centimeters.
    ///
    /// # Arguments
    ///
    /// * `delay` - blocking delay provider for the trigger timing
    ///
    /// # Returns
    ///
    /// Distance in centimeters, or 0 if no echo arrived within the
    /// timeout window.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let distance_cm = ranger.measure(&mut delay);
    /// if distance_cm != 0 && distance_cm < 10 {
    ///     // obstacle ahead
    /// }
    /// ```
    pub fn measure<D: DelayNs>(&mut self, delay: &mut D) -> u32 {
        self.trigger.set_low().ok();
        delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high().ok();
        delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().ok();

        self.pulse_in() / US_PER_CM
    }

    /// Measures the width of the next high pulse on the echo pin.
    ///
    /// Returns 0 if either edge fails to arrive within the timeout.
    fn pulse_in(&mut self) -> u32 {
        let rise = match self.wait_for_level(true, ECHO_TIMEOUT_US) {
            Some(timestamp) => timestamp,
            None => return 0,
        };
        let fall = match self.wait_for_level(false, ECHO_TIMEOUT_US) {
            Some(timestamp) => timestamp,
            None => return 0,
        };
        (fall - rise) as u32
    }

    /// Polls the echo pin until it reaches the given level.
    ///
    /// # Returns
    ///
    /// * `Some(timestamp)` - microsecond timestamp at which the level
    ///   was observed
    /// * `None` - timeout expired first
    fn wait_for_level(&mut self, high: bool, timeout_us: u64) -> Option<u64> {
        let start = self.clock.now_micros();
        loop {
            let now = self.clock.now_micros();
            if self.echo.is_high().unwrap_or(false) == high {
                return Some(now);
            }
            if now - start > timeout_us {
                return None;
            }
        }
    }
}
