// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Motor, servo and maneuver actuation over the PWM expander.
//!
//! This module provides the high-level interface for the two DC motors
//! and for hobby servos on the free expander channels.
//!
//! # Hardware Interface
//!
//! Each motor owns a channel triple on the expander: one speed channel
//! carrying the PWM magnitude and a direction pair of which exactly one
//! is driven fully on. The triples live in [`crate::config`]; the sign
//! of a speed command picks the active direction channel.
//!
//! # Speed Model
//!
//! Speeds are commanded in -255..=255 and scaled by 16 onto the
//! expander's 12-bit range, clamped to plus/minus 4095 so a full-scale
//! command never wraps the 4096-step counter.
//!
//! # Examples
//!
//! ```ignore
//! use kitibot::{Direction, Motor, MotorController, Pca9685};
//!
//! let mut motors = MotorController::new(Pca9685::new(i2c));
//!
//! // Spin motor 1 forward at about 60% duty.
//! motors.run_motor(Motor::M1, 150, &mut delay)?;
//!
//! // Rotate the chassis in place, then stop.
//! motors.run(Direction::TurnLeft, 100, &mut delay)?;
//! motors.run(Direction::Stop, 0, &mut delay)?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::command::{Direction, Motor};
use crate::config::{
    RUN_FOR_SCALE_MS, SERVO_FRAME_US, SERVO_PULSE_MIN_US, SERVO_PULSE_RANGE_US,
    SERVO_TRAVEL_DEGREES, SPEED_SCALE,
};
use crate::pca9685::{Pca9685, TICK_MAX};
use crate::Error;

/// Highest servo channel on the expander.
const CHANNEL_MAX: u8 = 15;

/// Dual DC motor and servo controller backed by a [`Pca9685`].
///
/// Direction changes write the direction pair before the magnitude so
/// the H-bridge inputs are settled before current flows.
pub struct MotorController<I2C> {
    pwm: Pca9685<I2C>,
}

impl<I2C, E> MotorController<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Creates a controller on top of the given expander driver.
    pub fn new(pwm: Pca9685<I2C>) -> Self {
        Self { pwm }
    }

    /// Grants access to the underlying expander driver.
    ///
    /// The sensor acquisition path uses this to gate the sensor power
    /// rail; it is not intended for direct channel writes.
    pub fn pwm_mut(&mut self) -> &mut Pca9685<I2C> {
        &mut self.pwm
    }

    /// Releases the underlying expander driver.
    pub fn release(self) -> Pca9685<I2C> {
        self.pwm
    }

    /// Runs one motor at a signed speed.
    ///
    /// # Arguments
    ///
    /// * `motor` - which motor to drive
    /// * `speed` - signed speed in -255..=255; the sign selects the
    ///   direction channel, the magnitude lands on the speed channel
    /// * `delay` - blocking delay provider for lazy initialization
    ///
    /// # Examples
    ///
    /// ```ignore
    /// motors.run_motor(Motor::M2, -200, &mut delay)?;
    /// ```
    pub fn run_motor<D: DelayNs>(
        &mut self,
        motor: Motor,
        speed: i16,
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        self.pwm.ensure_initialized(delay)?;
        let wiring = motor.wiring();
        let (forward, magnitude) = speed_to_ticks(speed);
        if forward {
            self.pwm.set_channel(wiring.forward, 0, TICK_MAX)?;
            self.pwm.set_channel(wiring.reverse, 0, 0)?;
        } else {
            self.pwm.set_channel(wiring.forward, 0, 0)?;
            self.pwm.set_channel(wiring.reverse, 0, TICK_MAX)?;
        }
        self.pwm.set_channel(wiring.speed, 0, magnitude)
    }

    /// Positions a servo on the given expander channel.
    ///
    /// The angle maps linearly onto a 600 to 2400 microsecond pulse
    /// inside the 20 ms frame.
    ///
    /// # Arguments
    ///
    /// * `channel` - expander channel the servo is wired to, 0..=15
    /// * `degree` - target angle, expected in 0..=180
    /// * `delay` - blocking delay provider for lazy initialization
    ///
    /// # Returns
    ///
    /// * `Ok(())` on success
    /// * `Err(Error::InvalidChannel)` if `channel` is out of range; the
    ///   check runs before any bus traffic, so an invalid channel never
    ///   triggers initialization
    pub fn run_servo<D: DelayNs>(
        &mut self,
        channel: u8,
        degree: u16,
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        if channel > CHANNEL_MAX {
            return Err(Error::InvalidChannel);
        }
        self.pwm.ensure_initialized(delay)?;
        self.pwm.set_channel(channel, 0, servo_ticks(degree))
    }

    /// Executes a named maneuver at the given speed.
    ///
    /// # Arguments
    ///
    /// * `direction` - maneuver to execute
    /// * `speed` - speed in -255..=255, ignored by [`Direction::Stop`]
    /// * `delay` - blocking delay provider for lazy initialization
    pub fn run<D: DelayNs>(
        &mut self,
        direction: Direction,
        speed: i16,
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        let (m1, m2) = direction.motor_speeds(speed);
        self.run_motor(Motor::M1, m1, delay)?;
        self.run_motor(Motor::M2, m2, delay)
    }

    /// Executes a maneuver for a bounded time, then stops.
    ///
    /// The pause is `time * 100` milliseconds of blocking delay; this is
    /// the only suspension point in the actuation layer.
    ///
    /// # Arguments
    ///
    /// * `direction` - maneuver to execute
    /// * `speed` - speed in -255..=255
    /// * `time` - duration in 100 ms units
    /// * `delay` - blocking delay provider
    pub fn run_for<D: DelayNs>(
        &mut self,
        direction: Direction,
        speed: i16,
        time: u32,
        delay: &mut D,
    ) -> Result<(), Error<E>> {
        self.run(direction, speed, delay)?;
        delay.delay_ms(time * RUN_FOR_SCALE_MS);
        self.run(Direction::Stop, 0, delay)
    }
}

/// Splits a signed speed into direction and 12-bit magnitude ticks.
///
/// Zero counts as forward, matching the direction pair a stopped motor
/// is left in.
fn speed_to_ticks(speed: i16) -> (bool, u16) {
    let scaled = (speed as i32) * SPEED_SCALE;
    let clamped = scaled.clamp(-(TICK_MAX as i32), TICK_MAX as i32);
    (scaled >= 0, clamped.unsigned_abs() as u16)
}

/// Off-tick for a servo pulse at the given angle.
fn servo_ticks(degree: u16) -> u16 {
    let pulse_us =
        (degree as u32) * SERVO_PULSE_RANGE_US / SERVO_TRAVEL_DEGREES + SERVO_PULSE_MIN_US;
    (pulse_us * 4096 / SERVO_FRAME_US) as u16
}
