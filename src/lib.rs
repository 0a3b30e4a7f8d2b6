// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! KitiBot chassis driver and line-sensing pipeline.
//!
//! This crate drives a small two-motor wheeled robot built around a
//! 16-channel I2C PWM expander (PCA9685) and a 5-element reflectance
//! sensor array read over a bit-banged 3-wire serial interface.
//!
//! # Hardware Configuration
//! - **PWM expander**: PCA9685 at address 0x40, 50 Hz output frame
//!   - Motor 1: channels 1 (speed), 2/3 (direction pair)
//!   - Motor 2: channels 6 (speed), 5/4 (direction pair)
//!   - Channel 0 gates the reflectance array's power rail
//!   - Remaining channels are free for hobby servos
//! - **Reflectance array**: five 10-bit sensors behind a serial ADC,
//!   clocked over three fixed-role GPIO lines
//! - **Ultrasonic ranger**: trigger/echo pair, independent of the
//!   line-following core
//!
//! # Features
//! - Motor, servo and named-maneuver actuation with timed variants
//! - Adaptive min/max sensor calibration over a fixed oscillating sweep
//! - Normalized weighted-centroid line position with loss-of-line fallback
//! - Lenient (clamp/no-op) or strict (hard error) input handling
//!
//! All hardware access goes through [`embedded-hal`](embedded_hal) 1.0
//! traits, so the whole pipeline runs unmodified against mock buses and
//! pins on a development host.
//!
//! # Example
//! ```ignore
//! use kitibot::{Direction, Robot};
//!
//! let mut robot = Robot::new(i2c, address_select, data_in, clock, delay);
//!
//! // Sweep across the line once to learn per-sensor bounds.
//! robot.calibrate()?;
//!
//! loop {
//!     let position = robot.read_line()?; // 0..=4000, 2000 is centered
//!     if position < 1200 {
//!         robot.run(Direction::TurnLeft, 80)?;
//!     } else if position > 2800 {
//!         robot.run(Direction::TurnRight, 80)?;
//!     } else {
//!         robot.run(Direction::Forward, 100)?;
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod command;
pub mod config;
pub mod controller;
pub mod line;
pub mod motor;
pub mod pca9685;
pub mod sensor;
pub mod ultrasonic;

pub use calibration::Calibration;
pub use command::{Direction, Motor};
pub use controller::Robot;
pub use line::LineEstimator;
pub use motor::MotorController;
pub use pca9685::Pca9685;
pub use sensor::SensorArray;
pub use ultrasonic::{Monotonic, Ultrasonic};

/// Errors produced by robot operations.
///
/// `E` is the error type of the underlying I2C bus. Bus failures are
/// never masked: they propagate through every layer regardless of the
/// configured [`Strictness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A PWM channel outside 0..=15 was addressed.
    InvalidChannel,
    /// A raw maneuver code named no known direction.
    InvalidDirection,
    /// Calibration bounds collapsed (max <= min) for at least one sensor.
    DegenerateCalibration,
    /// The two-wire bus reported a failure.
    Bus(E),
}

/// How the robot reacts to out-of-range inputs and degenerate state.
///
/// The default is [`Strictness::Lenient`]: invalid channels and unknown
/// maneuver codes become no-ops and collapsed calibration bounds clamp
/// to zero, so actuation and calibration never abort the caller's
/// control flow. [`Strictness::Strict`] surfaces the same conditions as
/// [`Error`] values instead, which is the mode the test suite uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Strictness {
    /// Clamp values and ignore invalid addressing.
    #[default]
    Lenient,
    /// Report invalid inputs and degenerate state as errors.
    Strict,
}
