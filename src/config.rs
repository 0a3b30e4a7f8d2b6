// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Hardware configuration for the robot chassis.
//!
//! This module defines the fixed hardware contract and the tuning
//! constants of the sensing pipeline:
//! - PWM expander address and output frequency
//! - Motor-to-channel wiring tables
//! - Servo pulse range
//! - Reflectance array geometry, thresholds and calibration sweep shape
//!
//! # Channel Map
//!
//! | Channel | Role                              |
//! |---------|-----------------------------------|
//! | 0       | Reflectance array power rail      |
//! | 1       | Motor 1 speed (PWM magnitude)     |
//! | 2       | Motor 1 forward direction         |
//! | 3       | Motor 1 reverse direction         |
//! | 4       | Motor 2 reverse direction         |
//! | 5       | Motor 2 forward direction         |
//! | 6       | Motor 2 speed (PWM magnitude)     |
//! | 7-15    | Free (hobby servos)               |
//!
//! The wiring is a property of the chassis PCB, not a tunable.
//! Substituting a different board means substituting these tables, not
//! editing the actuation code.

/// I2C address of the 16-channel PWM expander.
pub const PCA9685_ADDRESS: u8 = 0x40;

/// PWM output frequency shared by motors and servos (50 Hz, 20 ms frame).
pub const PWM_FREQUENCY_HZ: u16 = 50;

/// Number of reflectance sensors in the array.
pub const SENSOR_COUNT: usize = 5;

/// PWM channel that gates the reflectance array's power rail.
pub const SENSOR_POWER_CHANNEL: u8 = 0;

/// Settle time after dropping the sensor power rail, in milliseconds.
pub const SENSOR_SETTLE_MS: u32 = 2;

/// Largest raw reading the 10-bit sensor front-end can produce.
pub const ADC_MAX: u16 = 1023;

/// Channel triple driving one DC motor.
///
/// The sign of a speed command selects which direction channel is driven
/// fully on; the speed channel always carries the magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorWiring {
    /// Channel carrying the PWM magnitude.
    pub speed: u8,
    /// Direction channel driven fully on for positive speeds.
    pub forward: u8,
    /// Direction channel driven fully on for negative speeds.
    pub reverse: u8,
}

/// Wiring for motor 1.
pub const MOTOR1_WIRING: MotorWiring = MotorWiring {
    speed: 1,
    forward: 2,
    reverse: 3,
};

/// Wiring for motor 2.
pub const MOTOR2_WIRING: MotorWiring = MotorWiring {
    speed: 6,
    forward: 5,
    reverse: 4,
};

/// Multiplier mapping the -255..=255 speed range onto 12-bit ticks.
pub const SPEED_SCALE: i32 = 16;

/// Shortest servo pulse, commanding 0 degrees (microseconds).
pub const SERVO_PULSE_MIN_US: u32 = 600;

/// Servo pulse span across the full travel (microseconds).
pub const SERVO_PULSE_RANGE_US: u32 = 1800;

/// Full servo travel in degrees.
pub const SERVO_TRAVEL_DEGREES: u32 = 180;

/// Width of one PWM frame at 50 Hz (microseconds).
pub const SERVO_FRAME_US: u32 = 20_000;

/// Milliseconds of pause per unit of timed-maneuver duration.
pub const RUN_FOR_SCALE_MS: u32 = 100;

/// Iterations of the calibration sweep (roughly ten seconds of motion).
pub const CALIBRATION_ITERATIONS: usize = 100;

/// Raw samples taken per calibration iteration.
pub const SAMPLES_PER_ITERATION: usize = 5;

/// Motor speed used while sweeping across the line.
pub const SWEEP_SPEED: i16 = 100;

/// Iteration at which the sweep reverses from turning left to right.
pub const SWEEP_REVERSE_AT: usize = 25;

/// Iteration at which the sweep returns to turning left.
pub const SWEEP_RETURN_AT: usize = 75;

/// Seed upper calibration bound before any sweep has run.
pub const SEED_MAX: u16 = 650;

/// Seed lower calibration bound before any sweep has run.
pub const SEED_MIN: u16 = 100;

/// Upper end of the normalized sensor range.
pub const NORMALIZED_MAX: u16 = 1000;

/// Inverted reading above which a sensor is considered on the line.
pub const ON_LINE_THRESHOLD: u16 = 200;

/// Inverted readings at or below this level are excluded as noise.
pub const NOISE_THRESHOLD: u16 = 50;

/// Position weight per sensor index step.
pub const WEIGHT_STEP: u32 = 1000;
