// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Robot facade: actuation, acquisition, calibration and estimation.
//!
//! [`Robot`] owns every moving part of the pipeline (the motor layer
//! with its PWM expander, the sensor array, the calibration bounds and
//! the line estimator) and exposes the operations a control loop
//! consumes. Ownership replaces process-wide state: only
//! [`Robot::calibrate`] writes the calibration bounds and only
//! [`Robot::read_line`] updates the remembered line position.
//!
//! # Strictness
//!
//! Every operation reports through [`Result`], but with the default
//! [`Strictness::Lenient`] policy invalid channels and unknown maneuver
//! codes are absorbed as no-ops and collapsed calibration bounds clamp
//! to zero. [`Strictness::Strict`] surfaces all of these as errors. Bus
//! failures are errors in both modes.
//!
//! # Timing
//!
//! Everything here runs to completion on the caller's thread; the only
//! suspension points are blocking delays (the settle window after
//! gating sensor power, the PWM wake settle and the timed-maneuver
//! pause). A full calibration sweep keeps the chassis moving for about
//! ten seconds and cannot be aborted mid-flight.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

use crate::calibration::{sweep_direction, Calibration, SampleExtremes};
use crate::command::{Direction, Motor};
use crate::config::{
    CALIBRATION_ITERATIONS, SAMPLES_PER_ITERATION, SENSOR_COUNT, SENSOR_POWER_CHANNEL,
    SENSOR_SETTLE_MS, SWEEP_SPEED,
};
use crate::line::LineEstimator;
use crate::motor::MotorController;
use crate::pca9685::{Pca9685, TICK_MAX};
use crate::sensor::SensorArray;
use crate::{Error, Strictness};

/// The assembled robot.
///
/// Generic over the I2C bus, the three sensor pins and the delay
/// provider, so the entire pipeline runs against real peripherals and
/// against mocks alike.
pub struct Robot<I2C, SEL, DATA, CLK, D> {
    motors: MotorController<I2C>,
    sensors: SensorArray<SEL, DATA, CLK>,
    calibration: Calibration,
    line: LineEstimator,
    delay: D,
    strictness: Strictness,
}

impl<I2C, E, SEL, DATA, CLK, D> Robot<I2C, SEL, DATA, CLK, D>
where
    I2C: I2c<Error = E>,
    SEL: OutputPin,
    DATA: InputPin,
    CLK: OutputPin,
    D: DelayNs,
{
    /// Assembles a robot from its hardware resources.
    ///
    /// # Arguments
    ///
    /// * `i2c` - bus the PWM expander is attached to
    /// * `address_select` - sensor protocol address output
    /// * `data_in` - sensor protocol data input
    /// * `clock` - sensor protocol clock output
    /// * `delay` - blocking delay provider
    ///
    /// # Returns
    ///
    /// A robot with seed calibration bounds, the line remembered as
    /// "to the left", and the lenient input policy.
    pub fn new(i2c: I2C, address_select: SEL, data_in: DATA, clock: CLK, delay: D) -> Self {
        Self {
            motors: MotorController::new(Pca9685::new(i2c)),
            sensors: SensorArray::new(address_select, data_in, clock),
            calibration: Calibration::new(),
            line: LineEstimator::new(),
            delay,
            strictness: Strictness::default(),
        }
    }

    /// Selects how invalid inputs and degenerate state are reported.
    pub fn set_strictness(&mut self, strictness: Strictness) {
        self.strictness = strictness;
    }

    /// Returns the active strictness policy.
    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Tears the robot down into its hardware resources.
    pub fn release(self) -> (I2C, SEL, DATA, CLK, D) {
        let i2c = self.motors.release().release();
        let (address_select, data_in, clock) = self.sensors.release();
        (i2c, address_select, data_in, clock, self.delay)
    }

    /// Applies the lenient policy to an actuation result.
    fn guard(&self, result: Result<(), Error<E>>) -> Result<(), Error<E>> {
        match (self.strictness, result) {
            (Strictness::Lenient, Err(Error::InvalidChannel))
            | (Strictness::Lenient, Err(Error::InvalidDirection)) => Ok(()),
            (_, other) => other,
        }
    }

    /// Positions a servo on an expander channel.
    ///
    /// An out-of-range channel is a no-op in lenient mode and
    /// [`Error::InvalidChannel`] in strict mode.
    ///
    /// # Arguments
    ///
    /// * `channel` - expander channel, 0..=15
    /// * `degree` - target angle, expected in 0..=180
    pub fn servo(&mut self, channel: u8, degree: u16) -> Result<(), Error<E>> {
        let result = self.motors.run_servo(channel, degree, &mut self.delay);
        self.guard(result)
    }

    /// Runs one motor at a signed speed in -255..=255.
    pub fn motor_run(&mut self, motor: Motor, speed: i16) -> Result<(), Error<E>> {
        self.motors.run_motor(motor, speed, &mut self.delay)
    }

    /// Runs a motor named by its raw protocol code.
    ///
    /// An unknown code is a no-op in lenient mode and
    /// [`Error::InvalidChannel`] in strict mode.
    pub fn motor_run_code(&mut self, code: u8, speed: i16) -> Result<(), Error<E>> {
        match Motor::from_code(code) {
            Some(motor) => self.motor_run(motor, speed),
            None => self.guard(Err(Error::InvalidChannel)),
        }
    }

    /// Executes a named maneuver at the given speed.
    pub fn run(&mut self, direction: Direction, speed: i16) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("run {} at {}", direction, speed);
        self.motors.run(direction, speed, &mut self.delay)
    }

    /// Executes a maneuver named by its raw protocol code.
    ///
    /// An unknown code is a no-op in lenient mode and
    /// [`Error::InvalidDirection`] in strict mode.
    pub fn run_code(&mut self, code: u8, speed: i16) -> Result<(), Error<E>> {
        match Direction::from_code(code) {
            Some(direction) => self.run(direction, speed),
            None => self.guard(Err(Error::InvalidDirection)),
        }
    }

    /// Executes a maneuver for `time * 100` milliseconds, then stops.
    pub fn run_for(&mut self, direction: Direction, speed: i16, time: u32) -> Result<(), Error<E>> {
        self.motors.run_for(direction, speed, time, &mut self.delay)
    }

    /// Acquires one raw sample from the reflectance array.
    ///
    /// Drops the array's power rail, lets it settle, shifts the five
    /// readings out and restores the rail.
    ///
    /// # Returns
    ///
    /// One raw 10-bit reading per sensor, in array order.
    pub fn analog_read(&mut self) -> Result<[u16; SENSOR_COUNT], Error<E>> {
        let pwm = self.motors.pwm_mut();
        pwm.ensure_initialized(&mut self.delay)?;
        pwm.set_channel(SENSOR_POWER_CHANNEL, 0, 0)?;
        self.delay.delay_ms(SENSOR_SETTLE_MS);
        let readings = self.sensors.acquire();
        self.motors
            .pwm_mut()
            .set_channel(SENSOR_POWER_CHANNEL, 0, TICK_MAX)?;
        Ok(readings)
    }

    /// Runs the full calibration sweep.
    ///
    /// Resets the bounds to the widest range, then oscillates the
    /// chassis across the line for 100 iterations (left, right, left),
    /// sampling five times per iteration and folding each iteration's
    /// extremes into the bounds. Stops the motors afterwards.
    ///
    /// This is the one long-running operation in the crate: roughly ten
    /// seconds of physical motion with no way to abort mid-sweep.
    pub fn calibrate(&mut self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::info!("calibration sweep started");
        self.calibration.reset_for_sweep();

        for iteration in 0..CALIBRATION_ITERATIONS {
            self.run(sweep_direction(iteration), SWEEP_SPEED)?;

            let mut extremes = SampleExtremes::new();
            for _ in 0..SAMPLES_PER_ITERATION {
                let raw = self.analog_read()?;
                extremes.observe(&raw);
            }
            self.calibration.fold_iteration(&extremes.min, &extremes.max);
        }

        self.run(Direction::Stop, 0)?;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "calibration sweep finished: max={} min={}",
            self.calibration.max(),
            self.calibration.min()
        );
        Ok(())
    }

    /// Returns the per-sensor upper calibration bounds.
    pub fn sensor_max(&self) -> [u16; SENSOR_COUNT] {
        self.calibration.max()
    }

    /// Returns the per-sensor lower calibration bounds.
    pub fn sensor_min(&self) -> [u16; SENSOR_COUNT] {
        self.calibration.min()
    }

    /// Acquires a sample and normalizes it against the bounds.
    ///
    /// Each value lands in 0..=1000, where 0 corresponds to a sensor's
    /// calibrated minimum and 1000 to its maximum. A sensor with
    /// collapsed bounds reads 0 in lenient mode and raises
    /// [`Error::DegenerateCalibration`] in strict mode.
    pub fn read_calibrated(&mut self) -> Result<[u16; SENSOR_COUNT], Error<E>> {
        let raw = self.analog_read()?;
        let normalized = self.calibration.normalize(&raw);

        let mut values = [0u16; SENSOR_COUNT];
        for (slot, value) in values.iter_mut().zip(normalized) {
            match value {
                Some(value) => *slot = value,
                None => match self.strictness {
                    Strictness::Strict => return Err(Error::DegenerateCalibration),
                    Strictness::Lenient => {}
                },
            }
        }
        Ok(values)
    }

    /// Estimates the current line position.
    ///
    /// Acquires and normalizes a sample, then reports the weighted
    /// centroid in 0..=4000 (2000 is centered). When the line is lost
    /// the estimator falls back to the extreme on the side the line was
    /// last seen; see [`crate::line`] for the exact rule.
    pub fn read_line(&mut self) -> Result<u16, Error<E>> {
        let calibrated = self.read_calibrated()?;
        Ok(self.line.estimate(&calibrated))
    }

    /// Returns the most recent on-line position estimate.
    pub fn last_position(&self) -> u16 {
        self.line.last_position()
    }
}
