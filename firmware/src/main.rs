// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! RP2350 Line-Following Robot Firmware
//!
//! This firmware drives the kitibot chassis from an RP2350 board using
//! the Embassy async runtime: it calibrates the reflectance array with
//! one sweep at boot, then follows the line by steering on the position
//! estimate, stopping when the ultrasonic ranger reports an obstacle.
//!
//! # Hardware Configuration
//! - **Microcontroller**: RP2350A (ARM Cortex-M33)
//! - **PWM expander**: PCA9685 on I2C0
//!   - SDA: GPIO 4, SCL: GPIO 5
//!   - Motors and the sensor power rail are wired per `kitibot::config`
//! - **Reflectance array**: bit-banged serial interface
//!   - Address select: GPIO 10, Data in: GPIO 11, Clock: GPIO 12
//! - **Ultrasonic ranger**: Trigger on GPIO 14, Echo on GPIO 15
//! - **Status LED**: GPIO 25
//!
//! # Behavior
//! 1. Wait three seconds so the robot can be placed over the track
//! 2. Run the calibration sweep (about ten seconds of oscillation)
//! 3. Follow the line: steer toward the estimate, hold the center band
//! 4. Stop while an obstacle sits closer than 10 cm
//!
//! # Build
//! ```bash
//! cargo build --release --target thumbv8m.main-none-eabihf
//! ```
//!
//! # Flash
//! ```bash
//! probe-rs run --chip RP235x target/thumbv8m.main-none-eabihf/release/kitibot-firmware
//! ```

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Instant, Timer};
use kitibot::{Direction, Monotonic, Robot, Ultrasonic};
use {defmt_rtt as _, panic_probe as _};

/// Boot block marking this image as an Arm secure executable.
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

/// Program metadata for picotool info command
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"KitiBot Line Follower"),
    embassy_rp::binary_info::rp_program_description!(c"RP2350A line-following robot"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Pause before the calibration sweep starts, in seconds.
const PLACEMENT_DELAY_SECS: u64 = 3;
/// Forward speed while the line sits in the center band.
const CRUISE_SPEED: i16 = 100;
/// Rotation speed while steering back toward the line.
const TURN_SPEED: i16 = 80;
/// Position below which the robot steers left.
const TURN_LEFT_BELOW: u16 = 1200;
/// Position above which the robot steers right.
const TURN_RIGHT_ABOVE: u16 = 2800;
/// Obstacle distance that halts the robot, in centimeters.
const OBSTACLE_STOP_CM: u32 = 10;
/// Control loop period in milliseconds.
const LOOP_PERIOD_MS: u64 = 10;

/// Microsecond clock backed by the Embassy timebase.
struct BootClock;

impl Monotonic for BootClock {
    fn now_micros(&mut self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Main robot control task
///
/// Brings up the peripherals, runs the boot calibration sweep, then
/// enters the line-following loop. Never returns.
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("KitiBot firmware starting");
    let p = embassy_rp::init(Default::default());

    // Status LED on GPIO 25
    let mut led = Output::new(p.PIN_25, Level::Low);

    // PWM expander on I2C0
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());

    // Reflectance array protocol pins
    let address_select = Output::new(p.PIN_10, Level::Low);
    let data_in = Input::new(p.PIN_11, Pull::Down);
    let clock = Output::new(p.PIN_12, Level::Low);

    // Ultrasonic ranger pins
    let trigger = Output::new(p.PIN_14, Level::Low);
    let echo = Input::new(p.PIN_15, Pull::None);

    let mut robot = Robot::new(i2c, address_select, data_in, clock, Delay);
    let mut ranger = Ultrasonic::new(trigger, echo, BootClock);

    // Let the operator place the robot over the track, then learn the
    // per-sensor bounds with one sweep.
    Timer::after_secs(PLACEMENT_DELAY_SECS).await;
    match robot.calibrate() {
        Ok(()) => info!(
            "calibrated: max={} min={}",
            robot.sensor_max(),
            robot.sensor_min()
        ),
        Err(e) => warn!("calibration failed: {}", e),
    }

    info!("Robot ready! Following the line...");
    led.set_high();

    loop {
        let distance_cm = ranger.measure(&mut Delay);
        if distance_cm != 0 && distance_cm < OBSTACLE_STOP_CM {
            if robot.run(Direction::Stop, 0).is_err() {
                warn!("stop command failed");
            }
            led.toggle();
            Timer::after_millis(LOOP_PERIOD_MS).await;
            continue;
        }

        match robot.read_line() {
            Ok(position) => {
                let result = if position < TURN_LEFT_BELOW {
                    robot.run(Direction::TurnLeft, TURN_SPEED)
                } else if position > TURN_RIGHT_ABOVE {
                    robot.run(Direction::TurnRight, TURN_SPEED)
                } else {
                    robot.run(Direction::Forward, CRUISE_SPEED)
                };
                if result.is_err() {
                    warn!("steer command failed");
                }
            }
            Err(e) => {
                warn!("line read failed: {}", e);
                let _ = robot.run(Direction::Stop, 0);
            }
        }

        Timer::after_millis(LOOP_PERIOD_MS).await;
    }
}
