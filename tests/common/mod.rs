// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Shared fixtures for the hardware-mock integration tests.
//!
//! The builders here mirror the byte frames the drivers are expected to
//! put on the bus, so tests assemble expectation lists instead of
//! hand-writing transaction vectors.

// Not every test binary exercises every fixture.
#![allow(dead_code)]

use embedded_hal_mock::eh1::digital::{State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::eh1::i2c::Transaction as I2cTransaction;

/// Bus address of the PWM expander.
pub const ADDR: u8 = 0x40;

/// Number of reflectance sensors.
pub const SENSOR_COUNT: usize = 5;

/// Expected frame for one channel's duty-cycle write.
pub fn channel_write(channel: u8, on: u16, off: u16) -> I2cTransaction {
    I2cTransaction::write(
        ADDR,
        vec![
            0x06 + 4 * channel,
            (on & 0xFF) as u8,
            (on >> 8) as u8,
            (off & 0xFF) as u8,
            (off >> 8) as u8,
        ],
    )
}

/// Expected transaction sequence for lazy initialization.
///
/// MODE1 reset, the 50 Hz prescaler sequence, sensor rail on, every
/// other channel zeroed.
pub fn init_sequence() -> Vec<I2cTransaction> {
    let mut transactions = vec![
        I2cTransaction::write(ADDR, vec![0x00, 0x00]), // MODE1 reset
        I2cTransaction::write_read(ADDR, vec![0x00], vec![0x00]), // read MODE1
        I2cTransaction::write(ADDR, vec![0x00, 0x10]), // sleep
        I2cTransaction::write(ADDR, vec![0xFE, 121]),  // prescale for 50 Hz
        I2cTransaction::write(ADDR, vec![0x00, 0x00]), // wake
        I2cTransaction::write(ADDR, vec![0x00, 0xA1]), // restart + auto-increment
        channel_write(0, 0, 4095),                     // sensor rail on
    ];
    for channel in 1..=15 {
        transactions.push(channel_write(channel, 0, 0));
    }
    transactions
}

/// Expected channel writes for one motor command.
///
/// `wiring` is the (speed, forward, reverse) channel triple.
pub fn motor_writes(wiring: (u8, u8, u8), speed: i16) -> Vec<I2cTransaction> {
    let (speed_channel, forward_channel, reverse_channel) = wiring;
    let scaled = (speed as i32 * 16).clamp(-4095, 4095);
    let (forward_on, reverse_on) = if scaled >= 0 { (4095, 0) } else { (0, 4095) };
    vec![
        channel_write(forward_channel, 0, forward_on),
        channel_write(reverse_channel, 0, reverse_on),
        channel_write(speed_channel, 0, scaled.unsigned_abs() as u16),
    ]
}

/// Expected channel writes for a two-motor maneuver.
pub fn run_writes(m1_speed: i16, m2_speed: i16) -> Vec<I2cTransaction> {
    let mut transactions = motor_writes((1, 2, 3), m1_speed);
    transactions.extend(motor_writes((6, 5, 4), m2_speed));
    transactions
}

/// Expected writes that gate the sensor power rail around an acquisition.
pub fn gate_off() -> I2cTransaction {
    channel_write(0, 0, 0)
}

/// Expected write that restores the sensor power rail.
pub fn gate_on() -> I2cTransaction {
    channel_write(0, 0, 4095)
}

/// Pin expectation script for one full 6-round acquisition.
///
/// `rounds[0]` is the discarded leading round; `rounds[1..]` become the
/// five sensor readings. Returns the (address-select, data, clock)
/// expectation lists.
pub fn acquisition_script(
    rounds: &[u16; SENSOR_COUNT + 1],
) -> (
    Vec<PinTransaction>,
    Vec<PinTransaction>,
    Vec<PinTransaction>,
) {
    let mut select = Vec::new();
    let mut data = Vec::new();
    let mut clock = Vec::new();

    for (round, &value) in rounds.iter().enumerate() {
        for bit in 0..10 {
            if bit < 4 {
                let level = if (round >> (3 - bit)) & 0x01 != 0 {
                    PinState::High
                } else {
                    PinState::Low
                };
                select.push(PinTransaction::set(level));
            }
            let level = if (value >> (9 - bit)) & 0x01 != 0 {
                PinState::High
            } else {
                PinState::Low
            };
            data.push(PinTransaction::get(level));
            clock.push(PinTransaction::set(PinState::High));
            clock.push(PinTransaction::set(PinState::Low));
        }
    }

    (select, data, clock)
}

/// Appends the expectations for one gated sample to running lists.
pub fn gated_sample(
    i2c: &mut Vec<I2cTransaction>,
    select: &mut Vec<PinTransaction>,
    data: &mut Vec<PinTransaction>,
    clock: &mut Vec<PinTransaction>,
    rounds: &[u16; SENSOR_COUNT + 1],
) {
    i2c.push(gate_off());
    let (s, d, c) = acquisition_script(rounds);
    select.extend(s);
    data.extend(d);
    clock.extend(c);
    i2c.push(gate_on());
}
