// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Bit-banged acquisition for the 5-element reflectance array.
//!
//! The array sits behind a serial ADC that is clocked over three GPIO
//! lines with fixed roles:
//!
//! - **Address select** (output): carries the 4-bit channel address for
//!   the next conversion, shifted out MSB-first during the first four
//!   clocks of a round
//! - **Data in** (input): returns the previous conversion one bit per
//!   clock, MSB-first
//! - **Clock strobe** (output): pulsed high then low once per bit
//!
//! # Protocol
//!
//! ```text
//! round:   0      1      2      3      4      5
//! address: ch 0   ch 1   ch 2   ch 3   ch 4   ch 5
//! result:  (old)  ch 0   ch 1   ch 2   ch 3   ch 4
//! ```
//!
//! Each round shifts 10 bits; because the ADC answers with the
//! conversion started in the previous round, round 0 returns whatever
//! conversion was pending and is discarded. Six rounds therefore yield
//! the five sensor readings.
//!
//! The protocol is timing-only: there is no acknowledge to fail on, so
//! acquisition always produces five readings in 0..=1023. The caller is
//! responsible for powering the array rail down around the transfer (the
//! ADC shares the rail with the emitter LEDs, which would otherwise
//! couple into the measurement).

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::SENSOR_COUNT;

/// Bits shifted per round: 4 address bits overlapped with a 10-bit result.
const BITS_PER_ROUND: usize = 10;
/// Leading bits of each round that also carry the channel address.
const ADDRESS_BITS: usize = 4;

/// Reflectance array interface over three fixed-role pins.
///
/// Pin roles must not be reassigned; the protocol has no way to detect
/// swapped lines and will silently return garbage.
pub struct SensorArray<SEL, DATA, CLK> {
    address_select: SEL,
    data_in: DATA,
    clock: CLK,
}

impl<SEL, DATA, CLK> SensorArray<SEL, DATA, CLK>
where
    SEL: OutputPin,
    DATA: InputPin,
    CLK: OutputPin,
{
    /// Creates an array interface from its three protocol pins.
    ///
    /// # Arguments
    ///
    /// * `address_select` - channel address output
    /// * `data_in` - serial result input
    /// * `clock` - clock strobe output
    pub fn new(address_select: SEL, data_in: DATA, clock: CLK) -> Self {
        Self {
            address_select,
            data_in,
            clock,
        }
    }

    /// Releases the three protocol pins.
    pub fn release(self) -> (SEL, DATA, CLK) {
        (self.address_select, self.data_in, self.clock)
    }

    /// Shifts all six rounds and returns the five sensor readings.
    ///
    /// The transfer cannot fail: pin errors have no channel to be
    /// reported on in this protocol and are discarded.
    ///
    /// # Returns
    ///
    /// One raw 10-bit reading per sensor, in array order.
    pub fn acquire(&mut self) -> [u16; SENSOR_COUNT] {
        let mut rounds = [0u16; SENSOR_COUNT + 1];
        for (round, value) in rounds.iter_mut().enumerate() {
            for bit in 0..BITS_PER_ROUND {
                // The first four clocks address the next conversion.
                if bit < ADDRESS_BITS {
                    if (round >> (ADDRESS_BITS - 1 - bit)) & 0x01 != 0 {
                        self.address_select.set_high().ok();
                    } else {
                        self.address_select.set_low().ok();
                    }
                }
                // Every clock returns one bit of the previous conversion.
                *value <<= 1;
                if self.data_in.is_high().unwrap_or(false) {
                    *value |= 0x01;
                }
                self.clock.set_high().ok();
                self.clock.set_low().ok();
            }
        }
        // Round 0 carries the conversion pending before the sweep.
        let mut readings = [0u16; SENSOR_COUNT];
        readings.copy_from_slice(&rounds[1..]);
        readings
    }
}
