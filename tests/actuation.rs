// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Bus-level tests for motor, servo and maneuver actuation.
//!
//! Every test scripts the exact I2C frames the PWM expander is expected
//! to receive and fails if the driver writes anything else.

mod common;

use common::{channel_write, init_sequence, motor_writes, run_writes, ADDR};
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::Mock as PinMock;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use kitibot::{Direction, Error, Motor, Robot, Strictness};

type TestRobot = Robot<I2cMock, PinMock, PinMock, PinMock, NoopDelay>;

/// Builds a robot whose expander expects exactly `transactions`.
fn fixture_robot(transactions: &[I2cTransaction]) -> TestRobot {
    Robot::new(
        I2cMock::new(transactions),
        PinMock::new(&[]),
        PinMock::new(&[]),
        PinMock::new(&[]),
        NoopDelay,
    )
}

/// Verifies every mock the robot was built from.
fn teardown(robot: TestRobot) {
    let (mut i2c, mut select, mut data, mut clock, _delay) = robot.release();
    i2c.done();
    select.done();
    data.done();
    clock.done();
}

#[test]
fn first_motor_command_initializes_the_expander() {
    let mut expected = init_sequence();
    expected.extend(motor_writes((1, 2, 3), 150));

    let mut robot = fixture_robot(&expected);
    robot.motor_run(Motor::M1, 150).unwrap();
    teardown(robot);
}

#[test]
fn initialization_happens_only_once() {
    let mut expected = init_sequence();
    expected.extend(motor_writes((1, 2, 3), 150));
    expected.extend(motor_writes((6, 5, 4), -150));

    let mut robot = fixture_robot(&expected);
    robot.motor_run(Motor::M1, 150).unwrap();
    robot.motor_run(Motor::M2, -150).unwrap();
    teardown(robot);
}

#[test]
fn forward_speed_drives_the_forward_direction_channel() {
    let mut expected = init_sequence();
    expected.extend([
        channel_write(2, 0, 4095), // forward pair on
        channel_write(3, 0, 0),
        channel_write(1, 0, 2400), // 150 * 16
    ]);

    let mut robot = fixture_robot(&expected);
    robot.motor_run(Motor::M1, 150).unwrap();
    teardown(robot);
}

#[test]
fn negative_speed_flips_the_direction_pair() {
    let mut expected = init_sequence();
    expected.extend([
        channel_write(5, 0, 0), // forward pair off
        channel_write(4, 0, 4095),
        channel_write(6, 0, 2400),
    ]);

    let mut robot = fixture_robot(&expected);
    robot.motor_run(Motor::M2, -150).unwrap();
    teardown(robot);
}

#[test]
fn zero_speed_leaves_the_forward_pattern_with_no_magnitude() {
    let mut expected = init_sequence();
    expected.extend(motor_writes((1, 2, 3), 0));
    expected.extend(motor_writes((6, 5, 4), 0));

    let mut robot = fixture_robot(&expected);
    robot.motor_run(Motor::M1, 0).unwrap();
    robot.motor_run(Motor::M2, 0).unwrap();
    teardown(robot);
}

#[test]
fn maneuvers_command_both_motors() {
    let mut expected = init_sequence();
    expected.extend(run_writes(100, -100)); // turn right
    expected.extend(run_writes(-100, 100)); // turn left
    expected.extend(run_writes(0, 0)); // stop

    let mut robot = fixture_robot(&expected);
    robot.run(Direction::TurnRight, 100).unwrap();
    robot.run(Direction::TurnLeft, 100).unwrap();
    robot.run(Direction::Stop, 100).unwrap();
    teardown(robot);
}

#[test]
fn timed_maneuvers_always_end_stopped() {
    let mut expected = init_sequence();
    expected.extend(run_writes(120, 120));
    expected.extend(run_writes(0, 0));

    let mut robot = fixture_robot(&expected);
    robot.run_for(Direction::Forward, 120, 2).unwrap();
    teardown(robot);
}

#[test]
fn servo_angles_map_onto_the_pulse_window() {
    let mut expected = init_sequence();
    expected.push(channel_write(7, 0, 122)); // 0 degrees = 600 us
    expected.push(channel_write(7, 0, 307)); // 90 degrees = 1500 us
    expected.push(channel_write(7, 0, 491)); // 180 degrees = 2400 us

    let mut robot = fixture_robot(&expected);
    robot.servo(7, 0).unwrap();
    robot.servo(7, 90).unwrap();
    robot.servo(7, 180).unwrap();
    teardown(robot);
}

#[test]
fn invalid_servo_channel_is_a_silent_no_op_by_default() {
    // No transactions at all: the channel check precedes initialization.
    let mut robot = fixture_robot(&[]);
    robot.servo(16, 90).unwrap();
    teardown(robot);
}

#[test]
fn invalid_servo_channel_errors_in_strict_mode() {
    let mut robot = fixture_robot(&[]);
    robot.set_strictness(Strictness::Strict);
    assert!(matches!(robot.servo(16, 90), Err(Error::InvalidChannel)));
    teardown(robot);
}

#[test]
fn unknown_maneuver_codes_follow_the_strictness_policy() {
    let mut robot = fixture_robot(&[]);
    robot.run_code(0x6A, 100).unwrap();

    robot.set_strictness(Strictness::Strict);
    assert!(matches!(
        robot.run_code(0x6A, 100),
        Err(Error::InvalidDirection)
    ));
    teardown(robot);
}

#[test]
fn known_maneuver_codes_dispatch_normally() {
    let mut expected = init_sequence();
    expected.extend(run_writes(90, 90));

    let mut robot = fixture_robot(&expected);
    robot.run_code(0x01, 90).unwrap(); // forward
    teardown(robot);
}

#[test]
fn unknown_motor_codes_follow_the_strictness_policy() {
    let mut robot = fixture_robot(&[]);
    robot.motor_run_code(0x03, 100).unwrap();

    robot.set_strictness(Strictness::Strict);
    assert!(matches!(
        robot.motor_run_code(0x03, 100),
        Err(Error::InvalidChannel)
    ));
    teardown(robot);
}

#[test]
fn bus_failures_are_never_absorbed() {
    use embedded_hal::i2c::ErrorKind;

    let expected =
        [I2cTransaction::write(ADDR, vec![0x00, 0x00]).with_error(ErrorKind::Other)];

    let mut robot = fixture_robot(&expected);
    assert!(matches!(
        robot.motor_run(Motor::M1, 100),
        Err(Error::Bus(_))
    ));
    teardown(robot);
}
