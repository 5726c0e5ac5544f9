mod common;

use std::time::{Duration, Instant};

use common::{machine, machine_with, step};
use hachi::{Chip8Error, KeyWait, Settings};
use pretty_assertions::assert_eq;

#[test]
fn test_call_and_return() {
    // 200: CALL 206, 202: LD V0,55, 204: JP 204, 206: RET
    let mut vm = machine(&[0x2206, 0x6055, 0x1204, 0x00EE]);
    step(&mut vm, 1);
    assert_eq!(vm.state().pc, 0x206);
    assert_eq!(vm.state().sp(), 0);
    assert_eq!(vm.state().call_stack(), &[0x202]);

    step(&mut vm, 2);
    assert_eq!(vm.state().sp(), -1);
    assert_eq!(vm.state().v[0], 0x55);
    assert_eq!(vm.state().pc, 0x204);
}

#[test]
fn test_stack_overflow_on_full_call() {
    // CALL 200 forever
    let mut vm = machine(&[0x2200]);
    step(&mut vm, 12);
    assert_eq!(vm.state().stack_depth(), 12);
    assert!(matches!(vm.cycle(), Err(Chip8Error::StackOverflow)));
    assert_eq!(vm.state().sp(), 11);
}

#[test]
fn test_return_on_empty_stack() {
    let mut vm = machine(&[0x00EE]);
    assert!(matches!(vm.cycle(), Err(Chip8Error::StackOverflow)));
    assert_eq!(vm.state().sp(), -1);
}

#[test]
fn test_single_slot_stack() {
    let settings = Settings { stack_size: 1, ..Settings::default() };
    let mut vm = machine_with(settings, &[0x2202, 0x2202]);
    step(&mut vm, 1);
    assert!(matches!(vm.cycle(), Err(Chip8Error::StackOverflow)));
}

#[test]
fn test_stack_shows_in_memory_image() {
    let mut vm = machine(&[0x2206, 0x0000, 0x0000, 0x2208]);
    step(&mut vm, 2);
    let image = vm.state().memory_image();
    assert_eq!(&image[0xEA0..0xEA4], &[0x02, 0x02, 0x02, 0x08]);
}

#[test]
fn test_key_skips() {
    let mut vm = machine(&[0x6007, 0xE09E, 0x6101, 0x6102]);
    vm.state_mut().press_key(7);
    step(&mut vm, 3);
    assert_eq!(vm.state().v[1], 0x02);

    let mut vm = machine(&[0x6007, 0xE0A1, 0x6101, 0x6102]);
    step(&mut vm, 3);
    assert_eq!(vm.state().v[1], 0x02);

    let mut vm = machine(&[0x6007, 0xE0A1, 0x6101, 0x6102]);
    vm.state_mut().press_key(7);
    step(&mut vm, 3);
    assert_eq!(vm.state().v[1], 0x01);
}

#[test]
fn test_key_number_uses_low_nibble() {
    let mut vm = machine(&[0x6017, 0xE09E, 0x6101, 0x6102]);
    vm.state_mut().press_key(7);
    step(&mut vm, 3);
    assert_eq!(vm.state().v[1], 0x02);
}

#[test]
fn test_key_wait_blocks_until_press() {
    let mut vm = machine(&[0xF30A, 0x6001]);
    vm.platform_mut().key_presses.push((3, 0x7));

    step(&mut vm, 1);
    assert_eq!(vm.state().key_wait, Some(KeyWait { register: 3, mask: 0xFFFF }));

    step(&mut vm, 2);
    assert_eq!(vm.state().pc, 0x202);
    assert!(vm.state().is_waiting_for_key());

    // Cycle 3 sees the press and only stores the key
    step(&mut vm, 1);
    assert_eq!(vm.state().v[3], 7);
    assert!(!vm.state().is_waiting_for_key());
    assert_eq!(vm.state().pc, 0x202);
    assert_eq!(vm.state().v[0], 0);

    step(&mut vm, 1);
    assert_eq!(vm.state().v[0], 1);
}

#[test]
fn test_key_wait_ignores_held_keys() {
    let mut vm = machine(&[0xF30A]);
    vm.state_mut().press_key(5);
    vm.platform_mut().key_presses.push((2, 0x2));

    step(&mut vm, 2);
    assert!(vm.state().is_waiting_for_key());
    step(&mut vm, 1);
    assert_eq!(vm.state().v[3], 2);
}

#[test]
fn test_key_wait_picks_lowest_key() {
    let mut vm = machine(&[0xF40A]);
    vm.platform_mut().key_presses.push((1, 0xA));
    vm.platform_mut().key_presses.push((1, 0x3));
    step(&mut vm, 2);
    assert_eq!(vm.state().v[4], 3);
}

#[test]
fn test_timers_run_while_waiting_for_key() {
    let mut vm = machine(&[0x600A, 0xF015, 0xF10A]);
    let start = Instant::now();
    for _ in 0..3 {
        vm.cycle_at(start).unwrap();
    }
    vm.cycle_at(start + Duration::from_secs(1)).unwrap();
    assert!(vm.state().is_waiting_for_key());
    assert_eq!(vm.state().delay_timer, 0);
}
