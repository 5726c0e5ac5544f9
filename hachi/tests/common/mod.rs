#![allow(dead_code)]

use std::any::Any;
use std::collections::HashMap;
use std::time::Instant;

use hachi::{Chip8, MachineState, Platform, PlatformError, Settings};

/// Counts every callback and keeps whatever custom data it is given.
#[derive(Default)]
pub struct RecordingPlatform {
    pub inits: usize,
    pub clears: usize,
    pub cycles: usize,
    pub screen_updates: usize,
    pub beeps: usize,
    /// Keys held down from the given cycle on, applied in `on_cycle`.
    pub key_presses: Vec<(usize, u8)>,
    pub data: HashMap<String, Box<dyn Any>>,
}

impl Platform for RecordingPlatform {
    fn on_init(&mut self, _state: &MachineState) {
        self.inits += 1;
    }

    fn on_clear_screen(&mut self) {
        self.clears += 1;
    }

    fn on_cycle(&mut self, state: &mut MachineState) {
        for &(cycle, key) in &self.key_presses {
            if cycle == self.cycles {
                state.press_key(key);
            }
        }
        self.cycles += 1;
    }

    fn on_screen_update(&mut self, _state: &MachineState) {
        self.screen_updates += 1;
    }

    fn on_beep(&mut self) {
        self.beeps += 1;
    }

    fn custom_data(&self, key: &str) -> Option<&dyn Any> {
        self.data.get(key).map(|value| &**value)
    }

    fn set_custom_data(&mut self, key: &str, value: Box<dyn Any>) -> Result<(), PlatformError> {
        if key != "ctx" {
            return Err(PlatformError::UnknownKey(key.to_string()));
        }
        self.data.insert(key.to_string(), value);
        Ok(())
    }
}

pub fn program(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_be_bytes()).collect()
}

pub fn machine_with(settings: Settings, words: &[u16]) -> Chip8<RecordingPlatform> {
    let mut vm = Chip8::with_seed(settings, RecordingPlatform::default(), 8).unwrap();
    vm.load_program(&program(words)).unwrap();
    vm
}

pub fn machine(words: &[u16]) -> Chip8<RecordingPlatform> {
    machine_with(Settings::default(), words)
}

pub fn legacy_machine(words: &[u16]) -> Chip8<RecordingPlatform> {
    machine_with(Settings { legacy_mode: true, ..Settings::default() }, words)
}

/// Run `cycles` cycles with the clock frozen so timers never move.
pub fn step(vm: &mut Chip8<RecordingPlatform>, cycles: usize) {
    let now = Instant::now();
    for _ in 0..cycles {
        vm.cycle_at(now).unwrap();
    }
}
