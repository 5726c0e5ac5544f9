/// VM module - the CHIP-8 interpreter

mod display;
mod execution;
mod state;
mod timer;

pub use state::{key_flag, KeyWait, MachineState};

use std::any::Any;
use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::*;
use crate::decoder::decode;
use crate::error::{Chip8Error, PlatformError, Result};
use crate::platform::Platform;
use crate::settings::Settings;

/// A CHIP-8 interpreter driving one machine through its platform.
pub struct Chip8<P: Platform> {
    state: MachineState,
    platform: P,
    rng: StdRng,
    // Start of the timer period currently being accumulated
    last_timer_tick: Option<Instant>,
}

impl<P: Platform> Chip8<P> {
    pub fn new(settings: Settings, platform: P) -> Result<Self> {
        Self::with_rng(settings, platform, StdRng::from_entropy())
    }

    /// Same as `new` but with a reproducible `RND` sequence.
    pub fn with_seed(settings: Settings, platform: P, seed: u64) -> Result<Self> {
        Self::with_rng(settings, platform, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: Settings, mut platform: P, rng: StdRng) -> Result<Self> {
        let state = MachineState::new(settings)?;
        info!("Created {state}");
        platform.on_init(&state);

        Ok(Self {
            state,
            platform,
            rng,
            last_timer_tick: None,
        })
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    pub fn custom_data(&self, key: &str) -> Option<&dyn Any> {
        self.platform.custom_data(key)
    }

    pub fn set_custom_data(&mut self, key: &str, value: Box<dyn Any>) -> std::result::Result<(), PlatformError> {
        self.platform.set_custom_data(key, value).map_err(|e| {
            warn!("Platform rejected custom data '{key}': {e}");
            e
        })
    }

    /// Copy a program to 0x200 and point PC at it.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let free_memory = self.state.free_memory();
        if program.len() > free_memory {
            return Err(Chip8Error::OutOfMemory {
                program_size: program.len(),
                free_memory,
            });
        }

        let start = PROGRAM_START as usize;
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        self.state.pc = PROGRAM_START;
        info!("Loaded {} bytes of code", program.len());
        Ok(())
    }

    /// Load a program from disk and return its size.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let program = fs::read(path)?;
        self.load_program(&program)?;
        Ok(program.len())
    }

    /// Run one cycle against the wall clock.
    pub fn cycle(&mut self) -> Result<()> {
        self.cycle_at(Instant::now())
    }

    /// Run one cycle with `now` as the current time for the timers.
    pub fn cycle_at(&mut self, now: Instant) -> Result<()> {
        self.platform.on_cycle(&mut self.state);

        match self.state.key_wait {
            Some(wait) => {
                let pressed = self.state.keyboard & wait.mask;
                if pressed != 0 {
                    let key = pressed.trailing_zeros() as u8;
                    self.state.v[wait.register as usize] = key;
                    self.state.key_wait = None;
                    debug!("Key {key:X} stored in V{:X}", wait.register);
                }
            }
            None => self.step()?,
        }

        self.tick_timers(now);
        Ok(())
    }

    /// Cycle until the program fails. Errors end the session.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.cycle()?;
        }
    }

    pub fn run_for(&mut self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            self.cycle()?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let address = self.state.pc;
        let word = self.fetch()?;
        let op = decode(word);
        trace!("[{address:04X}] {word:04X} {op}");
        self.execute(op, address)
    }

    fn fetch(&mut self) -> Result<u16> {
        let pc = self.state.pc as usize;
        if pc + INSTRUCTION_SIZE as usize > self.state.memory.len() {
            return Err(Chip8Error::InvalidMemoryAccess {
                address: self.state.pc,
                length: INSTRUCTION_SIZE,
            });
        }

        let word = u16::from_be_bytes([self.state.memory[pc], self.state.memory[pc + 1]]);
        self.state.pc = self.state.pc.wrapping_add(INSTRUCTION_SIZE);
        Ok(word)
    }
}
