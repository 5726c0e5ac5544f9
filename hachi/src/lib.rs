//! hachi - a CHIP-8 virtual machine and disassembler
//!
//! The interpreter runs one instruction per [`Chip8::cycle`] and talks to
//! the outside world only through a [`Platform`]. The disassembler shares
//! the interpreter's decoder, so both always agree on what a word means.

pub mod constants;
pub mod decoder;
pub mod disassembler;
pub mod error;
pub mod platform;
pub mod settings;
pub mod vm;

pub use decoder::{decode, Operation};
pub use disassembler::{disassemble, Instruction};
pub use error::{Chip8Error, PlatformError, Result};
pub use platform::{NullPlatform, Platform};
pub use settings::Settings;
pub use vm::{key_flag, Chip8, KeyWait, MachineState};
