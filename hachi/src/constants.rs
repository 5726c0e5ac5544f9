//! Central configuration and constants for the CHIP-8 machine

use std::time::Duration;

// Memory layout
pub const PROGRAM_START: u16 = 0x200; // Programs load here; everything below is reserved
pub const FONT_START: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5; // Bytes per hex digit glyph
pub const MAX_MEMORY_SIZE: usize = 0x10000; // Full 16-bit address space

// Compact layout windows (where the original interpreter kept these buffers)
pub const COMPACT_STACK_BASE: usize = 0xEA0;
pub const COMPACT_SCREEN_BASE: usize = 0xF00;
pub const COMPACT_MAX_STACK: usize = 12;
pub const COMPACT_MAX_PIXELS: usize = 2048;

// Default machine configuration
pub const DEFAULT_MEMORY_SIZE: usize = 0x1000;
pub const DEFAULT_STACK_SIZE: usize = 12;
pub const DEFAULT_WIDTH: u8 = 64;
pub const DEFAULT_HEIGHT: u8 = 32;

// Screen limits
pub const MIN_WIDTH: u8 = 8;
pub const MIN_HEIGHT: u8 = 15;

// Registers
pub const REGISTER_COUNT: usize = 16;
pub const FLAG_REGISTER: usize = 0xF;
pub const KEY_COUNT: u8 = 16;

// Instruction encoding
pub const INSTRUCTION_SIZE: u16 = 2; // Bytes per instruction word

/// 60 Hz, the rate of the original delay and sound timers.
// Truncates to 16_666_666 ns, well under a microsecond of drift per second.
pub const TIMER_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Built-in hex digit sprites 0-F, 4 pixels wide and 5 rows tall.
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
