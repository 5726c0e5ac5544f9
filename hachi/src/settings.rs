use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{Chip8Error, Result};

/// Configuration of a machine, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Memory size in bytes, at most 0x10000.
    pub memory_size: usize,
    /// Maximum amount of nested calls.
    pub stack_size: usize,
    /// Screen size in pixels. Width and height must be multiples of 8.
    pub width: u8,
    pub height: u8,
    /// Keep the stack and screen inside the windows the original
    /// interpreter reserved for them. Limits the stack to 12 levels and
    /// the screen to 2048 pixels.
    pub compact_layout: bool,
    /// Old behaviour for SHR VX,VY, SHL VX,VY, LD [I],VX and LD VX,[I]
    pub legacy_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            stack_size: DEFAULT_STACK_SIZE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            compact_layout: true,
            legacy_mode: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Chip8Error::InvalidSettings(format!("Failed to parse settings: {e}")))
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Chip8Error::InvalidSettings(format!("Failed to serialize settings: {e}")))
    }

    pub fn screen_bytes(&self) -> usize {
        self.width as usize * self.height as usize / 8
    }

    /// Returns an error describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        if self.width % 8 != 0 {
            return Err(invalid(format!("Width must be a multiple of 8, got {}.", self.width)));
        }
        if self.height % 8 != 0 {
            return Err(invalid(format!("Height must be a multiple of 8, got {}.", self.height)));
        }
        if self.width < MIN_WIDTH {
            return Err(invalid(format!("Width must be >= {MIN_WIDTH}, got {}.", self.width)));
        }
        if self.height < MIN_HEIGHT {
            return Err(invalid(format!("Height must be >= {MIN_HEIGHT}, got {}.", self.height)));
        }
        if self.memory_size < PROGRAM_START as usize || self.memory_size > MAX_MEMORY_SIZE {
            return Err(invalid(format!(
                "MemorySize must be between {:#X} and {:#X}, got {:#X}.",
                PROGRAM_START, MAX_MEMORY_SIZE, self.memory_size
            )));
        }
        if self.stack_size == 0 {
            return Err(invalid("StackSize must be >= 1, got 0.".to_string()));
        }

        if self.compact_layout {
            if self.stack_size > COMPACT_MAX_STACK {
                return Err(invalid(format!(
                    "StackSize must be <= {COMPACT_MAX_STACK} in compact layout, got {}.",
                    self.stack_size
                )));
            }
            let pixels = self.width as usize * self.height as usize;
            if pixels > COMPACT_MAX_PIXELS {
                return Err(invalid(format!(
                    "Width*Height must be <= {COMPACT_MAX_PIXELS} in compact layout, got {pixels}."
                )));
            }
            if COMPACT_SCREEN_BASE + self.screen_bytes() > self.memory_size {
                return Err(invalid(format!(
                    "MemorySize must be >= {:#X} in compact layout, got {:#X}.",
                    COMPACT_SCREEN_BASE + self.screen_bytes(),
                    self.memory_size
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> Chip8Error {
    Chip8Error::InvalidSettings(message)
}
