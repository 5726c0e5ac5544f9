use clap::{Args, Parser, Subcommand};
use hachi::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hachi",
    about = "hachi - CHIP-8 virtual machine and disassembler",
    long_about = "Runs CHIP-8 programs in the terminal and prints linear disassembly listings.\n\
                  Machine settings come from an optional JSON file, overridden by flags.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a program in the terminal. Esc quits.
    Run {
        /// Program file to execute
        program: PathBuf,

        #[command(flatten)]
        machine: MachineArgs,

        /// Set virtual CPU frequency (e.g., 500Hz, 1kHz)
        #[arg(short = 'f', long, default_value = "500Hz")]
        frequency: String,

        /// Set RNG seed (hex with 0x prefix or decimal)
        #[arg(short = 's', long, value_parser = parse_number)]
        seed: Option<u64>,

        /// Don't print the disassembly after the session
        #[arg(long)]
        no_listing: bool,
    },

    /// Print the disassembly of a program
    Disasm {
        /// Program file to disassemble
        program: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the effective machine settings as JSON
    Config {
        #[command(flatten)]
        machine: MachineArgs,
    },
}

/// Machine settings: a JSON file plus per-field overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct MachineArgs {
    /// JSON settings file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Legacy SHR/SHL and LD [I] behaviour
    #[arg(long)]
    pub legacy: bool,

    /// Don't restrict the stack and screen to the original memory windows
    #[arg(long)]
    pub no_compact: bool,

    /// Screen width in pixels (multiple of 8)
    #[arg(long)]
    pub width: Option<u8>,

    /// Screen height in pixels (multiple of 8)
    #[arg(long)]
    pub height: Option<u8>,

    /// Memory size in bytes (hex with 0x prefix or decimal)
    #[arg(short = 'm', long, value_parser = parse_size)]
    pub memory: Option<usize>,

    /// Maximum call depth
    #[arg(long)]
    pub stack: Option<usize>,
}

impl MachineArgs {
    pub fn settings(&self) -> hachi::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if self.legacy {
            settings.legacy_mode = true;
        }
        if self.no_compact {
            settings.compact_layout = false;
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(memory) = self.memory {
            settings.memory_size = memory;
        }
        if let Some(stack) = self.stack {
            settings.stack_size = stack;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Parse an integer from hex (0x prefix) or decimal
pub fn parse_number(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|_| format!("Invalid hex value: {s}"))
    } else {
        s.parse().map_err(|_| format!("Invalid value: {s}"))
    }
}

fn parse_size(s: &str) -> Result<usize, String> {
    let value = parse_number(s)?;
    usize::try_from(value).map_err(|_| format!("Value out of range: {s}"))
}

/// Parse frequency from string (e.g., "500Hz", "1kHz", "1000", "2.5MHz")
pub fn parse_frequency(s: &str) -> Result<u64, String> {
    let s = s.trim();

    let hz = if let Some(num_str) = s.strip_suffix("MHz") {
        parse_float_with_multiplier(num_str, 1_000_000)?
    } else if let Some(num_str) = s.strip_suffix("KHz") {
        parse_float_with_multiplier(num_str, 1_000)?
    } else if let Some(num_str) = s.strip_suffix("kHz") {
        parse_float_with_multiplier(num_str, 1_000)?
    } else if let Some(num_str) = s.strip_suffix("Hz") {
        parse_float_with_multiplier(num_str, 1)?
    } else {
        // Plain numbers are Hz
        s.parse::<u64>().map_err(|_| format!("Invalid frequency value: {s}"))?
    };

    if hz == 0 {
        return Err(format!("Frequency must be positive: {s}"));
    }
    Ok(hz)
}

fn parse_float_with_multiplier(s: &str, multiplier: u64) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(f) = s.parse::<f64>() {
        Ok((f * multiplier as f64) as u64)
    } else {
        Err(format!("Invalid numeric value: {s}"))
    }
}
