mod cli;
mod listing;
mod terminal;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, style::ResetColor, ExecutableCommand};
use hachi::constants::PROGRAM_START;
use hachi::{Chip8, Settings};
use log::error;

use cli::{parse_frequency, Cli, Command};
use terminal::TerminalPlatform;

/// Install signal handlers to ensure terminal cleanup on exit
fn install_signal_handlers() {
    use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};

    // Not fatal: some environments don't allow it
    if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM]) {
        thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let _ = crossterm::terminal::disable_raw_mode();
                let _ = io::stdout().execute(cursor::Show);
                let _ = io::stdout().execute(crossterm::terminal::LeaveAlternateScreen);
                let _ = io::stdout().execute(ResetColor);
                let _ = io::stdout().flush();

                process::exit(128 + signal);
            }
        });
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

// Target 60 FPS so input and the screen stay responsive
const TARGET_FPS: u64 = 60;

/// Splits a cycle frequency into per-frame cycle counts. The remainder
/// carries over, so any frequency averages out exactly over a second.
struct FramePacer {
    frequency: u64,
    owed: u64,
}

impl FramePacer {
    fn new(frequency: u64) -> Self {
        Self { frequency, owed: 0 }
    }

    fn next_frame(&mut self) -> usize {
        self.owed += self.frequency;
        let cycles = self.owed / TARGET_FPS;
        self.owed %= TARGET_FPS;
        cycles as usize
    }
}

/// Run at `frequency` cycles per second until Esc is pressed or the
/// program fails.
fn run_with_frequency(vm: &mut Chip8<TerminalPlatform>, frequency: u64) -> hachi::Result<()> {
    const NANOS_PER_SECOND: u64 = 1_000_000_000;

    let mut pacer = FramePacer::new(frequency);
    let frame_duration = Duration::from_nanos(NANOS_PER_SECOND / TARGET_FPS);

    while !vm.platform().quit_requested() {
        let frame_start = Instant::now();
        vm.run_for(pacer.next_frame())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    Ok(())
}

fn run(
    program: &Path,
    settings: Settings,
    frequency: &str,
    seed: Option<u64>,
    print_listing: bool,
) -> Result<()> {
    let frequency = parse_frequency(frequency).map_err(anyhow::Error::msg)?;

    terminal::install_terminal_cleanup_hook();
    install_signal_handlers();

    let platform = TerminalPlatform::new();
    let mut vm = match seed {
        Some(seed) => Chip8::with_seed(settings, platform, seed),
        None => Chip8::new(settings, platform),
    }
    .context("Failed to create the machine")?;

    let program_size = match vm.load_file(program) {
        Ok(size) => size,
        Err(e) => {
            vm.platform_mut().restore();
            return Err(e).with_context(|| format!("Failed to load '{}'", program.display()));
        }
    };

    let result = run_with_frequency(&mut vm, frequency);
    vm.platform_mut().restore();

    if let Err(e) = result {
        error!("{}", vm.state());
        return Err(e).context("Program stopped");
    }

    if print_listing {
        let start = PROGRAM_START as usize;
        let image = &vm.state().memory[start..start + program_size];
        print!("{}", listing::render(&listing::records(image)?, true));
    }
    Ok(())
}

fn disasm(program: &Path, color: bool) -> Result<()> {
    let bytes = fs::read(program).with_context(|| format!("Failed to read '{}'", program.display()))?;
    if !color {
        colored::control::set_override(false);
    }
    print!("{}", listing::render(&listing::records(&bytes)?, color));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { program, machine, frequency, seed, no_listing } => {
            let settings = machine.settings().context("Invalid machine settings")?;
            run(&program, settings, &frequency, seed, !no_listing)
        }
        Command::Disasm { program, no_color } => disasm(&program, !no_color),
        Command::Config { machine } => {
            let settings = machine.settings().context("Invalid machine settings")?;
            println!("{}", settings.to_json()?);
            Ok(())
        }
    }
}
