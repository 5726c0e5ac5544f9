use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::{Print, ResetColor},
    terminal::{self, ClearType},
    ExecutableCommand,
};
use hachi::constants::KEY_COUNT;
use hachi::{MachineState, Platform, PlatformError};
use log::{info, warn};

// Terminals only report key presses, so keys are released after this long
const KEY_HOLD: Duration = Duration::from_millis(100);
const SYSCALL_LOG_SIZE: usize = 10;
const STATUS_REFRESH: Duration = Duration::from_millis(50);

// Layout: stack and syscall log on the left, status and screen on the right
const STACK_COLUMN: u16 = 0;
const SYSCALL_COLUMN: u16 = 8;
const STATUS_COLUMN: u16 = 20;
const SCREEN_ROW: u16 = 5;

const PIXEL_ON: char = '█';
const PIXEL_OFF: char = ' ';

/// A key as the terminal reports it, with only the modifiers that matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyStroke {
    pub fn plain(code: KeyCode) -> Self {
        Self { code, modifiers: KeyModifiers::NONE }
    }

    pub fn ctrl(c: char) -> Self {
        Self { code: KeyCode::Char(c), modifiers: KeyModifiers::CONTROL }
    }

    /// Letters are matched case-insensitively; Shift and Alt are ignored.
    pub fn from_event(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
                Self::ctrl(c.to_ascii_lowercase())
            }
            KeyCode::Char(c) => Self::plain(KeyCode::Char(c.to_ascii_lowercase())),
            code => Self::plain(code),
        }
    }
}

/// Terminal keys to CHIP-8 keys (0x0-0xF).
pub type KeyMap = HashMap<KeyStroke, u8>;

/// The classic hex pad bindings plus the common `1234/qwer/asdf/zxcv` layout.
/// 8, 4, 6 and 2 double as the arrow keys.
pub fn default_key_map() -> KeyMap {
    let mut map = KeyMap::new();

    map.insert(KeyStroke::plain(KeyCode::Tab), 0x0);
    for key in 1..=9u8 {
        map.insert(KeyStroke::plain(KeyCode::F(key + 1)), key);
    }
    for (offset, c) in ('a'..='f').enumerate() {
        map.insert(KeyStroke::ctrl(c), 0xA + offset as u8);
    }
    map.insert(KeyStroke::plain(KeyCode::Down), 0x2);
    map.insert(KeyStroke::plain(KeyCode::Left), 0x4);
    map.insert(KeyStroke::plain(KeyCode::Right), 0x6);
    map.insert(KeyStroke::plain(KeyCode::Up), 0x8);
    map.insert(KeyStroke::plain(KeyCode::Enter), 0x5);

    let layout = [
        ('1', 0x1), ('2', 0x2), ('3', 0x3), ('4', 0xC),
        ('q', 0x4), ('w', 0x5), ('e', 0x6), ('r', 0xD),
        ('a', 0x7), ('s', 0x8), ('d', 0x9), ('f', 0xE),
        ('z', 0xA), ('x', 0x0), ('c', 0xB), ('v', 0xF),
    ];
    for (c, key) in layout {
        map.insert(KeyStroke::plain(KeyCode::Char(c)), key);
    }

    map
}

/// Draws the machine in the terminal and feeds it keyboard input.
///
/// Custom data keys: `"key_map"` (a [`KeyMap`], settable) and
/// `"syscall_log"` (a `VecDeque<&'static str>` of the latest CLS, DRW and
/// BEEP calls, newest first).
pub struct TerminalPlatform {
    out: Stdout,
    key_map: KeyMap,
    pressed_at: [Option<Instant>; KEY_COUNT as usize],
    syscalls: VecDeque<&'static str>,
    last_screen: Vec<u8>,
    last_status: Option<Instant>,
    active: bool,
    quit: bool,
}

impl Default for TerminalPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPlatform {
    /// The terminal is only taken over once the machine initialises us.
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            key_map: default_key_map(),
            pressed_at: [None; KEY_COUNT as usize],
            syscalls: VecDeque::with_capacity(SYSCALL_LOG_SIZE),
            last_screen: Vec::new(),
            last_status: None,
            active: false,
            quit: false,
        }
    }

    /// Whether Esc was pressed.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Leave raw mode and the alternate screen. Safe to call twice.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = terminal::disable_raw_mode();
        let _ = self.out.execute(cursor::Show);
        let _ = self.out.execute(terminal::LeaveAlternateScreen);
        let _ = self.out.execute(ResetColor);
        let _ = self.out.flush();
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        self.out.execute(terminal::EnterAlternateScreen)?;
        self.out.execute(cursor::Hide)?;
        self.out.execute(terminal::Clear(ClearType::All))?;
        queue!(
            self.out,
            cursor::MoveTo(STACK_COLUMN, 0),
            Print("Stack   Syscalls")
        )?;
        self.out.flush()
    }

    fn log_syscall(&mut self, name: &'static str) {
        if self.syscalls.len() == SYSCALL_LOG_SIZE {
            self.syscalls.pop_back();
        }
        self.syscalls.push_front(name);

        if self.active {
            if let Err(e) = self.draw_syscalls() {
                warn!("Failed to draw syscall log: {e}");
            }
        }
    }

    fn press(&mut self, key: u8, state: &mut MachineState, now: Instant) {
        state.press_key(key);
        self.pressed_at[key as usize] = Some(now);
    }

    fn handle_key(&mut self, event: &KeyEvent, state: &mut MachineState, now: Instant) {
        if event.kind == KeyEventKind::Release {
            return;
        }
        if event.code == KeyCode::Esc {
            self.quit = true;
            return;
        }
        if let Some(&key) = self.key_map.get(&KeyStroke::from_event(event)) {
            self.press(key & 0xF, state, now);
        }
    }

    fn release_stale_keys(&mut self, state: &mut MachineState, now: Instant) {
        for key in 0..KEY_COUNT {
            if let Some(pressed) = self.pressed_at[key as usize] {
                if now.saturating_duration_since(pressed) > KEY_HOLD {
                    state.release_key(key);
                    self.pressed_at[key as usize] = None;
                }
            }
        }
    }

    fn poll_input(&mut self, state: &mut MachineState) -> io::Result<()> {
        let now = Instant::now();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_key(&key_event, state, now);
            }
        }
        self.release_stale_keys(state, now);
        Ok(())
    }

    fn draw_syscalls(&mut self) -> io::Result<()> {
        for row in 0..SYSCALL_LOG_SIZE {
            let name = self.syscalls.get(row).copied().unwrap_or("");
            queue!(
                self.out,
                cursor::MoveTo(SYSCALL_COLUMN, row as u16 + 1),
                Print(format!("{name:<8}"))
            )?;
        }
        self.out.flush()
    }

    fn draw_status(&mut self, state: &MachineState) -> io::Result<()> {
        for (row, line) in status_lines(state).iter().enumerate() {
            queue!(
                self.out,
                cursor::MoveTo(STATUS_COLUMN, row as u16),
                terminal::Clear(ClearType::UntilNewLine),
                Print(line)
            )?;
        }
        for slot in 0..state.stack_capacity() {
            let text = match state.call_stack().get(slot) {
                Some(address) => format!("{address:04X}"),
                None => "    ".to_string(),
            };
            queue!(self.out, cursor::MoveTo(STACK_COLUMN, slot as u16 + 1), Print(text))?;
        }
        self.out.flush()
    }

    /// Redraw only the pixels that changed since the last update.
    fn draw_screen(&mut self, state: &MachineState) -> io::Result<()> {
        if self.last_screen.len() != state.screen().len() {
            self.last_screen = vec![0; state.screen().len()];
        }

        let byte_width = state.screen_byte_width();
        for (index, (&now, &before)) in state.screen().iter().zip(&self.last_screen).enumerate() {
            let changed = now ^ before;
            if changed == 0 {
                continue;
            }
            let y = (index / byte_width) as u16;
            let x = (index % byte_width * 8) as u16;
            for bit in 0..8u16 {
                let mask = 0x80 >> bit;
                if changed & mask != 0 {
                    let pixel = if now & mask != 0 { PIXEL_ON } else { PIXEL_OFF };
                    queue!(
                        self.out,
                        cursor::MoveTo(STATUS_COLUMN + x + bit, SCREEN_ROW + y),
                        Print(pixel)
                    )?;
                }
            }
        }

        self.last_screen.copy_from_slice(state.screen());
        self.out.flush()
    }
}

impl Drop for TerminalPlatform {
    fn drop(&mut self) {
        self.restore();
    }
}

impl Platform for TerminalPlatform {
    fn on_init(&mut self, state: &MachineState) {
        self.last_screen = vec![0; state.screen().len()];
        match self.enter() {
            Ok(()) => info!("Terminal platform initialised"),
            Err(e) => {
                warn!("Failed to set up the terminal: {e}");
                self.restore();
            }
        }
    }

    fn on_clear_screen(&mut self) {
        self.log_syscall("CLS");
    }

    fn on_cycle(&mut self, state: &mut MachineState) {
        if !self.active {
            return;
        }
        if let Err(e) = self.poll_input(state) {
            warn!("Failed to read terminal input: {e}");
        }

        let now = Instant::now();
        let stale = self
            .last_status
            .map_or(true, |last| now.saturating_duration_since(last) >= STATUS_REFRESH);
        if stale {
            self.last_status = Some(now);
            if let Err(e) = self.draw_status(state) {
                warn!("Failed to draw status: {e}");
            }
        }
    }

    fn on_screen_update(&mut self, state: &MachineState) {
        self.log_syscall("DRW");
        if self.active {
            if let Err(e) = self.draw_screen(state) {
                warn!("Failed to draw screen: {e}");
            }
        }
    }

    fn on_beep(&mut self) {
        self.log_syscall("BEEP");
    }

    fn custom_data(&self, key: &str) -> Option<&dyn Any> {
        match key {
            "key_map" => Some(&self.key_map as &dyn Any),
            "syscall_log" => Some(&self.syscalls as &dyn Any),
            _ => None,
        }
    }

    fn set_custom_data(&mut self, key: &str, value: Box<dyn Any>) -> Result<(), PlatformError> {
        if key != "key_map" {
            return Err(PlatformError::UnknownKey(key.to_string()));
        }
        let map = value.downcast::<KeyMap>().map_err(|_| PlatformError::WrongType {
            key: key.to_string(),
            expected: "KeyMap",
        })?;
        self.key_map = *map;
        Ok(())
    }
}

/// Machine status as shown next to the screen.
pub fn status_lines(state: &MachineState) -> [String; 4] {
    let registers: Vec<String> = state.v.iter().map(|r| format!("{r:02X}")).collect();
    [
        format!("Memory: {} bytes", state.memory.len()),
        format!("Registers: {}", registers.join(" ")),
        format!(
            "I: {:04X} SP: {}, PC: {:04X}, DT: {:02X}, ST: {:02X}",
            state.i, state.sp(), state.pc, state.delay_timer, state.sound_timer
        ),
        format!(
            "Keyboard: {:016b}, Screen: {}*{}",
            state.keyboard, state.width(), state.height()
        ),
    ]
}

/// Restore the terminal before the default panic output.
pub fn install_terminal_cleanup_hook() {
    use std::panic;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = io::stdout().execute(cursor::Show);
        let _ = io::stdout().execute(terminal::LeaveAlternateScreen);
        let _ = io::stdout().execute(ResetColor);

        original_hook(panic_info);
    }));
}
