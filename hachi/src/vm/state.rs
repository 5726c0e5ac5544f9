use std::fmt;
use std::time::Duration;

use crate::constants::*;
use crate::error::Result;
use crate::settings::Settings;

/// A blocked `LD VX,K`: the register receiving the key and the keys that
/// were up when the instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWait {
    pub register: u8,
    pub mask: u16,
}

/// Keyboard bit for key `n` (0x0-0xF).
pub fn key_flag(key: u8) -> u16 {
    1 << (key & 0xF)
}

/// Everything the interpreter mutates. Buffers are boxed slices so their
/// size stays whatever the settings asked for.
#[derive(Debug, Clone)]
pub struct MachineState {
    /// Main memory. The font lives at 0x000 and programs start at 0x200.
    pub memory: Box<[u8]>,
    /// V0-VF. VF doubles as the carry, borrow and collision flag.
    pub v: [u8; REGISTER_COUNT],
    /// Address register
    pub i: u16,
    /// Return addresses. Its length is the stack capacity.
    pub(crate) stack: Box<[u16]>,
    /// Index of the last pushed address, -1 when empty.
    pub(crate) sp: isize,
    pub pc: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    /// Bit n set while key n is held.
    pub keyboard: u16,
    /// Monochrome framebuffer, one bit per pixel, row-major, MSB first.
    pub(crate) screen: Box<[u8]>,
    pub(crate) width: u8,
    pub(crate) height: u8,
    pub timer_interval: Duration,
    pub key_wait: Option<KeyWait>,
    settings: Settings,
}

impl MachineState {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let mut memory = vec![0u8; settings.memory_size].into_boxed_slice();
        let font_start = FONT_START as usize;
        memory[font_start..font_start + FONT.len()].copy_from_slice(&FONT);

        Ok(Self {
            memory,
            v: [0; REGISTER_COUNT],
            i: 0,
            stack: vec![0u16; settings.stack_size].into_boxed_slice(),
            sp: -1,
            pc: PROGRAM_START,
            delay_timer: 0,
            sound_timer: 0,
            keyboard: 0,
            screen: vec![0u8; settings.screen_bytes()].into_boxed_slice(),
            width: settings.width,
            height: settings.height,
            timer_interval: TIMER_INTERVAL,
            key_wait: None,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn legacy_mode(&self) -> bool {
        self.settings.legacy_mode
    }

    /// Bytes available to a program loaded at 0x200.
    pub fn free_memory(&self) -> usize {
        self.memory.len() - PROGRAM_START as usize
    }

    /// Index of the last pushed address, -1 when empty.
    pub fn sp(&self) -> isize {
        self.sp
    }

    pub fn stack_capacity(&self) -> usize {
        self.stack.len()
    }

    pub fn stack_depth(&self) -> usize {
        (self.sp + 1) as usize
    }

    /// The return addresses currently on the stack, oldest first.
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.stack_depth()]
    }

    pub fn press_key(&mut self, key: u8) {
        self.keyboard |= key_flag(key);
    }

    pub fn release_key(&mut self, key: u8) {
        self.keyboard &= !key_flag(key);
    }

    pub fn is_key_pressed(&self, key: u8) -> bool {
        self.keyboard & key_flag(key) != 0
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.key_wait.is_some()
    }

    /// Monochrome framebuffer, one bit per pixel, row-major, MSB first.
    pub fn screen(&self) -> &[u8] {
        &self.screen
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn screen_byte_width(&self) -> usize {
        self.width as usize / 8
    }

    /// Whether the pixel at (x, y) is set. Coordinates wrap like sprites do.
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        let x = x % self.width;
        let y = y % self.height;
        let index = y as usize * self.screen_byte_width() + x as usize / 8;
        self.screen[index] & (0x80 >> (x % 8)) != 0
    }

    /// A copy of memory as the original interpreter would have laid it out.
    /// In compact layout the stack (big-endian words) and the screen are
    /// written over their reserved windows.
    pub fn memory_image(&self) -> Vec<u8> {
        let mut image = self.memory.to_vec();
        if self.settings.compact_layout {
            for (slot, address) in self.stack.iter().enumerate() {
                let offset = COMPACT_STACK_BASE + slot * 2;
                image[offset..offset + 2].copy_from_slice(&address.to_be_bytes());
            }
            image[COMPACT_SCREEN_BASE..COMPACT_SCREEN_BASE + self.screen.len()]
                .copy_from_slice(&self.screen);
        }
        image
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registers: Vec<String> = self.v.iter().map(|r| format!("{r:02X}")).collect();
        let stack: Vec<String> = self.call_stack().iter().map(|a| format!("{a:04X}")).collect();
        write!(
            f,
            "Chip8{{Memory: {} bytes, Registers: [{}] I: {:04X}, Stack: [{}], SP: {}, PC: {:04X}, \
             DT: {:02X}, ST: {:02X}, Keyboard: {:016b}, Screen: {}*{}}}",
            self.memory.len(),
            registers.join(" "),
            self.i,
            stack.join(" "),
            self.sp,
            self.pc,
            self.delay_timer,
            self.sound_timer,
            self.keyboard,
            self.width,
            self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_state_layout() {
        let state = MachineState::new(Settings::default()).unwrap();
        assert_eq!(state.memory.len(), 0x1000);
        assert_eq!(state.stack_capacity(), 12);
        assert_eq!(state.screen.len(), 256);
        assert_eq!(state.sp, -1);
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.free_memory(), 0xE00);
        assert_eq!(&state.memory[0..5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(&state.memory[75..80], &[0xF0, 0x80, 0xF0, 0x80, 0x80]);
    }

    #[test]
    fn test_geometry_follows_settings() {
        let settings = Settings { width: 128, height: 64, compact_layout: false, ..Settings::default() };
        let state = MachineState::new(settings).unwrap();
        assert_eq!((state.width(), state.height()), (128, 64));
        assert_eq!(state.screen().len(), 1024);
        assert_eq!(state.screen_byte_width(), 16);
        assert_eq!(state.sp(), -1);
        assert!(state.call_stack().is_empty());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = Settings { width: 12, ..Settings::default() };
        assert!(MachineState::new(settings).is_err());
    }

    #[test]
    fn test_key_helpers() {
        let mut state = MachineState::new(Settings::default()).unwrap();
        state.press_key(0xA);
        state.press_key(0x3);
        assert_eq!(state.keyboard, 0b0000_0100_0000_1000);
        assert!(state.is_key_pressed(0xA));
        state.release_key(0xA);
        assert!(!state.is_key_pressed(0xA));
        assert!(state.is_key_pressed(0x3));
    }

    #[test]
    fn test_pixel_lookup() {
        let mut state = MachineState::new(Settings::default()).unwrap();
        // x = 9, y = 1 is the second bit of the tenth byte
        state.screen[8 + 1] = 0b0100_0000;
        assert!(state.pixel(9, 1));
        assert!(!state.pixel(8, 1));
        assert!(state.pixel(9 + 64, 1 + 32));
    }

    #[test]
    fn test_memory_image_overlays_compact_windows() {
        let mut state = MachineState::new(Settings::default()).unwrap();
        state.stack[0] = 0x0234;
        state.sp = 0;
        state.screen[0] = 0xAA;
        let image = state.memory_image();
        assert_eq!(&image[0xEA0..0xEA2], &[0x02, 0x34]);
        assert_eq!(image[0xF00], 0xAA);
        // Live memory is untouched
        assert_eq!(state.memory[0xF00], 0);
    }

    #[test]
    fn test_memory_image_without_compact_layout() {
        let settings = Settings { compact_layout: false, ..Settings::default() };
        let mut state = MachineState::new(settings).unwrap();
        state.screen[0] = 0xFF;
        assert_eq!(state.memory_image()[0xF00], 0);
    }

    #[test]
    fn test_display_summary() {
        let state = MachineState::new(Settings::default()).unwrap();
        let text = state.to_string();
        assert!(text.starts_with("Chip8{Memory: 4096 bytes, Registers: [00 00"));
        assert!(text.contains("SP: -1, PC: 0200"));
        assert!(text.ends_with("Screen: 64*32}"));
    }
}
