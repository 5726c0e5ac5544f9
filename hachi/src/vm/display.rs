use super::MachineState;
use crate::error::{Chip8Error, Result};

impl MachineState {
    pub fn clear_screen(&mut self) {
        self.screen.fill(0);
    }

    /// XOR the `rows`-byte sprite at I onto the screen at (vx, vy).
    ///
    /// Both coordinates wrap, as does a sprite crossing the right or bottom
    /// edge. Returns whether any lit pixel was turned off. Nothing is
    /// touched when the sprite does not fit in memory.
    pub fn draw_sprite(&mut self, vx: u8, vy: u8, rows: u8) -> Result<bool> {
        let start = self.i as usize;
        if self.i.checked_add(rows as u16).is_none() {
            return Err(Chip8Error::ArithmeticOverflow {
                address: self.i,
                length: rows as u16,
            });
        }
        if start + rows as usize > self.memory.len() {
            return Err(Chip8Error::InvalidMemoryAccess {
                address: self.i,
                length: rows as u16,
            });
        }

        let byte_width = self.screen_byte_width();
        let x = vx % self.width;
        let mut y = vy % self.height;
        let column = x as usize / 8;
        let offset = x % 8;
        let mut collision = false;

        for &row in &self.memory[start..start + rows as usize] {
            let line = y as usize * byte_width;
            let left = line + column;
            let right = line + (column + 1) % byte_width;

            let bits = row >> offset;
            collision |= self.screen[left] & bits != 0;
            self.screen[left] ^= bits;

            if offset != 0 {
                let bits = row << (8 - offset);
                collision |= self.screen[right] & bits != 0;
                self.screen[right] ^= bits;
            }

            y = (y + 1) % self.height;
        }

        Ok(collision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;

    fn state_with_sprite(sprite: &[u8]) -> MachineState {
        let mut state = MachineState::new(Settings::default()).unwrap();
        state.memory[0x300..0x300 + sprite.len()].copy_from_slice(sprite);
        state.i = 0x300;
        state
    }

    #[test]
    fn test_aligned_draw() {
        let mut state = state_with_sprite(&[0xFF, 0x81]);
        assert!(!state.draw_sprite(8, 2, 2).unwrap());
        assert_eq!(state.screen[2 * 8 + 1], 0xFF);
        assert_eq!(state.screen[3 * 8 + 1], 0x81);
    }

    #[test]
    fn test_unaligned_draw_straddles_two_bytes() {
        let mut state = state_with_sprite(&[0xFF]);
        state.draw_sprite(3, 0, 1).unwrap();
        assert_eq!(state.screen[0], 0x1F);
        assert_eq!(state.screen[1], 0xE0);
    }

    #[test]
    fn test_redraw_erases_and_collides() {
        let mut state = state_with_sprite(&[0xF0, 0x90]);
        assert!(!state.draw_sprite(5, 5, 2).unwrap());
        assert!(state.draw_sprite(5, 5, 2).unwrap());
        assert!(state.screen.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_right_edge_wraps_within_row() {
        let mut state = state_with_sprite(&[0xFF]);
        state.draw_sprite(60, 1, 1).unwrap();
        assert_eq!(state.screen[8 + 7], 0x0F);
        assert_eq!(state.screen[8], 0xF0);
        // Row 2 is untouched
        assert_eq!(state.screen[16], 0);
    }

    #[test]
    fn test_bottom_edge_wraps_to_top() {
        let mut state = state_with_sprite(&[0x80, 0x80]);
        state.draw_sprite(0, 31, 2).unwrap();
        assert!(state.pixel(0, 31));
        assert!(state.pixel(0, 0));
    }

    #[test]
    fn test_coordinates_wrap() {
        let mut state = state_with_sprite(&[0x80]);
        state.draw_sprite(64 + 2, 32 + 3, 1).unwrap();
        assert!(state.pixel(2, 3));
    }

    #[test]
    fn test_out_of_memory_sprite() {
        let mut state = state_with_sprite(&[]);
        state.i = 0x0FFE;
        let err = state.draw_sprite(0, 0, 3).unwrap_err();
        assert!(matches!(err, Chip8Error::InvalidMemoryAccess { address: 0x0FFE, length: 3 }));

        state.i = 0xFFFF;
        let err = state.draw_sprite(0, 0, 2).unwrap_err();
        assert!(matches!(err, Chip8Error::ArithmeticOverflow { .. }));
        assert!(state.screen.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_screen() {
        let mut state = state_with_sprite(&[0xFF]);
        state.draw_sprite(0, 0, 1).unwrap();
        state.clear_screen();
        assert!(state.screen.iter().all(|&b| b == 0));
    }
}
