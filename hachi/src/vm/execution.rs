use log::debug;
use rand::Rng;

use super::{Chip8, KeyWait};
use crate::constants::*;
use crate::decoder::Operation;
use crate::error::{Chip8Error, Result};
use crate::platform::Platform;

const VF: usize = FLAG_REGISTER;

impl<P: Platform> Chip8<P> {
    /// Apply one decoded operation. `address` is where it was fetched from;
    /// PC already points past it.
    pub(super) fn execute(&mut self, op: Operation, address: u16) -> Result<()> {
        let state = &mut self.state;
        let legacy = state.legacy_mode();

        match op {
            Operation::Sys { .. } => {}
            Operation::Cls => {
                state.clear_screen();
                self.platform.on_clear_screen();
            }
            Operation::Ret => {
                if state.sp < 0 {
                    return Err(Chip8Error::StackOverflow);
                }
                state.pc = state.stack[state.sp as usize];
                state.sp -= 1;
            }
            Operation::Jp { addr } => state.pc = addr,
            Operation::Call { addr } => {
                if state.stack_depth() >= state.stack_capacity() {
                    return Err(Chip8Error::StackOverflow);
                }
                state.sp += 1;
                state.stack[state.sp as usize] = state.pc;
                state.pc = addr;
            }
            Operation::SeImm { x, nn } => {
                if state.v[x as usize] == nn {
                    skip(&mut state.pc);
                }
            }
            Operation::SneImm { x, nn } => {
                if state.v[x as usize] != nn {
                    skip(&mut state.pc);
                }
            }
            Operation::SeReg { x, y } => {
                if state.v[x as usize] == state.v[y as usize] {
                    skip(&mut state.pc);
                }
            }
            Operation::LdImm { x, nn } => state.v[x as usize] = nn,
            Operation::AddImm { x, nn } => {
                state.v[x as usize] = state.v[x as usize].wrapping_add(nn);
            }

            // ALU: VF is written last so it wins when X is F
            Operation::LdReg { x, y } => state.v[x as usize] = state.v[y as usize],
            Operation::Or { x, y } => state.v[x as usize] |= state.v[y as usize],
            Operation::And { x, y } => state.v[x as usize] &= state.v[y as usize],
            Operation::Xor { x, y } => state.v[x as usize] ^= state.v[y as usize],
            Operation::AddReg { x, y } => {
                let (sum, carry) = state.v[x as usize].overflowing_add(state.v[y as usize]);
                state.v[x as usize] = sum;
                state.v[VF] = carry as u8;
            }
            Operation::Sub { x, y } => {
                let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
                state.v[x as usize] = vx.wrapping_sub(vy);
                state.v[VF] = (vx >= vy) as u8;
            }
            Operation::Shr { x, y } => {
                let source = if legacy { state.v[y as usize] } else { state.v[x as usize] };
                state.v[x as usize] = source >> 1;
                state.v[VF] = source & 0x01;
            }
            Operation::Subn { x, y } => {
                let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
                state.v[x as usize] = vy.wrapping_sub(vx);
                state.v[VF] = (vx <= vy) as u8;
            }
            Operation::Shl { x, y } => {
                let source = if legacy { state.v[y as usize] } else { state.v[x as usize] };
                state.v[x as usize] = source << 1;
                state.v[VF] = source >> 7;
            }

            Operation::SneReg { x, y } => {
                if state.v[x as usize] != state.v[y as usize] {
                    skip(&mut state.pc);
                }
            }
            Operation::LdI { addr } => state.i = addr,
            Operation::JpV0 { addr } => state.pc = addr.wrapping_add(state.v[0] as u16),
            Operation::Rnd { x, nn } => state.v[x as usize] = self.rng.gen::<u8>() & nn,
            Operation::Drw { x, y, n } => {
                let collision = state.draw_sprite(state.v[x as usize], state.v[y as usize], n)?;
                state.v[VF] = collision as u8;
                self.platform.on_screen_update(state);
            }
            Operation::Skp { x } => {
                if state.is_key_pressed(state.v[x as usize]) {
                    skip(&mut state.pc);
                }
            }
            Operation::Sknp { x } => {
                if !state.is_key_pressed(state.v[x as usize]) {
                    skip(&mut state.pc);
                }
            }

            // Timers
            Operation::LdVxDt { x } => state.v[x as usize] = state.delay_timer,
            Operation::LdDtVx { x } => state.delay_timer = state.v[x as usize],
            Operation::LdStVx { x } => state.sound_timer = state.v[x as usize],

            Operation::LdVxK { x } => {
                state.key_wait = Some(KeyWait {
                    register: x,
                    mask: !state.keyboard,
                });
                debug!("Waiting for a key to land in V{x:X}");
            }

            Operation::AddI { x } => state.i = state.i.wrapping_add(state.v[x as usize] as u16),
            Operation::LdF { x } => {
                let glyph = (state.v[x as usize] as u16).wrapping_mul(FONT_GLYPH_SIZE);
                state.i = FONT_START.wrapping_add(glyph);
            }
            Operation::LdB { x } => {
                let start = self.checked_block(3)?;
                let value = self.state.v[x as usize];
                let memory = &mut self.state.memory;
                memory[start] = value / 100;
                memory[start + 1] = value / 10 % 10;
                memory[start + 2] = value % 10;
            }
            Operation::StoreRegs { x } => {
                let count = x as usize + 1;
                let start = self.checked_block(count as u16)?;
                let state = &mut self.state;
                state.memory[start..start + count].copy_from_slice(&state.v[..count]);
                if legacy {
                    state.i = state.i.wrapping_add(count as u16);
                }
            }
            Operation::LoadRegs { x } => {
                let count = x as usize + 1;
                let start = self.checked_block(count as u16)?;
                let state = &mut self.state;
                state.v[..count].copy_from_slice(&state.memory[start..start + count]);
                if legacy {
                    state.i = state.i.wrapping_add(count as u16);
                }
            }

            Operation::Invalid(word) => {
                return Err(Chip8Error::InvalidInstruction {
                    opcode: word,
                    address,
                });
            }
        }

        Ok(())
    }

    /// Start of the `length`-byte block at I, if a program may touch it.
    fn checked_block(&self, length: u16) -> Result<usize> {
        let i = self.state.i;
        let end = i
            .checked_add(length)
            .ok_or(Chip8Error::ArithmeticOverflow { address: i, length })?;
        if end as usize > self.state.memory.len() || i < PROGRAM_START {
            return Err(Chip8Error::InvalidMemoryAccess { address: i, length });
        }
        Ok(i as usize)
    }
}

fn skip(pc: &mut u16) {
    *pc = pc.wrapping_add(INSTRUCTION_SIZE);
}
