//! Opcode decoder shared by the interpreter and the disassembler
//!
//! An instruction word is two big-endian bytes. The top nibble selects a
//! group; groups 0x8, 0xE and 0xF pick the operation with their low
//! nibble or low byte, and group 0x0 singles out CLS and RET from the
//! generic SYS call.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// 0NNN
    Sys { addr: u16 },
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1NNN
    Jp { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SeImm { x: u8, nn: u8 },
    /// 4XNN
    SneImm { x: u8, nn: u8 },
    /// 5XY0
    SeReg { x: u8, y: u8 },
    /// 6XNN
    LdImm { x: u8, nn: u8 },
    /// 7XNN
    AddImm { x: u8, nn: u8 },
    /// 8XY0
    LdReg { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    Sub { x: u8, y: u8 },
    /// 8XY6
    Shr { x: u8, y: u8 },
    /// 8XY7
    Subn { x: u8, y: u8 },
    /// 8XYE
    Shl { x: u8, y: u8 },
    /// 9XY0
    SneReg { x: u8, y: u8 },
    /// ANNN
    LdI { addr: u16 },
    /// BNNN
    JpV0 { addr: u16 },
    /// CXNN
    Rnd { x: u8, nn: u8 },
    /// DXYN
    Drw { x: u8, y: u8, n: u8 },
    /// EX9E
    Skp { x: u8 },
    /// EXA1
    Sknp { x: u8 },
    /// FX07
    LdVxDt { x: u8 },
    /// FX0A
    LdVxK { x: u8 },
    /// FX15
    LdDtVx { x: u8 },
    /// FX18
    LdStVx { x: u8 },
    /// FX1E
    AddI { x: u8 },
    /// FX29
    LdF { x: u8 },
    /// FX33
    LdB { x: u8 },
    /// FX55
    StoreRegs { x: u8 },
    /// FX65
    LoadRegs { x: u8 },
    /// Any word that matches no operation.
    Invalid(u16),
}

/// Classify an instruction word. Total: every word maps to exactly one
/// operation or to `Operation::Invalid`.
pub fn decode(word: u16) -> Operation {
    let x = ((word >> 8) & 0xF) as u8;
    let y = ((word >> 4) & 0xF) as u8;
    let n = (word & 0xF) as u8;
    let nn = (word & 0xFF) as u8;
    let nnn = word & 0x0FFF;

    match word >> 12 {
        0x0 => match nnn {
            0x0E0 => Operation::Cls,
            0x0EE => Operation::Ret,
            _ => Operation::Sys { addr: nnn },
        },
        0x1 => Operation::Jp { addr: nnn },
        0x2 => Operation::Call { addr: nnn },
        0x3 => Operation::SeImm { x, nn },
        0x4 => Operation::SneImm { x, nn },
        0x5 => Operation::SeReg { x, y },
        0x6 => Operation::LdImm { x, nn },
        0x7 => Operation::AddImm { x, nn },
        0x8 => match n {
            0x0 => Operation::LdReg { x, y },
            0x1 => Operation::Or { x, y },
            0x2 => Operation::And { x, y },
            0x3 => Operation::Xor { x, y },
            0x4 => Operation::AddReg { x, y },
            0x5 => Operation::Sub { x, y },
            0x6 => Operation::Shr { x, y },
            0x7 => Operation::Subn { x, y },
            0xE => Operation::Shl { x, y },
            _ => Operation::Invalid(word),
        },
        0x9 => Operation::SneReg { x, y },
        0xA => Operation::LdI { addr: nnn },
        0xB => Operation::JpV0 { addr: nnn },
        0xC => Operation::Rnd { x, nn },
        0xD => Operation::Drw { x, y, n },
        0xE => match nn {
            0x9E => Operation::Skp { x },
            0xA1 => Operation::Sknp { x },
            _ => Operation::Invalid(word),
        },
        0xF => match nn {
            0x07 => Operation::LdVxDt { x },
            0x0A => Operation::LdVxK { x },
            0x15 => Operation::LdDtVx { x },
            0x18 => Operation::LdStVx { x },
            0x1E => Operation::AddI { x },
            0x29 => Operation::LdF { x },
            0x33 => Operation::LdB { x },
            0x55 => Operation::StoreRegs { x },
            0x65 => Operation::LoadRegs { x },
            _ => Operation::Invalid(word),
        },
        _ => Operation::Invalid(word),
    }
}

impl Operation {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Operation::Invalid(_))
    }

    /// Assembly mnemonic, shared by several operations (e.g. `LD`).
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Operation::Sys { .. } => "SYS",
            Operation::Cls => "CLS",
            Operation::Ret => "RET",
            Operation::Jp { .. } | Operation::JpV0 { .. } => "JP",
            Operation::Call { .. } => "CALL",
            Operation::SeImm { .. } | Operation::SeReg { .. } => "SE",
            Operation::SneImm { .. } | Operation::SneReg { .. } => "SNE",
            Operation::LdImm { .. }
            | Operation::LdReg { .. }
            | Operation::LdI { .. }
            | Operation::LdVxDt { .. }
            | Operation::LdVxK { .. }
            | Operation::LdDtVx { .. }
            | Operation::LdStVx { .. }
            | Operation::LdF { .. }
            | Operation::LdB { .. }
            | Operation::StoreRegs { .. }
            | Operation::LoadRegs { .. } => "LD",
            Operation::AddImm { .. } | Operation::AddReg { .. } | Operation::AddI { .. } => "ADD",
            Operation::Or { .. } => "OR",
            Operation::And { .. } => "AND",
            Operation::Xor { .. } => "XOR",
            Operation::Sub { .. } => "SUB",
            Operation::Shr { .. } => "SHR",
            Operation::Subn { .. } => "SUBN",
            Operation::Shl { .. } => "SHL",
            Operation::Rnd { .. } => "RND",
            Operation::Drw { .. } => "DRW",
            Operation::Skp { .. } => "SKP",
            Operation::Sknp { .. } => "SKNP",
            Operation::Invalid(_) => "DB",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::Sys { .. } => "0NNN: Calls RCA 1802 program at address NNN.",
            Operation::Cls => "00E0: Clears the screen.",
            Operation::Ret => "00EE: Returns from a subroutine.",
            Operation::Jp { .. } => "1NNN: Jumps to address NNN.",
            Operation::Call { .. } => "2NNN: Calls subroutine at NNN.",
            Operation::SeImm { .. } => "3XNN: Skips the next instruction if VX equals NN.",
            Operation::SneImm { .. } => "4XNN: Skips the next instruction if VX doesn't equal NN.",
            Operation::SeReg { .. } => "5XY0: Skips the next instruction if VX equals VY.",
            Operation::LdImm { .. } => "6XNN: Sets VX to NN.",
            Operation::AddImm { .. } => "7XNN: Adds NN to VX.",
            Operation::LdReg { .. } => "8XY0: Sets VX to the value of VY.",
            Operation::Or { .. } => "8XY1: Sets VX to VX | VY (bit-wise OR).",
            Operation::And { .. } => "8XY2: Sets VX to VX & VY (bit-wise AND).",
            Operation::Xor { .. } => "8XY3: Sets VX to VX ^ VY (bit-wise XOR).",
            Operation::AddReg { .. } => {
                "8XY4: VX += VY. VF = 1 when there's a carry, 0 when there isn't."
            }
            Operation::Sub { .. } => {
                "8XY5: VX -= VY. VF = 0 when there's a borrow, 1 when there isn't."
            }
            Operation::Shr { .. } => {
                "8XY6: VX = VY >> 1. VF = least significant bit prior to the shift."
            }
            Operation::Subn { .. } => {
                "8XY7: VX = VY - VX. VF = 0 when there's a borrow, 1 when there isn't."
            }
            Operation::Shl { .. } => {
                "8XYE: VX = VY << 1. VF = most significant bit prior to the shift."
            }
            Operation::SneReg { .. } => "9XY0: Skips the next instruction if VX doesn't equal VY.",
            Operation::LdI { .. } => "ANNN: Sets I to the address NNN.",
            Operation::JpV0 { .. } => "BNNN: Jumps to the address NNN plus V0.",
            Operation::Rnd { .. } => "CXNN: Sets VX to a random number (0-FF) & NN (bit-wise AND).",
            Operation::Drw { .. } => "DXYN: Draws N rows of sprite pointed by I at VX,VY.",
            Operation::Skp { .. } => "EX9E: Skips the next instruction if the key stored in VX is pressed.",
            Operation::Sknp { .. } => {
                "EXA1: Skips the next instruction if the key stored in VX isn't pressed."
            }
            Operation::LdVxDt { .. } => "FX07: Sets VX to the value of the delay timer.",
            Operation::LdVxK { .. } => {
                "FX0A: A key press is awaited, and then key number is stored in VX."
            }
            Operation::LdDtVx { .. } => "FX15: Sets the delay timer to VX.",
            Operation::LdStVx { .. } => "FX18: Sets the sound timer to VX.",
            Operation::AddI { .. } => "FX1E: Adds VX to I.",
            Operation::LdF { .. } => {
                "FX29: Sets I to the location of the sprite for the character in VX."
            }
            Operation::LdB { .. } => {
                "FX33: Store BCD representation of VX in memory at I, I+1, and I+2."
            }
            Operation::StoreRegs { .. } => "FX55: Stores V0 to VX in memory starting at address I.",
            Operation::LoadRegs { .. } => {
                "FX65: Fills V0 to VX with values from memory starting at address I."
            }
            Operation::Invalid(_) => "Unknown / Raw Data",
        }
    }
}

impl fmt::Display for Operation {
    /// Pseudo-assembly with upper-case hex operands.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operation::Sys { addr } => write!(f, "SYS {addr:03X}"),
            Operation::Cls => write!(f, "CLS"),
            Operation::Ret => write!(f, "RET"),
            Operation::Jp { addr } => write!(f, "JP {addr:03X}"),
            Operation::Call { addr } => write!(f, "CALL {addr:03X}"),
            Operation::SeImm { x, nn } => write!(f, "SE V{x:X},{nn:02X}"),
            Operation::SneImm { x, nn } => write!(f, "SNE V{x:X},{nn:02X}"),
            Operation::SeReg { x, y } => write!(f, "SE V{x:X},V{y:X}"),
            Operation::LdImm { x, nn } => write!(f, "LD V{x:X},{nn:02X}"),
            Operation::AddImm { x, nn } => write!(f, "ADD V{x:X},{nn:02X}"),
            Operation::LdReg { x, y } => write!(f, "LD V{x:X},V{y:X}"),
            Operation::Or { x, y } => write!(f, "OR V{x:X},V{y:X}"),
            Operation::And { x, y } => write!(f, "AND V{x:X},V{y:X}"),
            Operation::Xor { x, y } => write!(f, "XOR V{x:X},V{y:X}"),
            Operation::AddReg { x, y } => write!(f, "ADD V{x:X},V{y:X}"),
            Operation::Sub { x, y } => write!(f, "SUB V{x:X},V{y:X}"),
            Operation::Shr { x, y } => write!(f, "SHR V{x:X},V{y:X}"),
            Operation::Subn { x, y } => write!(f, "SUBN V{x:X},V{y:X}"),
            Operation::Shl { x, y } => write!(f, "SHL V{x:X},V{y:X}"),
            Operation::SneReg { x, y } => write!(f, "SNE V{x:X},V{y:X}"),
            Operation::LdI { addr } => write!(f, "LD I,{addr:03X}"),
            Operation::JpV0 { addr } => write!(f, "JP V0,{addr:03X}"),
            Operation::Rnd { x, nn } => write!(f, "RND V{x:X},{nn:02X}"),
            Operation::Drw { x, y, n } => write!(f, "DRW V{x:X},V{y:X},{n:X}"),
            Operation::Skp { x } => write!(f, "SKP V{x:X}"),
            Operation::Sknp { x } => write!(f, "SKNP V{x:X}"),
            Operation::LdVxDt { x } => write!(f, "LD V{x:X},DT"),
            Operation::LdVxK { x } => write!(f, "LD V{x:X},K"),
            Operation::LdDtVx { x } => write!(f, "LD DT,V{x:X}"),
            Operation::LdStVx { x } => write!(f, "LD ST,V{x:X}"),
            Operation::AddI { x } => write!(f, "ADD I,V{x:X}"),
            Operation::LdF { x } => write!(f, "LD I,CHAR V{x:X}"),
            Operation::LdB { x } => write!(f, "LD [I],BCD V{x:X}"),
            Operation::StoreRegs { x } => write!(f, "LD [I],V{x:X}"),
            Operation::LoadRegs { x } => write!(f, "LD V{x:X},[I]"),
            Operation::Invalid(word) => write!(f, "DB {:02X} {:02X}", word >> 8, word & 0xFF),
        }
    }
}
