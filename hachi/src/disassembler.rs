//! Linear disassembler
//!
//! Decodes a program two bytes at a time from its first byte. There is no
//! control flow analysis, so data embedded in the code shows up as
//! whatever instruction its bytes happen to spell.

use std::fmt;

use crate::decoder::{decode, Operation};
use crate::error::{Chip8Error, Result};

/// One decoded record, either a full instruction word or a lone raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    bytes: [u8; 2],
    size: usize,
    operation: Operation,
}

impl Instruction {
    /// Build a record from one or two bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match *bytes {
            [hi, lo] => Ok(Self {
                bytes: [hi, lo],
                size: 2,
                operation: decode(u16::from_be_bytes([hi, lo])),
            }),
            [byte] => Ok(Self {
                bytes: [byte, 0],
                size: 1,
                operation: Operation::Invalid(byte as u16),
            }),
            _ => Err(Chip8Error::UnsupportedAlignment { length: bytes.len() }),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.size]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The instruction word, or the raw byte for 1-byte records.
    pub fn opcode(&self) -> u16 {
        match self.size {
            1 => self.bytes[0] as u16,
            _ => u16::from_be_bytes(self.bytes),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn pseudo_code(&self) -> String {
        match self.size {
            1 => format!("DB {:02X}", self.bytes[0]),
            _ => self.operation.to_string(),
        }
    }

    pub fn description(&self) -> &'static str {
        self.operation.description()
    }

    /// The bytes as text when all of them are printable ASCII.
    pub fn ascii(&self) -> Option<String> {
        let bytes = self.bytes();
        if bytes.iter().all(|b| (32..=126).contains(b)) {
            Some(bytes.iter().map(|&b| b as char).collect())
        } else {
            None
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pseudo_code())
    }
}

/// Decode a whole program. Its length must be even.
pub fn disassemble(bytes: &[u8]) -> Result<Vec<Instruction>> {
    if bytes.len() % 2 != 0 {
        return Err(Chip8Error::UnsupportedAlignment { length: bytes.len() });
    }

    bytes.chunks_exact(2).map(Instruction::from_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_linear_decode() {
        let program = [0x00, 0xE0, 0xA2, 0x2A, 0x60, 0x0C, 0xD0, 0x15, 0x12, 0x00];
        let listing: Vec<String> = disassemble(&program)
            .unwrap()
            .iter()
            .map(|i| i.pseudo_code())
            .collect();
        assert_eq!(listing, vec!["CLS", "LD I,22A", "LD V0,0C", "DRW V0,V1,5", "JP 200"]);
    }

    #[test]
    fn test_sizes_cover_the_input() {
        let program: Vec<u8> = (0u8..=255).collect();
        let instructions = disassemble(&program).unwrap();
        assert_eq!(instructions.len(), 128);
        assert_eq!(instructions.iter().map(Instruction::size).sum::<usize>(), 256);
    }

    #[test]
    fn test_odd_length_is_rejected() {
        let err = disassemble(&[0x00, 0xE0, 0x12]).unwrap_err();
        assert!(matches!(err, Chip8Error::UnsupportedAlignment { length: 3 }));
    }

    #[test]
    fn test_empty_program() {
        assert!(disassemble(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_agrees_with_decoder() {
        for word in [0x0123u16, 0x8AB4, 0x8AB9, 0xB123, 0xE19E, 0xF30A, 0xF3FF] {
            let instruction = Instruction::from_bytes(&word.to_be_bytes()).unwrap();
            assert_eq!(instruction.operation(), decode(word));
            assert_eq!(instruction.opcode(), word);
        }
    }

    #[test]
    fn test_descriptions() {
        let add = Instruction::from_bytes(&[0x81, 0x24]).unwrap();
        assert_eq!(
            add.description(),
            "8XY4: VX += VY. VF = 1 when there's a carry, 0 when there isn't."
        );

        let raw = Instruction::from_bytes(&[0xFF, 0xFF]).unwrap();
        assert_eq!(raw.pseudo_code(), "DB FF FF");
        assert_eq!(raw.description(), "Unknown / Raw Data");
    }

    #[test]
    fn test_single_byte_record() {
        let raw = Instruction::from_bytes(&[0x41]).unwrap();
        assert_eq!(raw.size(), 1);
        assert_eq!(raw.opcode(), 0x41);
        assert_eq!(raw.bytes(), &[0x41]);
        assert_eq!(raw.to_string(), "DB 41");
        assert_eq!(raw.ascii(), Some("A".to_string()));

        assert!(Instruction::from_bytes(&[]).is_err());
        assert!(Instruction::from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_ascii_column() {
        let text = Instruction::from_bytes(b"Hi").unwrap();
        assert_eq!(text.ascii(), Some("Hi".to_string()));
        let binary = Instruction::from_bytes(&[0x00, 0xE0]).unwrap();
        assert_eq!(binary.ascii(), None);
    }
}
