//! Tabular disassembly listing

use colored::*;
use hachi::constants::PROGRAM_START;
use hachi::{disassemble, Instruction};

const HEADER: [&str; 5] = ["addr", "opcode", "pseudo-code", "ascii", "description"];
const GAP: &str = "  ";

/// Disassemble a program image. A trailing odd byte becomes a 1-byte record.
pub fn records(program: &[u8]) -> hachi::Result<Vec<Instruction>> {
    let even = program.len() & !1;
    let mut records = disassemble(&program[..even])?;
    if even < program.len() {
        records.push(Instruction::from_bytes(&program[even..])?);
    }
    Ok(records)
}

/// Render records as aligned columns, addressed from 0x200.
pub fn render(records: &[Instruction], color: bool) -> String {
    let mut rows = Vec::with_capacity(records.len());
    let mut address = PROGRAM_START as usize;

    for record in records {
        let opcode = match record.size() {
            1 => format!("{:02X}", record.opcode()),
            _ => format!("{:04X}", record.opcode()),
        };
        let ascii = record.ascii().map(|text| format!("`{text}`")).unwrap_or_default();
        let cells = [
            format!("{address:04X}"),
            opcode,
            record.pseudo_code(),
            ascii,
            record.description().to_string(),
        ];
        rows.push((cells, record.operation().is_invalid()));
        address += record.size();
    }

    let mut widths = HEADER.map(str::len);
    for (cells, _) in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = HEADER.map(String::from);
    push_line(&mut out, &header, &widths, |_, text| {
        if color { text.bold().to_string() } else { text }
    });
    for (cells, invalid) in &rows {
        push_line(&mut out, cells, &widths, |column, text| {
            if color { paint(column, *invalid, text) } else { text }
        });
    }
    out
}

fn push_line<F>(out: &mut String, cells: &[String; 5], widths: &[usize; 5], mut style: F)
where
    F: FnMut(usize, String) -> String,
{
    let mut line = String::new();
    for (column, cell) in cells.iter().enumerate() {
        let last = column == cells.len() - 1;
        // Pad before styling so escape codes don't count towards the width
        let text = if last { cell.clone() } else { format!("{cell:<width$}", width = widths[column]) };
        line.push_str(&style(column, text));
        if !last {
            line.push_str(GAP);
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn paint(column: usize, invalid: bool, text: String) -> String {
    match column {
        0 => text.bright_black().to_string(),
        1 => text.yellow().to_string(),
        2 if invalid => text.red().to_string(),
        2 => text.bright_green().to_string(),
        3 => text.cyan().to_string(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_listing() {
        let program = [0x00, 0xE0, 0x12, 0x00];
        let text = render(&records(&program).unwrap(), false);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "addr  opcode  pseudo-code  ascii  description");
        assert!(lines[1].starts_with("0200  00E0    CLS          "));
        assert!(lines[1].ends_with("00E0: Clears the screen."));
        assert!(lines[2].starts_with("0202  1200    JP 200       "));
    }

    #[test]
    fn test_columns_are_aligned() {
        // Widest pseudo-code is "LD [I],BCD V2", so descriptions start at 36
        let program = [0x00, 0xE0, 0xF2, 0x33, 0xA2, 0x22];
        let text = render(&records(&program).unwrap(), false);
        let descriptions: Vec<&str> = text.lines().map(|line| &line[36..40]).collect();
        assert_eq!(descriptions, vec!["desc", "00E0", "FX33", "ANNN"]);
    }

    #[test]
    fn test_trailing_byte_and_ascii() {
        let program = *b"Hi!";
        let all = records(&program).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].size(), 1);

        let text = render(&all, false);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("`Hi`"));
        assert!(lines[2].starts_with("0202  21      DB 21"));
        assert!(lines[2].contains("`!`"));
        assert!(lines[2].ends_with("Unknown / Raw Data"));
    }

    #[test]
    fn test_empty_program() {
        let text = render(&records(&[]).unwrap(), false);
        assert_eq!(text, "addr  opcode  pseudo-code  ascii  description\n");
    }
}
