// Tue Jan 13 2026 - Alex

use crate::disasm::error::DisasmError;
use crate::model::{Address, Symbol};
use crate::symtab::SymbolTable;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// One instruction line recognized inside a function body (§4.1).
#[derive(Debug, Clone)]
pub struct RawInstruction {
    pub address: Address,
    pub opcode: String,
    pub operand: String,
}

// Example: "08028c8c <motion_lid_calc>:"
static FUNCTION_HEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<address>[0-9A-Fa-f]+)\s+<(?P<name>[^>]+)>:$").unwrap());

// Example: "44d94:\tf893 0068 \tldrb.w\tr0, [r3, #104]\t; 0x68"
static INSTRUCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<address>[0-9A-Fa-f]+):\s+[0-9A-Fa-f ]+\t\s*(?P<opcode>\S+)(\s+(?P<operand>[^;]*))?")
        .unwrap()
});

enum State<'a> {
    Seeking,
    Reading {
        symbol: &'a Symbol,
        end: Option<Address>,
        instructions: Vec<RawInstruction>,
    },
}

fn detect_function_head<'a>(line: &str, symtab: &'a SymbolTable) -> Option<&'a Symbol> {
    let caps = FUNCTION_HEAD_RE.captures(line)?;
    let address = u64::from_str_radix(&caps["address"], 16).ok()?;
    let symbol = symtab.find_by_address(Address::new(address))?;
    if symbol.is_function() {
        Some(symbol)
    } else {
        None
    }
}

fn parse_instruction(line: &str, function_end: Option<Address>) -> Option<RawInstruction> {
    let caps = INSTRUCTION_RE.captures(line)?;
    let address = Address::new(u64::from_str_radix(&caps["address"], 16).ok()?);

    if let Some(end) = function_end {
        if address >= end {
            return None;
        }
    }

    let opcode = caps["opcode"].to_string();
    let operand = caps
        .name("operand")
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(RawInstruction { address, opcode, operand })
}

/// Splits the disassembler's textual output (§6) into one instruction stream
/// per recognized function (§4.1).
///
/// Implemented as a two-state machine: `Seeking` scans for a function head
/// whose address is a known `Function` symbol, `Reading` collects
/// instruction lines until a non-instruction line (or EOF) ends the
/// function. On end-of-function the current line is *not* consumed, since
/// it may itself be the next function's head.
pub fn parse_disassembly<'a>(
    text: &str,
    symtab: &'a SymbolTable,
) -> Result<Vec<(&'a Symbol, Vec<RawInstruction>)>, DisasmError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut functions = Vec::new();
    let mut seen_addresses = HashSet::new();

    let mut state = State::Seeking;
    let mut line_index = 0usize;

    while line_index < lines.len() {
        let line = lines[line_index];

        match state {
            State::Seeking => {
                if let Some(symbol) = detect_function_head(line, symtab) {
                    state = State::Reading {
                        symbol,
                        end: symbol.end_address(),
                        instructions: Vec::new(),
                    };
                }
            }
            State::Reading { symbol, end, ref mut instructions } => {
                let instruction = parse_instruction(line, end);
                if let Some(instr) = &instruction {
                    instructions.push(instr.clone());
                }

                let at_eof = line_index + 1 == lines.len();
                if instruction.is_none() || at_eof {
                    if instructions.is_empty() {
                        return Err(DisasmError::EmptyFunction(symbol.address().as_u64()));
                    }
                    if !seen_addresses.insert(symbol.address().as_u64()) {
                        return Err(DisasmError::DuplicateFunction(symbol.address().as_u64()));
                    }

                    functions.push((symbol, std::mem::take(instructions)));
                    state = State::Seeking;

                    // Non-instruction lines may themselves be a function
                    // head; re-examine the same line in the Seeking state.
                    if instruction.is_none() {
                        continue;
                    }
                }
            }
        }

        line_index += 1;
    }

    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SymbolKind;

    fn symtab_with(entries: &[(u64, &str, u64)]) -> SymbolTable {
        let symbols = entries
            .iter()
            .map(|&(addr, name, size)| {
                Symbol::new(Address::new(addr), SymbolKind::Function, size, name.to_string())
            })
            .collect();
        SymbolTable::new(symbols)
    }

    #[test]
    fn splits_two_functions_separated_by_blank_line() {
        let symtab = symtab_with(&[(0x1000, "leaf", 0), (0x2000, "next", 0)]);
        let text = "\
00001000 <leaf>:
    1000:\t4770      \tpush\t{r4, lr}
    1002:\tb480      \tsub\tsp, sp, #16

00002000 <next>:
    2000:\t4770      \tbx\tlr
";
        let functions = parse_disassembly(text, &symtab).unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].0.name(), "leaf");
        assert_eq!(functions[0].1.len(), 2);
        assert_eq!(functions[1].0.name(), "next");
        assert_eq!(functions[1].1.len(), 1);
    }

    #[test]
    fn stops_reading_at_symbol_size_boundary() {
        let symtab = symtab_with(&[(0x1000, "bounded", 4)]);
        let text = "\
00001000 <bounded>:
    1000:\t4770      \tpush\t{r4, lr}
    1004:\t4770      \tpush\t{r5, lr}
";
        let functions = parse_disassembly(text, &symtab).unwrap();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions[0].1.len(), 1);
    }

    #[test]
    fn rejects_empty_function() {
        let symtab = symtab_with(&[(0x1000, "empty", 0)]);
        let text = "00001000 <empty>:\n";
        let err = parse_disassembly(text, &symtab).unwrap_err();
        assert!(matches!(err, DisasmError::EmptyFunction(addr) if addr == 0x1000));
    }
}
