// Tue Jan 13 2026 - Alex

use crate::arch::error::ArchError;
use crate::disasm::RawInstruction;
use crate::model::{Address, Callsite, Symbol};
use once_cell::sync::Lazy;
use regex::Regex;

/// Per-architecture prologue/callsite extraction (§4.2). Pluggable so a
/// second instruction family could be added without touching C1/C3.
pub trait ArchAnalyzer {
    fn analyze_function(
        &self,
        symbol: &Symbol,
        instructions: &[RawInstruction],
    ) -> Result<(u64, Vec<Callsite>), ArchError>;
}

const GENERAL_PURPOSE_REGISTER_SIZE: u64 = 4;

const CONDITION_CODES: &str =
    "|eq|ne|cs|hs|cc|lo|mi|pl|vs|vc|hi|ls|ge|lt|gt|le";
const IMM_ADDRESS_RE: &str = r"([0-9A-Fa-f]+)\s+<([^>]+)>";

static JUMP_OPCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(b({0})|bx({0}))(\.\w)?$", CONDITION_CODES)).unwrap()
});
static CALL_OPCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(bl({0})|blx({0}))(\.\w)?$", CONDITION_CODES)).unwrap()
});
static CALL_OPERAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{}$", IMM_ADDRESS_RE)).unwrap());
static CBZ_CBNZ_OPCODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(cbz|cbnz)(\.\w)?$").unwrap());
// Example: "r0, 1009bcbe <host_cmd_motion_sense+0x1d2>"
static CBZ_CBNZ_OPERAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^[^,]+,\s+{}$", IMM_ADDRESS_RE)).unwrap());
// Ignore lr, it's for return. Ported verbatim, including the loose
// alternation precedence of the original pattern.
static INDIRECT_CALL_OPERAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^r\d+|sb|sl|fp|ip|sp|pc$").unwrap());
static LDR_OPCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ldr(\.\w)?$").unwrap());
// Example: "pc, [sp], #4"
static LDR_PC_OPERAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pc, \[([^\]]+)\]").unwrap());
static PUSH_OPCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^push$").unwrap());
static STM_OPCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^stmdb$").unwrap());
static SUB_OPCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sub(s|w)?(\.\w)?$").unwrap());
static SUB_OPERAND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sp[^#]+#(\d+)").unwrap());

/// One documented 32-bit instruction family with 4-byte general-purpose
/// registers (§4.2). Today the only implementation registered.
#[derive(Debug, Default)]
pub struct ArmAnalyzer;

impl ArchAnalyzer for ArmAnalyzer {
    fn analyze_function(
        &self,
        symbol: &Symbol,
        instructions: &[RawInstruction],
    ) -> Result<(u64, Vec<Callsite>), ArchError> {
        let mut stack_frame = 0u64;
        let mut callsites = Vec::new();

        for instruction in instructions {
            let opcode = instruction.opcode.as_str();
            let operand = instruction.operand.as_str();

            let is_jump = JUMP_OPCODE_RE.is_match(opcode);
            let is_call = CALL_OPCODE_RE.is_match(opcode);
            let is_cbz_cbnz = CBZ_CBNZ_OPCODE_RE.is_match(opcode);

            if is_jump || is_call || is_cbz_cbnz {
                let is_tail = is_jump || is_cbz_cbnz;
                let target_caps = if is_cbz_cbnz {
                    CBZ_CBNZ_OPERAND_RE.captures(operand)
                } else {
                    CALL_OPERAND_RE.captures(operand)
                };

                match target_caps {
                    Some(caps) => {
                        let target = u64::from_str_radix(&caps[1], 16).map_err(|_| {
                            ArchError::UnsupportedStackSubtraction {
                                function: symbol.address().as_u64(),
                                opcode: opcode.to_string(),
                                operand: operand.to_string(),
                            }
                        })?;

                        let in_function = symbol.size() > 0
                            && target > symbol.address().as_u64()
                            && target < symbol.address().as_u64() + symbol.size();

                        if !in_function {
                            callsites.push(Callsite::new(
                                Some(instruction.address),
                                Some(Address::new(target)),
                                is_tail,
                            ));
                        }
                    }
                    None => {
                        // Maybe it's an indirect call. CBZ/CBNZ can't be.
                        if !is_cbz_cbnz && INDIRECT_CALL_OPERAND_RE.is_match(operand) {
                            callsites.push(Callsite::new(Some(instruction.address), None, is_tail));
                        }
                    }
                }
            } else if LDR_OPCODE_RE.is_match(opcode) {
                if let Some(caps) = LDR_PC_OPERAND_RE.captures(operand) {
                    // "ldr pc, [sp], xx" is a return, not a call.
                    if &caps[1] != "sp" {
                        callsites.push(Callsite::new(Some(instruction.address), None, true));
                    }
                }
            } else if PUSH_OPCODE_RE.is_match(opcode) {
                // Example: "{r4, r5, r6, r7, lr}"
                let register_count = operand.split(',').count() as u64;
                stack_frame += register_count * GENERAL_PURPOSE_REGISTER_SIZE;
            } else if SUB_OPCODE_RE.is_match(opcode) {
                match SUB_OPERAND_RE.captures(operand) {
                    Some(caps) => {
                        let amount: u64 = caps[1].parse().unwrap_or(0);
                        stack_frame += amount;
                    }
                    None => {
                        if operand.starts_with("sp") {
                            return Err(ArchError::UnsupportedStackSubtraction {
                                function: symbol.address().as_u64(),
                                opcode: opcode.to_string(),
                                operand: operand.to_string(),
                            });
                        }
                    }
                }
            } else if STM_OPCODE_RE.is_match(opcode) {
                if let Some(params) = operand.strip_prefix("sp!") {
                    // "sp!, {r4, r5, r6, r7, r8, r9, lr}"
                    let register_list = params.splitn(2, ',').nth(1).unwrap_or("");
                    let register_count = register_list.split(',').count() as u64;
                    stack_frame += register_count * GENERAL_PURPOSE_REGISTER_SIZE;
                }
            }
        }

        Ok((stack_frame, callsites))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SymbolKind;

    fn instr(addr: u64, opcode: &str, operand: &str) -> RawInstruction {
        RawInstruction { address: Address::new(addr), opcode: opcode.to_string(), operand: operand.to_string() }
    }

    fn leaf_symbol() -> Symbol {
        Symbol::new(Address::new(0x1000), SymbolKind::Function, 0x20, "leaf".to_string())
    }

    #[test]
    fn push_and_sub_accumulate_stack_frame() {
        let symbol = leaf_symbol();
        let instructions = vec![
            instr(0x1000, "push", "{r4, lr}"),
            instr(0x1002, "sub", "sp, sp, #16"),
        ];
        let (stack_frame, callsites) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert_eq!(stack_frame, 2 * 4 + 16);
        assert!(callsites.is_empty());
    }

    #[test]
    fn call_to_external_address_is_recorded_non_tail() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "bl", "2000 <other_func>")];
        let (_, callsites) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert_eq!(callsites.len(), 1);
        assert!(!callsites[0].is_tail());
        assert_eq!(callsites[0].target_address(), Some(Address::new(0x2000)));
    }

    #[test]
    fn in_function_branch_is_dropped() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "b", "1010 <leaf+0x10>")];
        let (_, callsites) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert!(callsites.is_empty());
    }

    #[test]
    fn indirect_call_via_register_is_recorded() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "blx", "r3")];
        let (_, callsites) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert_eq!(callsites.len(), 1);
        assert!(callsites[0].is_indirect());
    }

    #[test]
    fn ldr_pc_from_stack_is_treated_as_return() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "ldr", "pc, [sp], #4")];
        let (_, callsites) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert!(callsites.is_empty());
    }

    #[test]
    fn stmdb_writeback_on_sp_adds_frame() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "stmdb", "sp!, {r4, r5, r6, r7, r8, r9, lr}")];
        let (stack_frame, _) = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap();
        assert_eq!(stack_frame, 7 * 4);
    }

    #[test]
    fn unrecognized_sp_subtraction_is_a_contract_violation() {
        let symbol = leaf_symbol();
        let instructions = vec![instr(0x1000, "sub", "sp, r4")];
        let err = ArmAnalyzer.analyze_function(&symbol, &instructions).unwrap_err();
        assert!(matches!(err, ArchError::UnsupportedStackSubtraction { .. }));
    }
}
