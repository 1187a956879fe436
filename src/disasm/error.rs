// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisasmError {
    #[error("objdump failed to disassemble")]
    DisassembleFailed,
    #[error("failed to run objdump: {0}")]
    SpawnFailed(#[from] std::io::Error),
    #[error("function {0:x} has no instructions")]
    EmptyFunction(u64),
    #[error("duplicate function address {0:x} in disassembly")]
    DuplicateFunction(u64),
}
