// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolTableError {
    #[error("objdump failed to dump symbol table")]
    DumpFailed,
    #[error("failed to run objdump: {0}")]
    SpawnFailed(#[from] std::io::Error),
}
