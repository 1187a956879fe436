// Tue Jan 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchError {
    #[error("function {function:x}: stack-pointer-modifying instruction `{opcode} {operand}` is not a recognized immediate subtraction")]
    UnsupportedStackSubtraction {
        function: u64,
        opcode: String,
        operand: String,
    },
}
