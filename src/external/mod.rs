// Tue Jan 13 2026 - Alex

pub mod addr2line;
pub mod objdump;
pub mod tasktable;

pub use addr2line::Addr2lineRunner;
pub use objdump::{Disassembler, ObjdumpRunner, SymbolDumper};
pub use tasktable::{resolve_task_routines, DlopenTaskTableLoader, RawTaskInfo, TaskTableError, TaskTableLoader};
