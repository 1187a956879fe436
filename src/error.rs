// Tue Jan 13 2026 - Alex

use thiserror::Error;

/// Crate-wide error, collecting every stage's fatal error kind (§7).
/// Non-fatal findings (unresolved signatures, indirect callsites, cycle
/// membership) never become an `AnalyzerError` — they're collected into
/// the report instead.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error(transparent)]
    Disasm(#[from] crate::disasm::DisasmError),
    #[error(transparent)]
    SymbolTable(#[from] crate::symtab::SymbolTableError),
    #[error(transparent)]
    Arch(#[from] crate::arch::ArchError),
    #[error(transparent)]
    Annotation(#[from] crate::annotation::AnnotationError),
    #[error(transparent)]
    LineResolver(#[from] crate::lineres::LineResolverError),
    #[error(transparent)]
    TaskTable(#[from] crate::external::TaskTableError),
    #[error("failed to read annotation file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}
