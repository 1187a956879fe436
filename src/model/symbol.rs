// Tue Jan 13 2026 - Alex

use crate::model::Address;
use std::fmt;

/// One entry of the target's symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    address: Address,
    kind: SymbolKind,
    size: u64,
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Data,
    Function,
}

impl Symbol {
    pub fn new(address: Address, kind: SymbolKind, size: u64, name: String) -> Self {
        Self { address, kind, size, name }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function)
    }

    /// End of the symbol's extent. `None` when the size is unknown (0).
    pub fn end_address(&self) -> Option<Address> {
        if self.size > 0 {
            Some(self.address + self.size)
        } else {
            None
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:x}", self.name, self.address)
    }
}
