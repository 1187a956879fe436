// Tue Jan 13 2026 - Alex

use crate::model::{Address, Symbol};
use std::collections::HashMap;

/// Indexed view over the symbols produced by `dump_symbols` (§6).
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_address: HashMap<u64, usize>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        // If multiple symbols share an address, keeping any of them is good
        // enough for function-head detection (matches the original tool's
        // `symbol_map` construction).
        let mut by_address = HashMap::with_capacity(symbols.len());
        for (idx, symbol) in symbols.iter().enumerate() {
            by_address.insert(symbol.address().as_u64(), idx);
        }
        Self { symbols, by_address }
    }

    pub fn all(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn find_by_address(&self, address: Address) -> Option<&Symbol> {
        self.by_address.get(&address.as_u64()).map(|&idx| &self.symbols[idx])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name() == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_function())
    }
}
