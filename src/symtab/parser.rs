// Tue Jan 13 2026 - Alex

use crate::model::{Address, Symbol, SymbolKind};
use once_cell::sync::Lazy;
use regex::Regex;

// Example: "10093064 g     F .text  0000015c .hidden hook_task"
// Example: "10093064 g       O .bss   00000004 g_var"
static SYMBOL_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<address>[0-9A-Fa-f]+)\s+
        [lwg]\s+
        (?:(?P<type>[OF])\s+)?
        \S+\s+
        (?P<size>[0-9A-Fa-f]+)\s+
        (?:\S+\s+)?
        (?P<name>\S+)$
        ",
    )
    .expect("static symbol-table regex is valid")
});

/// Parses the output of `dump_symbols` (§6) into a flat symbol list.
///
/// Lines that don't match the expected shape are skipped, not fatal: the
/// dump may contain section headers, blank lines, or other noise alongside
/// symbol records.
pub fn parse_symbol_text(text: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        let Some(caps) = SYMBOL_LINE_RE.captures(line) else {
            continue;
        };

        let Ok(address) = u64::from_str_radix(&caps["address"], 16) else {
            continue;
        };
        let Ok(size) = u64::from_str_radix(&caps["size"], 16) else {
            continue;
        };
        let kind = match caps.name("type").map(|m| m.as_str()) {
            Some("F") => SymbolKind::Function,
            _ => SymbolKind::Data,
        };
        let name = caps["name"].to_string();

        symbols.push(Symbol::new(Address::new(address), kind, size, name));
    }

    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_and_data_records() {
        let text = "\
10093064 g     F .text  0000015c .hidden hook_task
10093200 g       O .bss   00000004 g_counter
not a symbol line at all
";
        let symbols = parse_symbol_text(text);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name(), "hook_task");
        assert!(symbols[0].is_function());
        assert_eq!(symbols[0].address(), Address::new(0x10093064));
        assert_eq!(symbols[0].size(), 0x15c);

        assert_eq!(symbols[1].name(), "g_counter");
        assert!(!symbols[1].is_function());
    }

    #[test]
    fn defaults_missing_type_to_data() {
        let text = "08028c8c l     .rodata 00000010 some_table\n";
        let symbols = parse_symbol_text(text);
        assert_eq!(symbols.len(), 1);
        assert!(!symbols[0].is_function());
    }
}
