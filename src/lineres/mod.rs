// Tue Jan 13 2026 - Alex

pub mod error;

pub use error::LineResolverError;

use crate::model::Address;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

/// One inline-stack frame: the function a line belongs to, its source path,
/// and line number. `None` in the frame list means the line is unknown
/// (`??:0` or `:?`) (§4.4, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFrame {
    pub function_name: String,
    pub path: String,
    pub line: u32,
}

/// Resolves addresses to source lines, optionally unwinding inlining.
/// Abstracted so the concrete `addr2line` subprocess implementation lives
/// outside the core analysis (§6).
pub trait LineResolver {
    fn resolve_line(
        &self,
        address: Address,
        resolve_inline: bool,
    ) -> Result<Vec<Option<LineFrame>>, LineResolverError>;
}

// Example: "driver/accel_kionix.c:321 (discriminator 3)"
static ADDRTOLINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<path>[^:]+):(?P<line>\d+)(\s+\(discriminator\s+\d+\))?$").unwrap()
});

/// Parses `addr2line -f [-i]` output: pairs of (function name, location)
/// lines, innermost frame first.
pub fn parse_addr2line_output(text: &str) -> Result<Vec<Option<LineFrame>>, LineResolverError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    if lines.len() < 2 || lines.len() % 2 != 0 {
        return Err(LineResolverError::MalformedOutput(text.to_string()));
    }

    let mut frames = Vec::with_capacity(lines.len() / 2);
    for pair in lines.chunks(2) {
        let function_name = pair[0].trim();
        let location = pair[1].trim();

        if location == "??:0" || location == ":?" {
            frames.push(None);
            continue;
        }

        let caps = ADDRTOLINE_RE
            .captures(location)
            .ok_or_else(|| LineResolverError::MalformedOutput(location.to_string()))?;
        let line: u32 = caps["line"]
            .parse()
            .map_err(|_| LineResolverError::MalformedOutput(location.to_string()))?;

        frames.push(Some(LineFrame {
            function_name: function_name.to_string(),
            path: canonicalize_best_effort(caps["path"].trim()),
            line,
        }));
    }

    Ok(frames)
}

fn canonicalize_best_effort(path: &str) -> String {
    std::fs::canonicalize(path)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Memoizes `resolve_line` results by `(address, inline-mode)` so repeated
/// lookups of the same key never re-invoke the underlying resolver (§4.4,
/// §5).
pub struct CachingLineResolver<R: LineResolver> {
    inner: R,
    cache: RefCell<HashMap<(u64, bool), Vec<Option<LineFrame>>>>,
}

impl<R: LineResolver> CachingLineResolver<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, cache: RefCell::new(HashMap::new()) }
    }
}

impl<R: LineResolver> LineResolver for CachingLineResolver<R> {
    fn resolve_line(
        &self,
        address: Address,
        resolve_inline: bool,
    ) -> Result<Vec<Option<LineFrame>>, LineResolverError> {
        let key = (address.as_u64(), resolve_inline);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return Ok(cached.clone());
        }

        let frames = self.inner.resolve_line(address, resolve_inline)?;
        self.cache.borrow_mut().insert(key, frames.clone());
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_function_location_pairs() {
        let text = "handle_request\ncommon/usb_pd_protocol.c:1191\n";
        let frames = parse_addr2line_output(text).unwrap();
        assert_eq!(frames.len(), 1);
        let frame = frames[0].as_ref().unwrap();
        assert_eq!(frame.function_name, "handle_request");
        assert_eq!(frame.line, 1191);
    }

    #[test]
    fn unknown_location_maps_to_none() {
        let text = "??\n??:0\n";
        let frames = parse_addr2line_output(text).unwrap();
        assert_eq!(frames, vec![None]);
    }

    #[test]
    fn odd_line_count_is_malformed() {
        let text = "only_one_line\n";
        assert!(parse_addr2line_output(text).is_err());
    }

    struct CountingResolver {
        calls: RefCell<u32>,
    }

    impl LineResolver for CountingResolver {
        fn resolve_line(
            &self,
            _address: Address,
            _resolve_inline: bool,
        ) -> Result<Vec<Option<LineFrame>>, LineResolverError> {
            *self.calls.borrow_mut() += 1;
            Ok(vec![None])
        }
    }

    #[test]
    fn caches_by_address_and_inline_mode() {
        let resolver = CachingLineResolver::new(CountingResolver { calls: RefCell::new(0) });
        resolver.resolve_line(Address::new(0x10), false).unwrap();
        resolver.resolve_line(Address::new(0x10), false).unwrap();
        resolver.resolve_line(Address::new(0x10), true).unwrap();
        assert_eq!(*resolver.inner.calls.borrow(), 2);
    }
}
