// Tue Jan 13 2026 - Alex

use crate::lineres::{parse_addr2line_output, LineFrame, LineResolver, LineResolverError};
use crate::model::Address;
use std::path::PathBuf;
use std::process::Command;

/// Shells out to a real `addr2line` binary, one invocation per
/// `resolve_line` call (callers are expected to wrap this in
/// `CachingLineResolver`) (§5, §6).
pub struct Addr2lineRunner {
    addr2line_path: String,
    elf_path: PathBuf,
}

impl Addr2lineRunner {
    pub fn new(addr2line_path: impl Into<String>, elf_path: PathBuf) -> Self {
        Self { addr2line_path: addr2line_path.into(), elf_path }
    }
}

impl LineResolver for Addr2lineRunner {
    fn resolve_line(
        &self,
        address: Address,
        resolve_inline: bool,
    ) -> Result<Vec<Option<LineFrame>>, LineResolverError> {
        let mut command = Command::new(&self.addr2line_path);
        command.arg("-f").arg("-e").arg(&self.elf_path).arg(format!("{:x}", address.as_u64()));
        if resolve_inline {
            command.arg("-i");
        }

        let output = command.output()?;
        if !output.status.success() {
            return Err(LineResolverError::ResolveFailed);
        }

        parse_addr2line_output(&String::from_utf8_lossy(&output.stdout))
    }
}
