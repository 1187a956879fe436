// Tue Jan 13 2026 - Alex

use crate::model::TaskSection;
use crate::ui::args::Args;
use std::path::PathBuf;
use std::str::FromStr;

/// Validated configuration derived from `Args` (§9's configuration note).
/// `validate()` checks everything that would otherwise surface as a
/// confusing failure deep inside the pipeline, before any subprocess runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub elf_path: PathBuf,
    pub section: TaskSection,
    pub export_taskinfo_path: PathBuf,
    pub objdump_path: String,
    pub addr2line_path: String,
    pub annotation_path: Option<PathBuf>,
    pub log_level: String,
    pub quiet: bool,
    pub no_color: bool,
    pub json: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, String> {
        let section = TaskSection::from_str(&args.section)?;
        Ok(Self {
            elf_path: args.elf_path,
            section,
            export_taskinfo_path: args.export_taskinfo,
            objdump_path: args.objdump,
            addr2line_path: args.addr2line,
            annotation_path: args.annotation,
            log_level: args.log_level,
            quiet: args.quiet,
            no_color: args.no_color,
            json: args.json,
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.elf_path.exists() {
            return Err(format!("ELF path does not exist: {}", self.elf_path.display()));
        }
        if !self.export_taskinfo_path.exists() {
            return Err(format!("export_taskinfo path does not exist: {}", self.export_taskinfo_path.display()));
        }
        if let Some(path) = &self.annotation_path {
            if !path.exists() {
                return Err(format!("annotation file does not exist: {}", path.display()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(elf: &str) -> Args {
        Args {
            elf_path: PathBuf::from(elf),
            export_taskinfo: PathBuf::from("/nonexistent/export_taskinfo.so"),
            section: "RW".to_string(),
            objdump: "objdump".to_string(),
            addr2line: "addr2line".to_string(),
            annotation: None,
            log_level: "info".to_string(),
            quiet: false,
            no_color: false,
            json: false,
        }
    }

    #[test]
    fn rejects_missing_elf_path() {
        let config = Config::from_args(args_for("/nonexistent/firmware.elf")).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_section() {
        let mut args = args_for("/nonexistent/firmware.elf");
        args.section = "XX".to_string();
        assert!(Config::from_args(args).is_err());
    }
}
