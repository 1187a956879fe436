// Tue Jan 13 2026 - Alex

use clap::Parser;
use std::path::PathBuf;

/// Statically analyze stack usage of a firmware image (§6).
#[derive(Parser, Debug)]
#[command(name = "stack-analyzer", about = "Statically analyze stack usage of an EC firmware image")]
pub struct Args {
    /// Path of the linked firmware ELF.
    pub elf_path: PathBuf,

    /// Path of the export_taskinfo.so utility.
    #[arg(long = "export_taskinfo")]
    pub export_taskinfo: PathBuf,

    /// Which task table section to analyze.
    #[arg(long, value_parser = ["RO", "RW"])]
    pub section: String,

    /// Path of the objdump binary.
    #[arg(long, default_value = "objdump")]
    pub objdump: String,

    /// Path of the addr2line binary.
    #[arg(long, default_value = "addr2line")]
    pub addr2line: String,

    /// Path of the annotation YAML file.
    #[arg(long)]
    pub annotation: Option<PathBuf>,

    /// Logging verbosity.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Suppress all but error-level logging.
    #[arg(long)]
    pub quiet: bool,

    /// Disable colored log output.
    #[arg(long)]
    pub no_color: bool,

    /// Emit the report as JSON in addition to the text trace.
    #[arg(long)]
    pub json: bool,
}
