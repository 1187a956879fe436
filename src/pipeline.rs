// Tue Jan 13 2026 - Alex

use crate::annotation::{apply_annotations, empty_rules, load_rules, resolve_annotation};
use crate::arch::{ArchAnalyzer, ArmAnalyzer};
use crate::disasm::parse_disassembly;
use crate::error::AnalyzerError;
use crate::external::{
    resolve_task_routines, Addr2lineRunner, Disassembler, DlopenTaskTableLoader, ObjdumpRunner, SymbolDumper,
    TaskTableLoader,
};
use crate::lineres::CachingLineResolver;
use crate::model::{Function, FunctionMap};
use crate::report::{build_report, AnalyzerReport};
use crate::scc;
use crate::symtab::{parse_symbol_text, SymbolTable};
use crate::ui::Config;
use crate::utils::ScopedTimer;

/// Size of the extra stack frame an interrupt adds on top of a task
/// routine's own worst-case depth (documented value for Cortex-M with FPU,
/// §4.7). Additive on task-routine depth only.
pub const INTERRUPT_EXTRA_STACK_FRAME: u64 = 224;

/// Runs the full C1-C7 pipeline against a validated configuration.
pub fn run(config: &Config) -> Result<AnalyzerReport, AnalyzerError> {
    let objdump = ObjdumpRunner::new(config.objdump_path.clone());

    let symtab = {
        let _timer = ScopedTimer::new("symbol-dump");
        let symbol_text = objdump.dump_symbols(&config.elf_path)?;
        SymbolTable::new(parse_symbol_text(&symbol_text))
    };

    let mut functions: FunctionMap = {
        let _timer = ScopedTimer::new("disassemble");
        let disasm_text = objdump.disassemble(&config.elf_path)?;
        let parsed = parse_disassembly(&disasm_text, &symtab)?;

        let _timer = ScopedTimer::new("arch-analyze");
        let analyzer = ArmAnalyzer;
        let mut functions = FunctionMap::new();
        for (symbol, instructions) in parsed {
            let (stack_frame, callsites) = analyzer.analyze_function(symbol, &instructions)?;
            functions.insert(
                symbol.address().as_u64(),
                Function::new(symbol.address(), symbol.name().to_string(), stack_frame, callsites),
            );
        }
        functions
    };

    {
        let _timer = ScopedTimer::new("call-graph-link");
        crate::callgraph::link_callsites(&mut functions);
    }

    let line_resolver =
        CachingLineResolver::new(Addr2lineRunner::new(config.addr2line_path.clone(), config.elf_path.clone()));

    let rules = match &config.annotation_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            load_rules(&text)?
        }
        None => empty_rules(),
    };

    let resolved = {
        let _timer = ScopedTimer::new("annotation-resolve");
        resolve_annotation(&rules, &functions, &symtab, &line_resolver)?
    };

    {
        let _timer = ScopedTimer::new("graph-rewrite");
        apply_annotations(&mut functions, &resolved);
    }

    let analysis = {
        let _timer = ScopedTimer::new("scc-max-stack");
        scc::analyze(&functions)
    };

    let tasks = {
        let _timer = ScopedTimer::new("task-table-load");
        let loader = DlopenTaskTableLoader::open(&config.export_taskinfo_path.to_string_lossy())?;
        let raw_tasks = loader.load_task_table(config.section)?;
        resolve_task_routines(raw_tasks, &symtab)?
    };

    let _timer = ScopedTimer::new("report-build");
    let report = build_report(
        &tasks,
        &functions,
        &analysis,
        &line_resolver,
        INTERRUPT_EXTRA_STACK_FRAME,
        resolved.failed_signatures,
    )?;

    Ok(report)
}
