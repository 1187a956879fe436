// Tue Jan 13 2026 - Alex

use crate::annotation::FailedSignature;
use crate::lineres::LineResolver;
use crate::model::{FunctionMap, Task};
use crate::scc::AnalysisResult;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct InlineFrame {
    pub function_name: String,
    pub path: String,
    pub line: u32,
}

fn unknown_frame() -> InlineFrame {
    InlineFrame { function_name: "??".to_string(), path: "??".to_string(), line: 0 }
}

/// What connects two nodes on a task's deepest path: either a real
/// callsite's inline-expansion stack, or a marker that the edge came from
/// an annotation rule (§4.7).
#[derive(Debug, Clone, Serialize)]
pub enum CallEdge {
    Annotation,
    InlineStack { address: u64, frames: Vec<InlineFrame> },
}

fn resolve_inline_stack(
    line_resolver: &dyn LineResolver,
    address: u64,
) -> Result<Vec<InlineFrame>, crate::lineres::LineResolverError> {
    use crate::model::Address;

    let frames = line_resolver.resolve_line(Address::new(address), true)?;
    // Innermost-first from the resolver; the report reads outermost-first.
    Ok(frames
        .into_iter()
        .rev()
        .map(|f| f.map(|lf| InlineFrame { function_name: lf.function_name, path: lf.path, line: lf.line }).unwrap_or_else(unknown_frame))
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct PathNode {
    pub function_name: String,
    pub stack_frame: u64,
    pub path: String,
    pub line: u32,
    pub address: u64,
    pub cyclic: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task_name: String,
    pub routine_stack_usage: u64,
    pub interrupt_extra_stack_frame: u64,
    pub max_size: u64,
    pub declared_stack_size: u32,
    pub nodes: Vec<PathNode>,
    /// One fewer than `nodes`: `edges[i]` connects `nodes[i]` to `nodes[i+1]`.
    pub edges: Vec<CallEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedIndirectGroup {
    pub function_name: String,
    pub callsites: Vec<CallEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedSignatureEntry {
    pub signature: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerReport {
    pub tasks: Vec<TaskReport>,
    pub unresolved_indirects: Vec<UnresolvedIndirectGroup>,
    pub failed_signatures: Vec<FailedSignatureEntry>,
}

/// Walks each task's `stack_successor` chain and collects the unresolved
/// indirect callsites and annotation signatures into a renderable report
/// (§4.7).
pub fn build_report(
    tasks: &[Task],
    functions: &FunctionMap,
    analysis: &AnalysisResult,
    line_resolver: &dyn LineResolver,
    interrupt_extra_stack_frame: u64,
    failed_signatures: Vec<FailedSignature>,
) -> Result<AnalyzerReport, crate::lineres::LineResolverError> {
    use crate::model::Address;

    let mut task_reports = Vec::with_capacity(tasks.len());

    for task in tasks {
        let routine_address = task.routine_address().expect("task routine address resolved before reporting").as_u64();
        let routine_usage = analysis.stack_max_usage(routine_address).unwrap_or(0);

        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut current = Some(routine_address);

        while let Some(addr) = current {
            let function = &functions[&addr];
            let line_info = line_resolver.resolve_line(Address::new(addr), false)?;
            let (path, line) = match line_info.first() {
                Some(Some(frame)) => (frame.path.clone(), frame.line),
                _ => ("??".to_string(), 0),
            };

            nodes.push(PathNode {
                function_name: function.name().to_string(),
                stack_frame: function.stack_frame(),
                path,
                line,
                address: addr,
                cyclic: analysis.is_cyclic(addr),
            });

            let successor = analysis.stack_successor(addr);
            if let Some(succ_addr) = successor {
                let edge_callsite = function
                    .callsites()
                    .iter()
                    .find(|c| c.callee_ref().map(|a| a.as_u64()) == Some(succ_addr));

                let edge = match edge_callsite.and_then(|c| c.site_address()) {
                    None => CallEdge::Annotation,
                    Some(site) => {
                        let frames = resolve_inline_stack(line_resolver, site.as_u64())?;
                        CallEdge::InlineStack { address: site.as_u64(), frames }
                    }
                };
                edges.push(edge);
            }

            current = successor;
        }

        task_reports.push(TaskReport {
            task_name: task.name().to_string(),
            routine_stack_usage: routine_usage,
            interrupt_extra_stack_frame,
            max_size: routine_usage + interrupt_extra_stack_frame,
            declared_stack_size: task.declared_stack_size(),
            nodes,
            edges,
        });
    }

    let mut unresolved_indirects = Vec::new();
    let mut function_addrs: Vec<u64> = functions.keys().copied().collect();
    function_addrs.sort_unstable();
    for addr in function_addrs {
        let function = &functions[&addr];
        let indirect_addresses: Vec<u64> = function
            .callsites()
            .iter()
            .filter(|c| c.is_indirect())
            .filter_map(|c| c.site_address())
            .map(|a| a.as_u64())
            .collect();

        if indirect_addresses.is_empty() {
            continue;
        }

        let mut callsites = Vec::with_capacity(indirect_addresses.len());
        for address in indirect_addresses {
            let frames = resolve_inline_stack(line_resolver, address)?;
            callsites.push(CallEdge::InlineStack { address, frames });
        }
        unresolved_indirects.push(UnresolvedIndirectGroup { function_name: function.name().to_string(), callsites });
    }

    let failed_signatures = failed_signatures
        .into_iter()
        .map(|f| FailedSignatureEntry { signature: f.text, error: f.kind.to_string() })
        .collect();

    Ok(AnalyzerReport { tasks: task_reports, unresolved_indirects, failed_signatures })
}

fn write_call_edge(f: &mut fmt::Formatter<'_>, edge: &CallEdge, prefix: &str) -> fmt::Result {
    match edge {
        CallEdge::Annotation => writeln!(f, "{prefix}-> [annotation]"),
        CallEdge::InlineStack { address, frames } => {
            if frames.is_empty() {
                return writeln!(f, "{prefix}-> ?? {address:x}");
            }
            writeln!(f, "{}-> {}[{}:{}] {:x}", prefix, frames[0].function_name, frames[0].path, frames[0].line, address)?;
            for (depth, frame) in frames[1..].iter().enumerate() {
                writeln!(f, "{}   {}- {}[{}:{}]", prefix, "  ".repeat(depth), frame.function_name, frame.path, frame.line)?;
            }
            Ok(())
        }
    }
}

impl fmt::Display for AnalyzerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for task in &self.tasks {
            writeln!(
                f,
                "Task: {}, Max size: {} ({} + {}), Allocated size: {}",
                task.task_name, task.max_size, task.routine_stack_usage, task.interrupt_extra_stack_frame, task.declared_stack_size
            )?;
            writeln!(f, "Call Trace:")?;
            for (index, node) in task.nodes.iter().enumerate() {
                write!(f, "    {} ({}) [{}:{}] {:x}", node.function_name, node.stack_frame, node.path, node.line, node.address)?;
                if node.cyclic {
                    write!(f, " [cycle]")?;
                }
                writeln!(f)?;
                if let Some(edge) = task.edges.get(index) {
                    write_call_edge(f, edge, "        ")?;
                }
            }
        }

        writeln!(f, "Unresolved indirect callsites:")?;
        for group in &self.unresolved_indirects {
            writeln!(f, "    {}", group.function_name)?;
            for callsite in &group.callsites {
                write_call_edge(f, callsite, "        ")?;
            }
        }

        writeln!(f, "Unresolved annotation signatures:")?;
        for entry in &self.failed_signatures {
            writeln!(f, "    {}: {}", entry.signature, entry.error)?;
        }

        Ok(())
    }
}
