// Tue Jan 13 2026 - Alex

use crate::model::FunctionMap;
use std::collections::HashMap;

/// Per-function results of the SCC + max-stack pass (§4.6), kept outside
/// `Function` in a side table keyed by address rather than mutated onto the
/// function record.
#[derive(Debug, Clone)]
pub struct StackAnalysis {
    pub stack_max_usage: u64,
    pub stack_successor: Option<u64>,
    pub cycle_index: usize,
}

/// Result of running Tarjan SCC + max-stack analysis over a function map.
pub struct AnalysisResult {
    analyses: HashMap<u64, StackAnalysis>,
    cycle_groups: Vec<Vec<u64>>,
}

impl AnalysisResult {
    pub fn get(&self, address: u64) -> Option<&StackAnalysis> {
        self.analyses.get(&address)
    }

    pub fn stack_max_usage(&self, address: u64) -> Option<u64> {
        self.analyses.get(&address).map(|a| a.stack_max_usage)
    }

    pub fn stack_successor(&self, address: u64) -> Option<u64> {
        self.analyses.get(&address).and_then(|a| a.stack_successor)
    }

    /// A function is in a cycle iff its SCC group has more than zero
    /// recorded members (a lone self-looping function still counts).
    pub fn is_cyclic(&self, address: u64) -> bool {
        self.analyses
            .get(&address)
            .map(|a| !self.cycle_groups[a.cycle_index].is_empty())
            .unwrap_or(false)
    }

    pub fn cycle_group(&self, address: u64) -> &[u64] {
        match self.analyses.get(&address) {
            Some(a) => &self.cycle_groups[a.cycle_index],
            None => &[],
        }
    }
}

struct NodeState {
    index: usize,
    lowlink: usize,
    onstack: bool,
}

struct Frame {
    addr: u64,
    callsite_idx: usize,
    max_stack_usage: u64,
    max_callee: Option<u64>,
    self_loop: bool,
    /// Callsite index whose callee is the frame currently above this one on
    /// the work stack; consumed when that child frame finalizes.
    pending: Option<usize>,
}

impl Frame {
    fn new(addr: u64, stack_frame: u64) -> Self {
        Self { addr, callsite_idx: 0, max_stack_usage: stack_frame, max_callee: None, self_loop: false, pending: None }
    }
}

/// Iterative Tarjan SCC over the resolved callee graph, folding in the
/// longest-stack-path computation in the same DFS (§4.6). Iterative so the
/// traversal depth of a deep call graph can't overflow the host stack.
pub fn analyze(functions: &FunctionMap) -> AnalysisResult {
    let mut states: HashMap<u64, NodeState> = HashMap::with_capacity(functions.len());
    let mut analyses: HashMap<u64, StackAnalysis> = HashMap::with_capacity(functions.len());
    let mut cycle_groups: Vec<Vec<u64>> = Vec::new();
    let mut scc_stack: Vec<u64> = Vec::new();
    let mut counter = 0usize;

    let mut addrs: Vec<u64> = functions.keys().copied().collect();
    addrs.sort_unstable();

    for start in addrs {
        if states.contains_key(&start) {
            continue;
        }

        let mut work: Vec<Frame> = Vec::new();
        push_node(&mut states, &mut scc_stack, &mut counter, start);
        work.push(Frame::new(start, functions[&start].stack_frame()));

        while let Some(top) = work.last_mut() {
            if let Some(pending_idx) = top.pending.take() {
                let addr = top.addr;
                let function = &functions[&addr];
                let callsite = &function.callsites()[pending_idx];
                let callee_addr = callsite.callee_ref().expect("pending callsite always has a callee").as_u64();

                let callee_lowlink = states[&callee_addr].lowlink;
                let cur_lowlink = states[&addr].lowlink;
                states.get_mut(&addr).unwrap().lowlink = cur_lowlink.min(callee_lowlink);

                fold_stack_cost(top, function.stack_frame(), callsite.is_tail(), callee_addr, &analyses);
                continue;
            }

            let addr = top.addr;
            let function = &functions[&addr];

            if top.callsite_idx < function.callsites().len() {
                let idx = top.callsite_idx;
                top.callsite_idx += 1;
                let callsite = &function.callsites()[idx];

                let Some(callee_addr) = callsite.callee_ref().map(|a| a.as_u64()) else { continue };

                if !states.contains_key(&callee_addr) {
                    top.pending = Some(idx);
                    push_node(&mut states, &mut scc_stack, &mut counter, callee_addr);
                    work.push(Frame::new(callee_addr, functions[&callee_addr].stack_frame()));
                } else {
                    if states[&callee_addr].onstack {
                        let callee_index = states[&callee_addr].index;
                        let cur_lowlink = states[&addr].lowlink;
                        states.get_mut(&addr).unwrap().lowlink = cur_lowlink.min(callee_index);
                        if callee_addr == addr {
                            top.self_loop = true;
                        }
                    }
                    fold_stack_cost(top, function.stack_frame(), callsite.is_tail(), callee_addr, &analyses);
                }
            } else {
                let frame = work.pop().unwrap();
                let node_index = states[&frame.addr].index;
                let node_lowlink = states[&frame.addr].lowlink;

                analyses.insert(
                    frame.addr,
                    StackAnalysis {
                        stack_max_usage: frame.max_stack_usage,
                        stack_successor: frame.max_callee,
                        cycle_index: usize::MAX,
                    },
                );

                if node_lowlink == node_index {
                    let mut group = Vec::new();
                    loop {
                        let popped = scc_stack.pop().expect("SCC root must still be on the stack");
                        states.get_mut(&popped).unwrap().onstack = false;
                        if popped == frame.addr {
                            break;
                        }
                        group.push(popped);
                    }

                    let group_index = cycle_groups.len();
                    for &member in &group {
                        analyses.get_mut(&member).unwrap().cycle_index = group_index;
                    }
                    analyses.get_mut(&frame.addr).unwrap().cycle_index = group_index;

                    let is_cyclic = !group.is_empty() || frame.self_loop;
                    if is_cyclic {
                        group.push(frame.addr);
                    }
                    cycle_groups.push(group);
                }
            }
        }
    }

    AnalysisResult { analyses, cycle_groups }
}

fn push_node(states: &mut HashMap<u64, NodeState>, scc_stack: &mut Vec<u64>, counter: &mut usize, addr: u64) {
    states.insert(addr, NodeState { index: *counter, lowlink: *counter, onstack: true });
    *counter += 1;
    scc_stack.push(addr);
}

/// Folds a resolved callee's stack usage into the caller frame's running
/// max, applying the tail-vs-non-tail accounting rule (§4.6). No-op if the
/// callee hasn't been finalized yet (still on the DFS stack).
fn fold_stack_cost(
    frame: &mut Frame,
    caller_stack_frame: u64,
    is_tail: bool,
    callee_addr: u64,
    analyses: &HashMap<u64, StackAnalysis>,
) {
    let Some(callee_analysis) = analyses.get(&callee_addr) else { return };
    let candidate = if is_tail {
        caller_stack_frame.max(callee_analysis.stack_max_usage)
    } else {
        caller_stack_frame + callee_analysis.stack_max_usage
    };
    if candidate > frame.max_stack_usage {
        frame.max_stack_usage = candidate;
        frame.max_callee = Some(callee_addr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, Callsite, Function};

    fn linked(addr: u64, name: &str, frame: u64, callees: &[(u64, bool)]) -> Function {
        let callsites = callees
            .iter()
            .map(|&(callee, is_tail)| {
                let mut c = Callsite::new(Some(Address::new(addr + 4)), Some(Address::new(callee)), is_tail);
                c.set_callee_ref(Some(Address::new(callee)));
                c
            })
            .collect();
        Function::new(Address::new(addr), name.to_string(), frame, callsites)
    }

    #[test]
    fn single_leaf_function() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "leaf", 24, &[]));

        let result = analyze(&functions);
        assert_eq!(result.stack_max_usage(0x1000), Some(24));
        assert_eq!(result.stack_successor(0x1000), None);
        assert!(!result.is_cyclic(0x1000));
    }

    #[test]
    fn linear_chain_sums_non_tail_calls() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "a", 16, &[(0x2000, false)]));
        functions.insert(0x2000, linked(0x2000, "b", 32, &[(0x3000, false)]));
        functions.insert(0x3000, linked(0x3000, "c", 8, &[]));

        let result = analyze(&functions);
        assert_eq!(result.stack_max_usage(0x1000), Some(56));
        assert_eq!(result.stack_successor(0x1000), Some(0x2000));
        assert_eq!(result.stack_max_usage(0x2000), Some(40));
        assert_eq!(result.stack_max_usage(0x3000), Some(8));
    }

    #[test]
    fn tail_call_takes_the_larger_frame() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "a", 16, &[(0x2000, true)]));
        functions.insert(0x2000, linked(0x2000, "b", 64, &[]));

        let result = analyze(&functions);
        assert_eq!(result.stack_max_usage(0x1000), Some(64));
        assert_eq!(result.stack_successor(0x1000), Some(0x2000));
    }

    #[test]
    fn self_loop_is_flagged_cyclic() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "a", 16, &[(0x1000, false)]));

        let result = analyze(&functions);
        assert!(result.is_cyclic(0x1000));
        assert_eq!(result.cycle_group(0x1000), &[0x1000]);
    }

    #[test]
    fn mutual_recursion_is_one_cycle_group() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "a", 16, &[(0x2000, false)]));
        functions.insert(0x2000, linked(0x2000, "b", 8, &[(0x1000, false)]));

        let result = analyze(&functions);
        assert!(result.is_cyclic(0x1000));
        assert!(result.is_cyclic(0x2000));
        assert_eq!(result.cycle_group(0x1000).len(), 2);
    }

    #[test]
    fn tie_break_prefers_first_callsite_in_order() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, linked(0x1000, "a", 0, &[(0x2000, false), (0x3000, false)]));
        functions.insert(0x2000, linked(0x2000, "b", 10, &[]));
        functions.insert(0x3000, linked(0x3000, "c", 10, &[]));

        let result = analyze(&functions);
        assert_eq!(result.stack_successor(0x1000), Some(0x2000));
    }
}
