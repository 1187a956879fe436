// Tue Jan 13 2026 - Alex

use crate::annotation::resolver::ResolvedAnnotation;
use crate::model::{Address, Callsite, FunctionMap};

/// Rewrites the call graph per the resolved annotations (§4.5): adds the
/// missing edges, then drops callsites to removed functions and indirect
/// callsites an add-rule already accounted for.
///
/// Idempotent: run again from the same pre-annotation graph and resolved
/// set, the result is byte-identical.
pub fn apply_annotations(functions: &mut FunctionMap, resolved: &ResolvedAnnotation) {
    for &(src, dst) in &resolved.add_set {
        if let Some(src_func) = functions.get_mut(&src) {
            // Tail-call annotations aren't supported yet.
            let mut callsite = Callsite::new(None, Some(Address::new(dst)), false);
            callsite.set_callee_ref(Some(Address::new(dst)));
            src_func.callsites_mut().push(callsite);
        }
    }

    for function in functions.values_mut() {
        let cleaned = function
            .callsites()
            .iter()
            .filter(|callsite| {
                if let Some(callee) = callsite.callee_ref() {
                    if resolved.remove_set.contains(&callee.as_u64()) {
                        return false;
                    }
                }
                if callsite.is_indirect() {
                    if let Some(site) = callsite.site_address() {
                        if resolved.eliminated_addrs.contains(&site.as_u64()) {
                            return false;
                        }
                    }
                }
                true
            })
            .cloned()
            .collect();
        *function.callsites_mut() = cleaned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Function;
    use std::collections::HashSet;

    #[test]
    fn adds_edge_and_removes_dropped_function_callsites() {
        let mut functions = FunctionMap::new();
        functions.insert(0x1000, Function::new(Address::new(0x1000), "src".to_string(), 0, vec![]));
        functions.insert(0x2000, Function::new(Address::new(0x2000), "dst".to_string(), 0, vec![]));
        functions.insert(
            0x3000,
            Function::new(
                Address::new(0x3000),
                "other".to_string(),
                0,
                vec![{
                    let mut c = Callsite::new(Some(Address::new(0x3004)), Some(Address::new(0x2000)), false);
                    c.set_callee_ref(Some(Address::new(0x2000)));
                    c
                }],
            ),
        );

        let mut resolved = ResolvedAnnotation::default();
        resolved.add_set.insert((0x1000, 0x2000));
        resolved.remove_set.insert(0x2000);
        let _ = HashSet::<u64>::new();

        apply_annotations(&mut functions, &resolved);

        // The edge was added, then immediately pruned because 0x2000 is removed.
        assert!(functions[&0x1000].callsites().is_empty());
        assert!(functions[&0x3000].callsites().is_empty());
    }
}
