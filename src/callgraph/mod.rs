// Tue Jan 13 2026 - Alex

use crate::model::FunctionMap;

/// Resolves every callsite's `callee_ref` against the function map (§4.3).
///
/// A callsite whose target doesn't correspond to a registered function (a
/// veneer, library stub, or stripped symbol) is left unresolved — this
/// never errors.
pub fn link_callsites(functions: &mut FunctionMap) {
    let addresses: Vec<u64> = functions.keys().copied().collect();

    for address in addresses {
        let targets: Vec<Option<u64>> = functions[&address]
            .callsites()
            .iter()
            .map(|c| c.target_address().map(|a| a.as_u64()))
            .collect();

        let resolved: Vec<Option<u64>> = targets
            .into_iter()
            .map(|target| target.filter(|t| functions.contains_key(t)))
            .collect();

        let function = functions.get_mut(&address).unwrap();
        for (callsite, resolved_target) in function.callsites_mut().iter_mut().zip(resolved) {
            callsite.set_callee_ref(resolved_target.map(crate::model::Address::new));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, Callsite, Function};
    use std::collections::HashMap;

    #[test]
    fn resolves_known_target_and_leaves_unknown_alone() {
        let mut functions = HashMap::new();
        functions.insert(
            0x1000,
            Function::new(
                Address::new(0x1000),
                "caller".to_string(),
                0,
                vec![
                    Callsite::new(Some(Address::new(0x1004)), Some(Address::new(0x2000)), false),
                    Callsite::new(Some(Address::new(0x1008)), Some(Address::new(0x9999)), false),
                ],
            ),
        );
        functions.insert(0x2000, Function::new(Address::new(0x2000), "callee".to_string(), 0, vec![]));

        link_callsites(&mut functions);

        let caller = &functions[&0x1000];
        assert_eq!(caller.callsites()[0].callee_ref(), Some(Address::new(0x2000)));
        assert_eq!(caller.callsites()[1].callee_ref(), None);
    }
}
