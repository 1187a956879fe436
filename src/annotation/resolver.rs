// Tue Jan 13 2026 - Alex

use crate::annotation::rules::AnnotationRules;
use crate::annotation::signature_normalizer::strip_prefix_name;
use crate::lineres::{LineResolver, LineResolverError};
use crate::model::{Address, FunctionMap, Signature};
use crate::symtab::SymbolTable;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationErrorKind {
    Invalid,
    NotFound,
    Ambiguous,
}

impl fmt::Display for AnnotationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnnotationErrorKind::Invalid => "invalid signature",
            AnnotationErrorKind::NotFound => "function is not found",
            AnnotationErrorKind::Ambiguous => "signature is ambiguous",
        })
    }
}

#[derive(Debug, Clone)]
pub struct FailedSignature {
    pub text: String,
    pub kind: AnnotationErrorKind,
}

/// Output of the annotation resolver (§4.4): edges to add, functions to
/// drop, indirect callsites eliminated by a matching annotation, and every
/// signature that failed to resolve.
#[derive(Debug, Default)]
pub struct ResolvedAnnotation {
    pub add_set: HashSet<(u64, u64)>,
    pub remove_set: HashSet<u64>,
    pub eliminated_addrs: HashSet<u64>,
    pub failed_signatures: Vec<FailedSignature>,
}

/// Resolves every signature referenced in `signature_set` to the functions
/// it names, grouping same-named static duplicates by declaration path
/// (§4.4 steps 1-3).
fn map_annotation(
    functions: &FunctionMap,
    symtab: &SymbolTable,
    line_resolver: &dyn LineResolver,
    signature_set: &HashSet<Signature>,
) -> Result<(HashMap<Signature, Vec<u64>>, HashMap<Signature, AnnotationErrorKind>), LineResolverError> {
    let mut symbol_map: HashMap<String, HashSet<u64>> = HashMap::new();
    for symbol in symtab.functions() {
        if !functions.contains_key(&symbol.address().as_u64()) {
            continue;
        }
        if let Some(name) = strip_prefix_name(symbol.name()) {
            symbol_map.entry(name).or_default().insert(symbol.address().as_u64());
        }
    }

    let mut signature_map = HashMap::new();
    let mut sig_error_map = HashMap::new();
    let mut path_group_cache: HashMap<String, HashMap<String, Vec<u64>>> = HashMap::new();

    for sig in signature_set {
        let Some(candidates) = symbol_map.get(sig.name()) else {
            sig_error_map.insert(sig.clone(), AnnotationErrorKind::NotFound);
            continue;
        };

        if !path_group_cache.contains_key(sig.name()) {
            let mut group_map: HashMap<String, Vec<u64>> = HashMap::new();
            for &addr in candidates {
                let frames = line_resolver.resolve_line(Address::new(addr), false)?;
                let Some(Some(frame)) = frames.first() else { continue };
                group_map.entry(frame.path.clone()).or_default().push(addr);
            }
            path_group_cache.insert(sig.name().to_string(), group_map);
        }
        let group_map = &path_group_cache[sig.name()];

        let function_group: Option<&Vec<u64>> = if group_map.is_empty() {
            None
        } else if let Some(path) = sig.path() {
            group_map.get(path)
        } else if group_map.len() > 1 {
            sig_error_map.insert(sig.clone(), AnnotationErrorKind::Ambiguous);
            continue;
        } else {
            group_map.values().next()
        };

        match function_group {
            Some(group) => {
                signature_map.insert(sig.clone(), group.clone());
            }
            None => {
                sig_error_map.insert(sig.clone(), AnnotationErrorKind::NotFound);
            }
        }
    }

    Ok((signature_map, sig_error_map))
}

/// Resolves annotation rules against the call graph (§4.4): missing call
/// edges to add, functions to drop, and the indirect callsites an add-rule
/// source signature eliminates by matching into the inline stack.
pub fn resolve_annotation(
    rules: &AnnotationRules,
    functions: &FunctionMap,
    symtab: &SymbolTable,
    line_resolver: &dyn LineResolver,
) -> Result<ResolvedAnnotation, LineResolverError> {
    let mut signature_set: HashSet<Signature> = rules.remove_rules.clone();
    for (src, dsts) in &rules.add_rules {
        signature_set.insert(src.clone());
        signature_set.extend(dsts.iter().cloned());
    }

    let (signature_map, mut sig_error_map) =
        map_annotation(functions, symtab, line_resolver, &signature_set)?;

    let mut indirect_map: HashMap<Signature, HashSet<(u64, u64)>> = HashMap::new();
    for (&function_addr, function) in functions.iter() {
        for callsite in function.callsites() {
            if callsite.target_address().is_some() {
                continue;
            }
            let Some(site) = callsite.site_address() else { continue };

            let frames = line_resolver.resolve_line(site, false)?;
            let Some(Some(frame)) = frames.first() else { continue };
            let Some(name) = strip_prefix_name(&frame.function_name) else { continue };

            let sig = Signature::new(name, Some(frame.path.clone()), Some(frame.line));
            indirect_map.entry(sig).or_default().insert((function_addr, site.as_u64()));
        }
    }

    let mut add_set = HashSet::new();
    let mut remove_set = HashSet::new();
    let mut eliminated_addrs = HashSet::new();

    for (src_sig, dst_sigs) in &rules.add_rules {
        let mut src_funcs: HashSet<u64> =
            signature_map.get(src_sig).cloned().unwrap_or_default().into_iter().collect();

        if let Some(indirect_calls) = indirect_map.get(src_sig) {
            for &(function_addr, callsite_addr) in indirect_calls {
                src_funcs.insert(function_addr);
                eliminated_addrs.insert(callsite_addr);
            }
            // A signature found via the inline stack can't have been
            // ambiguous: ambiguity only arises from a path-less lookup
            // against multiple declaration sites, and this key is always
            // fully qualified with path and line.
            sig_error_map.remove(src_sig);
        }

        for dst_sig in dst_sigs {
            let Some(dst_funcs) = signature_map.get(dst_sig) else { continue };
            for &src_func in &src_funcs {
                for &dst_func in dst_funcs {
                    add_set.insert((src_func, dst_func));
                }
            }
        }
    }

    for remove_sig in &rules.remove_rules {
        if let Some(funcs) = signature_map.get(remove_sig) {
            remove_set.extend(funcs.iter().copied());
        }
    }

    let mut failed_signatures: Vec<FailedSignature> = rules
        .invalid_signatures
        .iter()
        .cloned()
        .map(|text| FailedSignature { text, kind: AnnotationErrorKind::Invalid })
        .collect();
    for (sig, kind) in sig_error_map {
        failed_signatures.push(FailedSignature { text: sig.to_string(), kind });
    }

    Ok(ResolvedAnnotation { add_set, remove_set, eliminated_addrs, failed_signatures })
}
