// Tue Jan 13 2026 - Alex

use crate::annotation::error::AnnotationError;
use crate::annotation::signature_normalizer::normalize_signature;
use crate::model::Signature;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Deserialize, Default)]
struct RawAnnotation {
    #[serde(default)]
    add: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    remove: Option<Vec<String>>,
}

/// Add/remove rules keyed by normalized `Signature` (§4.4), plus whatever
/// raw signature text failed to parse.
#[derive(Debug, Default)]
pub struct AnnotationRules {
    pub add_rules: HashMap<Signature, HashSet<Signature>>,
    pub remove_rules: HashSet<Signature>,
    pub invalid_signatures: HashSet<String>,
}

/// Parses the YAML annotation file text into `AnnotationRules`. Malformed
/// YAML or a non-mapping top level is fatal (§7); a signature that fails to
/// parse is collected, not fatal.
pub fn load_rules(text: &str) -> Result<AnnotationRules, AnnotationError> {
    let raw: serde_yaml::Value = serde_yaml::from_str(text)?;
    if !raw.is_mapping() && !raw.is_null() {
        return Err(AnnotationError::NotAMapping);
    }
    let raw: RawAnnotation = serde_yaml::from_value(raw)?;

    let mut rules = AnnotationRules::default();

    if let Some(add) = raw.add {
        for (src_text, dst_texts) in add {
            let Some(src_sig) = normalize_signature(&src_text) else {
                rules.invalid_signatures.insert(src_text);
                continue;
            };

            let entry = rules.add_rules.entry(src_sig).or_default();
            for dst_text in dst_texts {
                match normalize_signature(&dst_text) {
                    Some(dst_sig) => {
                        entry.insert(dst_sig);
                    }
                    None => {
                        rules.invalid_signatures.insert(dst_text);
                    }
                }
            }
        }
    }

    if let Some(remove) = raw.remove {
        for remove_text in remove {
            match normalize_signature(&remove_text) {
                Some(remove_sig) => {
                    rules.remove_rules.insert(remove_sig);
                }
                None => {
                    rules.invalid_signatures.insert(remove_text);
                }
            }
        }
    }

    Ok(rules)
}

/// No annotation file was supplied: an empty rule set (§6 — both keys
/// optional, missing values equal empty).
pub fn empty_rules() -> AnnotationRules {
    AnnotationRules::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_add_and_remove_rules() {
        let text = "\
add:
  \"source_fn\": [\"dest_fn\"]
remove:
  - \"dead_fn\"
";
        let rules = load_rules(text).unwrap();
        assert_eq!(rules.add_rules.len(), 1);
        assert_eq!(rules.remove_rules.len(), 1);
        assert!(rules.invalid_signatures.is_empty());
    }

    #[test]
    fn missing_keys_are_empty() {
        let rules = load_rules("{}").unwrap();
        assert!(rules.add_rules.is_empty());
        assert!(rules.remove_rules.is_empty());
    }

    #[test]
    fn non_mapping_top_level_is_rejected() {
        assert!(load_rules("- just\n- a\n- list\n").is_err());
    }
}
