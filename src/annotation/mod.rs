// Tue Jan 13 2026 - Alex

pub mod error;
pub mod resolver;
pub mod rewriter;
pub mod rules;
pub mod signature_normalizer;

pub use error::AnnotationError;
pub use resolver::{resolve_annotation, AnnotationErrorKind, FailedSignature, ResolvedAnnotation};
pub use rewriter::apply_annotations;
pub use rules::{empty_rules, load_rules, AnnotationRules};
