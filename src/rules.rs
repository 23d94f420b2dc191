#![forbid(unsafe_code)]

//! Validation rules: the trait, the builtin set, and the registry

pub mod builtin;
pub mod registry;
pub mod rule;

pub use registry::RuleRegistry;
pub use rule::{Rule, require_key};
