#![forbid(unsafe_code)]

//! Core Rule trait shared by all validators

use crate::document::{Mapping, contains_key};
use crate::error::{ConfigError, ErrorKind};
use crate::types::RuleId;

/// Trait that all validation rules must implement
///
/// A rule is a stateless predicate over a `(key, container)` pair plus a
/// message formatter. Rules never mutate anything and hold no state of their
/// own; the same instance is dispatched for every check of its kind. The
/// trait is `Send + Sync` so a registry can be shared across threads.
pub trait Rule: Send + Sync {
    /// Returns the unique identifier for this rule
    fn id(&self) -> &RuleId;

    /// Validates `key` within `container`
    ///
    /// `parent` is the label of the node that owns `container`; when present
    /// it is embedded in the generated message. A caller-supplied `message`
    /// replaces the generated one entirely.
    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError>;
}

/// Shared key-existence check used by rules that require the key up front
///
/// Fails with [`ErrorKind::KeyNotFound`], qualifying the message with the
/// parent label when one is known.
pub fn require_key(
    key: &str,
    container: &Mapping,
    parent: Option<&str>,
    message: Option<&str>,
) -> Result<(), ConfigError> {
    if contains_key(container, key) {
        return Ok(());
    }

    if let Some(message) = message {
        return Err(ConfigError::new(ErrorKind::KeyNotFound, message));
    }

    let rendered = match parent {
        Some(parent) => format!(
            "invalid configuration: '{key}' does not exist for parent node '{parent}'"
        ),
        None => format!("invalid configuration: '{key}' does not exist"),
    };

    Err(ConfigError::new(ErrorKind::KeyNotFound, rendered))
}
