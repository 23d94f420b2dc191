#![forbid(unsafe_code)]

//! Error types for spelunk
//!
//! Every failed navigation or validation step raises [`ConfigError`], the one
//! error callers are expected to handle. [`RegistryError`] signals a
//! misconfigured rule registry and is a programming error rather than a
//! validation outcome.

use crate::types::RuleId;

/// Classification of a configuration violation
///
/// The kind identifies which contract was broken; the rendered message on
/// [`ConfigError`] carries the human-readable context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A node was constructed over an empty or non-mapping value
    EmptyNode,

    /// The root label is not a key of the supplied document
    RootKeyMismatch,

    /// A required key is absent from the working mapping
    KeyNotFound,

    /// `ascend` was called on the root node
    NoParent,

    /// A value failed a string/numeric/sequence/boolean assertion
    TypeMismatch,

    /// A mapping expected to be string-keyed has a non-string key
    NonStringKey,

    /// A value matched none of the supplied candidates
    EnumMismatch,

    /// A present value is empty where emptiness is not allowed
    EmptyValue,
}

/// The single error raised by any failed check or navigation step
///
/// The message is rendered at construction time and already embeds the
/// offending key and, where known, the parent node's label. A caller-supplied
/// message always replaces the generated one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    kind: ErrorKind,
    message: String,
}

impl ConfigError {
    /// Create an error of the given kind with a fully rendered message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The kind of contract violation
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The rendered, human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Rule registry misconfiguration
///
/// Never expected from correct usage of the public constructors; a registry
/// that is missing a builtin rule or registers the same id twice is a bug in
/// the embedding code, not in the document being validated. Ordinary
/// validation logic should not catch this.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Lookup of a rule id that was never registered
    #[error("rule '{0}' is not registered and cannot be dispatched")]
    UnknownRule(RuleId),

    /// Registration under an id that is already taken
    #[error("rule '{0}' is already registered")]
    DuplicateRule(RuleId),
}
