#![forbid(unsafe_code)]

//! spelunk: fluent navigation and validation for nested configuration data
//!
//! A [`Node`] is a cursor over an already-decoded configuration document
//! (YAML, JSON, anything that decodes to a tree of mappings and scalars).
//! Chained calls descend into sub-documents, assert per-key constraints, and
//! stop at the first violation with a context-qualified [`ConfigError`].
//!
//! ```
//! use spelunk::{Node, Value};
//!
//! let document = serde_yaml::from_str(
//!     "database:\n  driver: postgres\n  port: 5432\n  replicas: [r1, r2]",
//! ).unwrap();
//!
//! Node::root("database", document)?
//!     .descend("database")?
//!     .is_one_of("driver", &[Value::from("postgres"), Value::from("mysql")])?
//!     .is_numeric("port")?
//!     .is_sequence_if_exists("replicas")?
//!     .ascend()?;
//! # Ok::<(), spelunk::ConfigError>(())
//! ```
//!
//! Checks are dispatched through a [`RuleRegistry`] of named, stateless
//! [`Rule`] implementations; embedding code can register additional rules
//! without touching the cursor.

pub mod document;
pub mod error;
pub mod node;
pub mod rules;
pub mod types;

// Re-export the document model for convenient access
pub use document::{Mapping, Number, Value};

// Re-export error types for convenient access
pub use error::{ConfigError, ErrorKind, RegistryError};

// Re-export the cursor and rule machinery
pub use node::{Child, Node};
pub use rules::{Rule, RuleRegistry};
pub use types::RuleId;
