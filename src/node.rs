#![forbid(unsafe_code)]

//! The navigation cursor
//!
//! A [`Node`] stands on one mapping of a decoded configuration document and
//! exposes the full chainable API: descend into sub-documents, ascend back
//! out, and assert per-key constraints along the way. Every fallible method
//! consumes the cursor and returns either the next cursor or a
//! [`ConfigError`], so a chain stops at the first violation with no invalid
//! state left behind.
//!
//! ```
//! use spelunk::Node;
//!
//! let document = serde_yaml::from_str(
//!     "configuration:\n  host: localhost\n  persistent: true",
//! ).unwrap();
//!
//! Node::root("configuration", document)?
//!     .descend("configuration")?
//!     .is_string("host")?
//!     .is_boolean_if_exists("persistent")?;
//! # Ok::<(), spelunk::ConfigError>(())
//! ```

use crate::document::{
    Mapping, Value, collection_contains, display_value, entry,
};
use crate::error::{ConfigError, ErrorKind};
use crate::rules::builtin::ids;
use crate::rules::builtin::rule_id;
use crate::rules::registry::RuleRegistry;
use crate::rules::rule::require_key;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Validation mode of a cursor
///
/// A cursor is Active until a `descend_if_exists` misses, which flips it to
/// Suppressed; the next `ascend` flips it back. While Suppressed, every
/// fallible operation is a no-op returning the cursor unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Active,
    Suppressed,
}

/// Value handed to a [`Node::for_each_child`] callback
///
/// Mapping-valued children arrive as freshly constructed cursors; everything
/// else arrives as the raw value.
pub enum Child<'a> {
    /// A scalar or sequence child value
    Value(&'a Value),
    /// A mapping child, wrapped in its own cursor
    Node(Node),
}

/// The traversal-and-validation cursor over a subtree of a document
///
/// Created by the caller at the root and by [`descend`](Node::descend) for
/// sub-documents. The parent link is owned: descending moves the current
/// cursor into the child, ascending moves it back out, so ancestor chains
/// live exactly as long as the traversal that built them.
///
/// Check methods dispatch to the rule registry captured at construction. The
/// registry must contain the builtin rule set; the public constructors
/// guarantee this for [`RuleRegistry::builtin`]-derived registries, and
/// dispatch panics on a registry stripped of builtin rules (a programming
/// error, not a validation outcome).
pub struct Node {
    name: String,
    value: Mapping,
    parent: Option<Box<Node>>,
    mode: Mode,
    registry: Arc<RuleRegistry>,
}

impl Node {
    /// Construct a root cursor over a decoded document, using the shared
    /// default registry
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::EmptyNode`] when the document is not a
    /// non-empty mapping, and with [`ErrorKind::RootKeyMismatch`] when
    /// `name` is not one of the document's keys.
    pub fn root(name: impl Into<String>, document: Value) -> Result<Self, ConfigError> {
        Self::with_registry(name, document, RuleRegistry::shared())
    }

    /// Construct a root cursor with an explicit rule registry
    ///
    /// The registry is captured by this node and shared with every cursor
    /// derived from it. Supplying a registry without the builtin rules makes
    /// later check dispatch panic.
    pub fn with_registry(
        name: impl Into<String>,
        document: Value,
        registry: Arc<RuleRegistry>,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        let value = require_mapping(&name, document)?;

        if entry(&value, &name).is_none() {
            return Err(ConfigError::new(
                ErrorKind::RootKeyMismatch,
                format!("invalid configuration: root label '{name}' is not a key of the document"),
            ));
        }

        Ok(Self {
            name,
            value,
            parent: None,
            mode: Mode::Active,
            registry,
        })
    }

    /// The label of this node, i.e. its key in the parent
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries in the working mapping. Never fails.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Whether the working mapping has no entries. Never fails.
    ///
    /// By construction this is false for any reachable cursor; it exists for
    /// symmetry with [`len`](Node::len).
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Whether this cursor is in Suppressed mode
    pub fn is_suppressed(&self) -> bool {
        self.mode == Mode::Suppressed
    }

    /// Look up a key in the working mapping
    pub fn get(&self, key: &str) -> Option<&Value> {
        entry(&self.value, key)
    }

    /// The working mapping this cursor stands on
    ///
    /// Read-only: custom checks driven from
    /// [`apply_callback`](Node::apply_callback) use this to feed a [`Rule`]
    /// or inspect values directly.
    ///
    /// [`Rule`]: crate::rules::Rule
    pub fn mapping(&self) -> &Mapping {
        &self.value
    }

    /// Iterate the entries of the working mapping in document order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.value.iter()
    }

    /// Descend into the sub-document under `key`
    ///
    /// Returns a new cursor standing on `value[key]`, with the current
    /// cursor as its parent.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::KeyNotFound`] when the key is absent;
    /// [`ErrorKind::EmptyNode`] when the value is not a non-empty mapping.
    pub fn descend(self, key: &str) -> Result<Self, ConfigError> {
        self.descend_inner(key, None)
    }

    /// Like [`descend`](Node::descend), with a caller-supplied error message
    pub fn descend_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.descend_inner(key, Some(message))
    }

    fn descend_inner(self, key: &str, message: Option<&str>) -> Result<Self, ConfigError> {
        if self.mode == Mode::Suppressed {
            trace!(node = %self.name, key, "suppressed, skipping descend");
            return Ok(self);
        }

        let Some(value) = entry(&self.value, key) else {
            let rendered = match message {
                Some(message) => message.to_string(),
                None => format!(
                    "'{key}' not found and cannot descend from node '{}'",
                    self.name
                ),
            };
            return Err(ConfigError::new(ErrorKind::KeyNotFound, rendered));
        };

        let value = value.clone();
        trace!(node = %self.name, key, "descending");
        into_child(key, value, self)
    }

    /// Descend into `key` if it exists; otherwise suppress the chain
    ///
    /// On a hit this behaves exactly like [`descend`](Node::descend). On a
    /// miss the current cursor flips to Suppressed mode and is returned
    /// unchanged: every subsequent check is a no-op until
    /// [`ascend`](Node::ascend) clears the flag.
    pub fn descend_if_exists(mut self, key: &str) -> Result<Self, ConfigError> {
        if self.mode == Mode::Suppressed {
            trace!(node = %self.name, key, "suppressed, skipping descend_if_exists");
            return Ok(self);
        }

        match entry(&self.value, key) {
            None => {
                debug!(node = %self.name, key, "optional branch absent, suppressing checks");
                self.mode = Mode::Suppressed;
                Ok(self)
            }
            Some(value) => {
                let value = value.clone();
                trace!(node = %self.name, key, "descending into optional branch");
                into_child(key, value, self)
            }
        }
    }

    /// Return to the parent cursor, or clear a suppressed branch
    ///
    /// On a Suppressed cursor this clears the flag and returns the cursor
    /// itself, undoing the optional branch. Otherwise it pops back to the
    /// parent.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NoParent`] when called on the root.
    pub fn ascend(mut self) -> Result<Self, ConfigError> {
        if self.mode == Mode::Suppressed {
            debug!(node = %self.name, "leaving suppressed mode");
            self.mode = Mode::Active;
            return Ok(self);
        }

        match self.parent.take() {
            Some(parent) => {
                trace!(node = %self.name, parent = %parent.name, "ascending");
                Ok(*parent)
            }
            None => Err(ConfigError::new(
                ErrorKind::NoParent,
                format!("nowhere to ascend to from node '{}'", self.name),
            )),
        }
    }

    /// Require `key` to be present
    pub fn key_must_exist(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::KEY_EXISTS, key, None)
    }

    /// Like [`key_must_exist`](Node::key_must_exist), with a caller message
    pub fn key_must_exist_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::KEY_EXISTS, key, Some(message))
    }

    /// Require `key` to be present and non-empty
    ///
    /// Boolean `false` counts as non-empty; null, the empty string, and
    /// empty containers do not.
    pub fn cannot_be_empty(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::CANNOT_BE_EMPTY, key, None)
    }

    /// Like [`cannot_be_empty`](Node::cannot_be_empty), with a caller message
    pub fn cannot_be_empty_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::CANNOT_BE_EMPTY, key, Some(message))
    }

    /// Require `key` to be non-empty when present; absent keys pass
    pub fn cannot_be_empty_if_exists(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::CANNOT_BE_EMPTY_IF_EXISTS, key, None)
    }

    /// Like [`cannot_be_empty_if_exists`](Node::cannot_be_empty_if_exists),
    /// with a caller message
    pub fn cannot_be_empty_if_exists_with(
        self,
        key: &str,
        message: &str,
    ) -> Result<Self, ConfigError> {
        self.check(ids::CANNOT_BE_EMPTY_IF_EXISTS, key, Some(message))
    }

    /// Require `key` to be present with a string value
    pub fn is_string(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_STRING, key, None)
    }

    /// Like [`is_string`](Node::is_string), with a caller message
    pub fn is_string_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_STRING, key, Some(message))
    }

    /// Require a string value when `key` is present; absent keys pass
    pub fn is_string_if_exists(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_STRING_IF_EXISTS, key, None)
    }

    /// Like [`is_string_if_exists`](Node::is_string_if_exists), with a
    /// caller message
    pub fn is_string_if_exists_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_STRING_IF_EXISTS, key, Some(message))
    }

    /// Require `key` to be present with a numeric value
    ///
    /// Numeric strings pass: `"2.3"` is as numeric as `2.3`.
    pub fn is_numeric(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_NUMERIC, key, None)
    }

    /// Like [`is_numeric`](Node::is_numeric), with a caller message
    pub fn is_numeric_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_NUMERIC, key, Some(message))
    }

    /// Require a numeric value when `key` is present; absent keys pass
    pub fn is_numeric_if_exists(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_NUMERIC_IF_EXISTS, key, None)
    }

    /// Like [`is_numeric_if_exists`](Node::is_numeric_if_exists), with a
    /// caller message
    pub fn is_numeric_if_exists_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_NUMERIC_IF_EXISTS, key, Some(message))
    }

    /// Require `key` to be present with a sequence value
    pub fn is_sequence(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_SEQUENCE, key, None)
    }

    /// Like [`is_sequence`](Node::is_sequence), with a caller message
    pub fn is_sequence_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_SEQUENCE, key, Some(message))
    }

    /// Require a sequence value when `key` is present; absent keys pass
    pub fn is_sequence_if_exists(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_SEQUENCE_IF_EXISTS, key, None)
    }

    /// Like [`is_sequence_if_exists`](Node::is_sequence_if_exists), with a
    /// caller message
    pub fn is_sequence_if_exists_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_SEQUENCE_IF_EXISTS, key, Some(message))
    }

    /// Require `key` to be present with a boolean value
    pub fn is_boolean(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_BOOLEAN, key, None)
    }

    /// Like [`is_boolean`](Node::is_boolean), with a caller message
    pub fn is_boolean_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_BOOLEAN, key, Some(message))
    }

    /// Require a boolean value when `key` is present; absent keys pass
    pub fn is_boolean_if_exists(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_BOOLEAN_IF_EXISTS, key, None)
    }

    /// Like [`is_boolean_if_exists`](Node::is_boolean_if_exists), with a
    /// caller message
    pub fn is_boolean_if_exists_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::IS_BOOLEAN_IF_EXISTS, key, Some(message))
    }

    /// Require `key` to hold a mapping whose keys are all strings
    ///
    /// A mapping with positional (integer) keys fails with
    /// [`ErrorKind::NonStringKey`]; a non-mapping fails with
    /// [`ErrorKind::TypeMismatch`].
    pub fn is_string_keyed_map(self, key: &str) -> Result<Self, ConfigError> {
        self.check(ids::STRING_KEYED_MAP, key, None)
    }

    /// Like [`is_string_keyed_map`](Node::is_string_keyed_map), with a
    /// caller message
    pub fn is_string_keyed_map_with(self, key: &str, message: &str) -> Result<Self, ConfigError> {
        self.check(ids::STRING_KEYED_MAP, key, Some(message))
    }

    /// Require `value[key]` to intersect the candidate set
    ///
    /// The value is treated as a collection: a sequence matches by element, a
    /// mapping by its values, and a scalar by equality. The check passes as
    /// soon as any candidate is found.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::KeyNotFound`] when the key is absent;
    /// [`ErrorKind::EnumMismatch`] when no candidate matches.
    pub fn is_one_of(self, key: &str, candidates: &[Value]) -> Result<Self, ConfigError> {
        self.is_one_of_inner(key, candidates, None)
    }

    /// Like [`is_one_of`](Node::is_one_of), with a caller message
    pub fn is_one_of_with(
        self,
        key: &str,
        candidates: &[Value],
        message: &str,
    ) -> Result<Self, ConfigError> {
        self.is_one_of_inner(key, candidates, Some(message))
    }

    fn is_one_of_inner(
        self,
        key: &str,
        candidates: &[Value],
        message: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if self.mode == Mode::Suppressed {
            return Ok(self);
        }

        require_key(key, &self.value, Some(&self.name), message)?;

        if let Some(value) = entry(&self.value, key)
            && candidates.iter().any(|c| collection_contains(value, c))
        {
            return Ok(self);
        }

        let rendered = match message {
            Some(message) => message.to_string(),
            None => {
                let listed = candidates
                    .iter()
                    .map(display_value)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "one of values {listed} in node '{key}' has to be present for parent node '{}'",
                    self.name
                )
            }
        };

        Err(ConfigError::new(ErrorKind::EnumMismatch, rendered))
    }

    /// Visit the listed children in order, failing on the first absent key
    ///
    /// Mapping-valued children are handed to the callback as fresh cursors
    /// (with no ascent link of their own); other values arrive raw. Iteration
    /// order follows `keys`, not the document.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::KeyNotFound`] on the first absent key; any error the
    /// callback returns aborts the iteration.
    pub fn for_each_child<F>(self, keys: &[&str], mut f: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str, Child<'_>) -> Result<(), ConfigError>,
    {
        if self.mode == Mode::Suppressed {
            return Ok(self);
        }

        for &key in keys {
            require_key(key, &self.value, Some(&self.name), None)?;
            self.visit_child(key, &mut f)?;
        }

        Ok(self)
    }

    /// Visit the listed children in order, silently skipping absent keys
    pub fn for_each_child_if_exists<F>(self, keys: &[&str], mut f: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str, Child<'_>) -> Result<(), ConfigError>,
    {
        if self.mode == Mode::Suppressed {
            return Ok(self);
        }

        for &key in keys {
            if entry(&self.value, key).is_none() {
                continue;
            }
            self.visit_child(key, &mut f)?;
        }

        Ok(self)
    }

    fn visit_child<F>(&self, key: &str, f: &mut F) -> Result<(), ConfigError>
    where
        F: FnMut(&str, Child<'_>) -> Result<(), ConfigError>,
    {
        // require_key / the if-exists guard ran before this
        let Some(value) = entry(&self.value, key) else {
            return Ok(());
        };

        match value {
            Value::Mapping(map) => {
                if map.is_empty() {
                    return Err(empty_node(key));
                }
                let child = Node {
                    name: key.to_string(),
                    value: map.clone(),
                    parent: None,
                    mode: Mode::Active,
                    registry: Arc::clone(&self.registry),
                };
                f(key, Child::Node(child))
            }
            other => f(key, Child::Value(other)),
        }
    }

    /// Invoke a custom check against this cursor
    ///
    /// The callback receives the key and the cursor itself; any error it
    /// returns aborts the chain. A no-op while Suppressed.
    pub fn apply_callback<F>(self, key: &str, f: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str, &Node) -> Result<(), ConfigError>,
    {
        if self.mode == Mode::Suppressed {
            return Ok(self);
        }

        f(key, &self)?;
        Ok(self)
    }

    /// Dispatch a builtin rule against the working mapping.
    ///
    /// # Panics
    ///
    /// Panics when the captured registry does not contain the rule: that
    /// registry was stripped of the builtin set, which is a programming
    /// error of the embedding code.
    fn check(self, raw: &'static str, key: &str, message: Option<&str>) -> Result<Self, ConfigError> {
        if self.mode == Mode::Suppressed {
            trace!(node = %self.name, rule = raw, key, "suppressed, skipping check");
            return Ok(self);
        }

        let id = rule_id(raw);
        let rule = self
            .registry
            .require(&id)
            .unwrap_or_else(|err| panic!("{err}; node '{}' was built with a registry missing the builtin rules", self.name));

        trace!(node = %self.name, rule = raw, key, "dispatching check");
        rule.validate(key, &self.value, Some(&self.name), message)?;
        Ok(self)
    }
}

/// Wrap `value` as the child `name` of `parent`.
fn into_child(name: &str, value: Value, parent: Node) -> Result<Node, ConfigError> {
    let map = require_mapping(name, value)?;
    let registry = Arc::clone(&parent.registry);
    Ok(Node {
        name: name.to_string(),
        value: map,
        parent: Some(Box::new(parent)),
        mode: Mode::Active,
        registry,
    })
}

fn require_mapping(name: &str, value: Value) -> Result<Mapping, ConfigError> {
    match value {
        Value::Mapping(map) if !map.is_empty() => Ok(map),
        _ => Err(empty_node(name)),
    }
}

fn empty_node(name: &str) -> ConfigError {
    ConfigError::new(
        ErrorKind::EmptyNode,
        format!("node '{name}' has to be a non-empty mapping"),
    )
}

impl PartialEq for Node {
    /// Structural equality: label, working mapping, mode, and ancestry.
    /// The registry is configuration, not state, and is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.value == other.value
            && self.mode == other.mode
            && self.parent == other.parent
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("mode", &self.mode)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}
