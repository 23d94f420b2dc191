#![forbid(unsafe_code)]

//! Built-in validation rules
//!
//! The standard rule set dispatched by the cursor: presence, emptiness, and
//! scalar/container type assertions, each with an if-exists companion where
//! the check only applies to keys that are present. Every rule is a stateless
//! unit of behavior; construction happens once, when the registry is built.

use crate::document::{Mapping, Value, display_value, entry, value_is_empty, value_is_numeric};
use crate::error::{ConfigError, ErrorKind};
use crate::rules::rule::{Rule, require_key};
use crate::types::RuleId;

/// Identifiers of the builtin rules
pub mod ids {
    pub const KEY_EXISTS: &str = "key-exists";
    pub const CANNOT_BE_EMPTY: &str = "cannot-be-empty";
    pub const CANNOT_BE_EMPTY_IF_EXISTS: &str = "cannot-be-empty-if-exists";
    pub const IS_STRING: &str = "is-string";
    pub const IS_STRING_IF_EXISTS: &str = "is-string-if-exists";
    pub const IS_NUMERIC: &str = "is-numeric";
    pub const IS_NUMERIC_IF_EXISTS: &str = "is-numeric-if-exists";
    pub const IS_SEQUENCE: &str = "is-sequence";
    pub const IS_SEQUENCE_IF_EXISTS: &str = "is-sequence-if-exists";
    pub const IS_BOOLEAN: &str = "is-boolean";
    pub const IS_BOOLEAN_IF_EXISTS: &str = "is-boolean-if-exists";
    pub const STRING_KEYED_MAP: &str = "string-keyed-map";
}

/// Construct a [`RuleId`] from one of the [`ids`] constants.
///
/// The constants satisfy the id grammar, so this cannot fail at runtime.
pub(crate) fn rule_id(raw: &'static str) -> RuleId {
    RuleId::new(raw).expect("builtin rule ids satisfy the id grammar")
}

/// All builtin rules, in registration order.
pub(crate) fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(KeyExists::new()),
        Box::new(CannotBeEmpty::new()),
        Box::new(CannotBeEmptyIfExists::new()),
        Box::new(IsString::new()),
        Box::new(IsStringIfExists::new()),
        Box::new(IsNumeric::new()),
        Box::new(IsNumericIfExists::new()),
        Box::new(IsSequence::new()),
        Box::new(IsSequenceIfExists::new()),
        Box::new(IsBoolean::new()),
        Box::new(IsBooleanIfExists::new()),
        Box::new(StringKeyedMap::new()),
    ]
}

/// Qualify a message with the parent label when one is known.
fn qualified(base: String, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("{base} for parent node '{parent}'"),
        None => base,
    }
}

/// Build the violation, letting a caller-supplied message win.
fn violation(kind: ErrorKind, message: Option<&str>, default: String) -> ConfigError {
    match message {
        Some(message) => ConfigError::new(kind, message),
        None => ConfigError::new(kind, default),
    }
}

/// Requires the key to be present.
pub struct KeyExists {
    id: RuleId,
}

impl KeyExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::KEY_EXISTS),
        }
    }
}

impl Rule for KeyExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)
    }
}

/// Requires the key to be present with a non-empty value.
///
/// `false` is a legitimate configuration value and is never treated as empty.
pub struct CannotBeEmpty {
    id: RuleId,
}

impl CannotBeEmpty {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::CANNOT_BE_EMPTY),
        }
    }
}

impl Rule for CannotBeEmpty {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some(value) = entry(container, key) else {
            return Err(violation(
                ErrorKind::KeyNotFound,
                message,
                qualified(
                    format!("node '{key}' does not exist and cannot be checked for emptiness"),
                    parent,
                ),
            ));
        };

        if value_is_empty(value) {
            return Err(violation(
                ErrorKind::EmptyValue,
                message,
                qualified(format!("node '{key}' cannot be empty"), parent),
            ));
        }

        Ok(())
    }
}

/// Like [`CannotBeEmpty`], but absent keys pass.
pub struct CannotBeEmptyIfExists {
    id: RuleId,
}

impl CannotBeEmptyIfExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::CANNOT_BE_EMPTY_IF_EXISTS),
        }
    }
}

impl Rule for CannotBeEmptyIfExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        let Some(value) = entry(container, key) else {
            return Ok(());
        };

        if value_is_empty(value) {
            return Err(violation(
                ErrorKind::EmptyValue,
                message,
                qualified(format!("if '{key}' exists, it cannot be empty"), parent),
            ));
        }

        Ok(())
    }
}

/// Requires the key to be present with a string value.
pub struct IsString {
    id: RuleId,
}

impl IsString {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_STRING),
        }
    }
}

impl Rule for IsString {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)?;

        match entry(container, key) {
            Some(Value::String(_)) => Ok(()),
            _ => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(format!("'{key}' has to be a string"), parent),
            )),
        }
    }
}

/// Asserts a string value only when the key is present.
pub struct IsStringIfExists {
    id: RuleId,
}

impl IsStringIfExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_STRING_IF_EXISTS),
        }
    }
}

impl Rule for IsStringIfExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        match entry(container, key) {
            None | Some(Value::String(_)) => Ok(()),
            Some(_) => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(format!("if '{key}' exists, it has to be a string"), parent),
            )),
        }
    }
}

/// Requires the key to be present with a numeric value.
///
/// Numeric strings pass: `"2.3"` is as numeric as `2.3`.
pub struct IsNumeric {
    id: RuleId,
}

impl IsNumeric {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_NUMERIC),
        }
    }
}

impl Rule for IsNumeric {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)?;

        match entry(container, key) {
            Some(value) if value_is_numeric(value) => Ok(()),
            _ => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(format!("'{key}' has to be a numeric value"), parent),
            )),
        }
    }
}

/// Asserts a numeric value only when the key is present.
pub struct IsNumericIfExists {
    id: RuleId,
}

impl IsNumericIfExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_NUMERIC_IF_EXISTS),
        }
    }
}

impl Rule for IsNumericIfExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        match entry(container, key) {
            None => Ok(()),
            Some(value) if value_is_numeric(value) => Ok(()),
            Some(_) => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(
                    format!("if '{key}' exists, it has to be a numeric value"),
                    parent,
                ),
            )),
        }
    }
}

/// Requires the key to be present with a sequence value.
pub struct IsSequence {
    id: RuleId,
}

impl IsSequence {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_SEQUENCE),
        }
    }
}

impl Rule for IsSequence {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)?;

        match entry(container, key) {
            Some(Value::Sequence(_)) => Ok(()),
            _ => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(format!("'{key}' has to be a sequence"), parent),
            )),
        }
    }
}

/// Asserts a sequence value only when the key is present.
pub struct IsSequenceIfExists {
    id: RuleId,
}

impl IsSequenceIfExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_SEQUENCE_IF_EXISTS),
        }
    }
}

impl Rule for IsSequenceIfExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        match entry(container, key) {
            None | Some(Value::Sequence(_)) => Ok(()),
            Some(_) => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(
                    format!("if '{key}' exists, it has to be a sequence"),
                    parent,
                ),
            )),
        }
    }
}

/// Requires the key to be present with a boolean value.
pub struct IsBoolean {
    id: RuleId,
}

impl IsBoolean {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_BOOLEAN),
        }
    }
}

impl Rule for IsBoolean {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)?;

        match entry(container, key) {
            Some(Value::Bool(_)) => Ok(()),
            _ => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(format!("'{key}' has to be a boolean"), parent),
            )),
        }
    }
}

/// Asserts a boolean value only when the key is present.
pub struct IsBooleanIfExists {
    id: RuleId,
}

impl IsBooleanIfExists {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::IS_BOOLEAN_IF_EXISTS),
        }
    }
}

impl Rule for IsBooleanIfExists {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        match entry(container, key) {
            None | Some(Value::Bool(_)) => Ok(()),
            Some(_) => Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(
                    format!("if '{key}' exists, it has to be a boolean"),
                    parent,
                ),
            )),
        }
    }
}

/// Requires the key's value to be a mapping whose keys are all strings.
///
/// Distinguishes a genuinely associative mapping from a positionally indexed
/// one: a YAML mapping with integer keys fails here even though it decodes to
/// the same container type.
pub struct StringKeyedMap {
    id: RuleId,
}

impl StringKeyedMap {
    pub fn new() -> Self {
        Self {
            id: rule_id(ids::STRING_KEYED_MAP),
        }
    }
}

impl Rule for StringKeyedMap {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn validate(
        &self,
        key: &str,
        container: &Mapping,
        parent: Option<&str>,
        message: Option<&str>,
    ) -> Result<(), ConfigError> {
        require_key(key, container, parent, message)?;

        let Some(Value::Mapping(map)) = entry(container, key) else {
            return Err(violation(
                ErrorKind::TypeMismatch,
                message,
                qualified(
                    format!("'{key}' has to be a mapping with string keys"),
                    parent,
                ),
            ));
        };

        for map_key in map.keys() {
            if !matches!(map_key, Value::String(_)) {
                return Err(violation(
                    ErrorKind::NonStringKey,
                    message,
                    qualified(
                        format!(
                            "'{key}' has to be a mapping with string keys; key '{}' is not a string",
                            display_value(map_key)
                        ),
                        parent,
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_builtin_rules_are_all_distinct() {
        let rules = builtin_rules();
        assert_eq!(rules.len(), 12);

        let mut ids: Vec<&str> = rules.iter().map(|r| r.id().as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_key_exists() {
        let map = mapping("host: localhost");
        let rule = KeyExists::new();

        assert!(rule.validate("host", &map, None, None).is_ok());

        let err = rule.validate("port", &map, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_cannot_be_empty_false_is_not_empty() {
        let map = mapping("persistent: false");
        let rule = CannotBeEmpty::new();
        assert!(rule.validate("persistent", &map, None, None).is_ok());
    }

    #[test]
    fn test_cannot_be_empty_rejects_empty_values() {
        let rule = CannotBeEmpty::new();

        for yaml in ["key: []", "key: \"\"", "key: null", "key: {}"] {
            let map = mapping(yaml);
            let err = rule.validate("key", &map, None, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyValue, "for {yaml}");
        }
    }

    #[test]
    fn test_cannot_be_empty_absent_key_is_key_not_found() {
        let map = mapping("other: 1");
        let rule = CannotBeEmpty::new();
        let err = rule.validate("key", &map, Some("configuration"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
        assert!(err.message().contains("parent node 'configuration'"));
    }

    #[test]
    fn test_cannot_be_empty_if_exists() {
        let rule = CannotBeEmptyIfExists::new();

        let absent = mapping("other: 1");
        assert!(rule.validate("key", &absent, None, None).is_ok());

        let empty = mapping("key: ''");
        let err = rule.validate("key", &empty, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyValue);
        assert!(err.message().starts_with("if 'key' exists"));
    }

    #[test]
    fn test_is_string() {
        let rule = IsString::new();

        let ok = mapping("host: localhost");
        assert!(rule.validate("host", &ok, None, None).is_ok());

        let bad = mapping("host: 8080");
        let err = rule.validate("host", &bad, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), "'host' has to be a string");

        let absent = mapping("other: x");
        let err = rule.validate("host", &absent, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_is_string_if_exists_skips_absent() {
        let rule = IsStringIfExists::new();

        let absent = mapping("other: x");
        assert!(rule.validate("host", &absent, None, None).is_ok());

        let bad = mapping("host: [a]");
        let err = rule.validate("host", &bad, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_is_numeric_accepts_numeric_strings() {
        let rule = IsNumeric::new();

        let number = mapping("port: 8080");
        assert!(rule.validate("port", &number, None, None).is_ok());

        let string = mapping("port: '2.3'");
        assert!(rule.validate("port", &string, None, None).is_ok());

        let bad = mapping("port: localhost");
        let err = rule.validate("port", &bad, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_is_sequence() {
        let rule = IsSequence::new();

        let ok = mapping("hosts: [a, b]");
        assert!(rule.validate("hosts", &ok, None, None).is_ok());

        let bad = mapping("hosts: a");
        let err = rule.validate("hosts", &bad, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.message(), "'hosts' has to be a sequence");
    }

    #[test]
    fn test_is_boolean() {
        let rule = IsBoolean::new();

        let ok = mapping("persistent: true");
        assert!(rule.validate("persistent", &ok, None, None).is_ok());

        let bad = mapping("persistent: yes please");
        let err = rule.validate("persistent", &bad, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_if_exists_variants_skip_absent_keys() {
        let map = mapping("other: 1");

        assert!(IsNumericIfExists::new().validate("k", &map, None, None).is_ok());
        assert!(IsSequenceIfExists::new().validate("k", &map, None, None).is_ok());
        assert!(IsBooleanIfExists::new().validate("k", &map, None, None).is_ok());
    }

    #[test]
    fn test_string_keyed_map_accepts_string_keys() {
        let map = mapping("routes:\n  home: /\n  about: /about");
        let rule = StringKeyedMap::new();
        assert!(rule.validate("routes", &map, None, None).is_ok());
    }

    #[test]
    fn test_string_keyed_map_rejects_non_string_keys() {
        let map = mapping("routes:\n  0: /\n  1: /about");
        let rule = StringKeyedMap::new();
        let err = rule.validate("routes", &map, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonStringKey);
        assert!(err.message().contains("'0' is not a string"));
    }

    #[test]
    fn test_string_keyed_map_rejects_non_mapping() {
        let map = mapping("routes: [/, /about]");
        let rule = StringKeyedMap::new();
        let err = rule.validate("routes", &map, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_caller_message_overrides_default() {
        let map = mapping("port: localhost");
        let rule = IsNumeric::new();
        let err = rule
            .validate("port", &map, Some("server"), Some("port must be a number"))
            .unwrap_err();
        assert_eq!(err.message(), "port must be a number");
    }

    #[test]
    fn test_parent_label_is_embedded() {
        let map = mapping("port: localhost");
        let rule = IsNumeric::new();
        let err = rule.validate("port", &map, Some("server"), None).unwrap_err();
        assert_eq!(
            err.message(),
            "'port' has to be a numeric value for parent node 'server'"
        );
    }
}
