#![forbid(unsafe_code)]

//! Rule registry
//!
//! The registry decouples "which check" from "how it is implemented": the
//! cursor addresses rules by id and never hard-wires a rule's logic. Rules
//! are stored as trait objects, so embedding code can extend the set by
//! registering new implementations under new ids.

use crate::error::RegistryError;
use crate::rules::builtin::builtin_rules;
use crate::rules::rule::Rule;
use crate::types::RuleId;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static SHARED: Lazy<Arc<RuleRegistry>> = Lazy::new(|| Arc::new(RuleRegistry::builtin()));

/// Registry for storing and managing validation rules
///
/// Rules are keyed by their unique [`RuleId`]. The registry is logically a
/// cache of stateless rule instances, not mutable business state: it is built
/// once (per process for the shared default, or explicitly by the caller) and
/// only read afterwards.
pub struct RuleRegistry {
    rules: HashMap<RuleId, Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Create a registry populated with the builtin rule set
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            let id = rule.id().clone();
            registry.rules.insert(id, rule);
        }
        registry
    }

    /// The process-wide default registry, built lazily exactly once
    ///
    /// Root nodes constructed without an explicit registry share this
    /// instance. Initialization is guarded by [`Lazy`], so concurrent first
    /// use never observes partial population.
    pub fn shared() -> Arc<RuleRegistry> {
        Arc::clone(&SHARED)
    }

    /// Register a rule under its own id
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRule`] if the id is already taken.
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        let id = rule.id().clone();
        if self.rules.contains_key(&id) {
            return Err(RegistryError::DuplicateRule(id));
        }
        self.rules.insert(id, rule);
        Ok(())
    }

    /// Get a rule by its id
    ///
    /// Returns `None` if the rule is not found in the registry.
    pub fn get(&self, id: &RuleId) -> Option<&dyn Rule> {
        self.rules.get(id).map(|boxed| boxed.as_ref())
    }

    /// Get a rule by its id, treating absence as a misconfiguration
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownRule`] if the id is not registered.
    /// This is a programming error of the embedding code, not a validation
    /// outcome.
    pub fn require(&self, id: &RuleId) -> Result<&dyn Rule, RegistryError> {
        self.get(id)
            .ok_or_else(|| RegistryError::UnknownRule(id.clone()))
    }

    /// Iterate over all rules in the registry
    pub fn iter_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.values().map(|boxed| boxed.as_ref())
    }

    /// Get the number of rules in the registry
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Mapping;
    use crate::error::ConfigError;
    use crate::rules::builtin::ids;

    struct NoopRule {
        id: RuleId,
    }

    impl NoopRule {
        fn boxed(raw: &str) -> Box<dyn Rule> {
            Box::new(Self {
                id: RuleId::new(raw).unwrap(),
            })
        }
    }

    impl Rule for NoopRule {
        fn id(&self) -> &RuleId {
            &self.id
        }

        fn validate(
            &self,
            _key: &str,
            _container: &Mapping,
            _parent: Option<&str>,
            _message: Option<&str>,
        ) -> Result<(), ConfigError> {
            Ok(())
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_builtin_registry_holds_standard_set() {
        let registry = RuleRegistry::builtin();
        assert_eq!(registry.len(), 12);

        for raw in [
            ids::KEY_EXISTS,
            ids::CANNOT_BE_EMPTY,
            ids::CANNOT_BE_EMPTY_IF_EXISTS,
            ids::IS_STRING,
            ids::IS_STRING_IF_EXISTS,
            ids::IS_NUMERIC,
            ids::IS_NUMERIC_IF_EXISTS,
            ids::IS_SEQUENCE,
            ids::IS_SEQUENCE_IF_EXISTS,
            ids::IS_BOOLEAN,
            ids::IS_BOOLEAN_IF_EXISTS,
            ids::STRING_KEYED_MAP,
        ] {
            let id = RuleId::new(raw).unwrap();
            assert!(registry.get(&id).is_some(), "missing builtin rule {raw}");
        }
    }

    #[test]
    fn test_default_is_builtin() {
        let registry = RuleRegistry::default();
        assert_eq!(registry.len(), 12);
    }

    #[test]
    fn test_register_custom_rule() {
        let mut registry = RuleRegistry::builtin();
        registry.register(NoopRule::boxed("my-custom-rule")).unwrap();

        let id = RuleId::new("my-custom-rule").unwrap();
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_register_duplicate_id_is_rejected() {
        let mut registry = RuleRegistry::builtin();
        let result = registry.register(NoopRule::boxed(ids::IS_STRING));

        match result {
            Err(RegistryError::DuplicateRule(id)) => assert_eq!(id.as_str(), ids::IS_STRING),
            other => panic!("expected DuplicateRule, got {other:?}"),
        }
        assert_eq!(registry.len(), 12);
    }

    #[test]
    fn test_require_unknown_rule() {
        let registry = RuleRegistry::builtin();
        let id = RuleId::new("never-registered").unwrap();

        match registry.require(&id) {
            Err(RegistryError::UnknownRule(unknown)) => {
                assert_eq!(unknown.as_str(), "never-registered");
            }
            other => panic!("expected UnknownRule, got {:?}", other.map(|r| r.id())),
        }
    }

    #[test]
    fn test_shared_registry_is_one_instance() {
        let a = RuleRegistry::shared();
        let b = RuleRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn test_iter_rules_covers_all() {
        let registry = RuleRegistry::builtin();
        assert_eq!(registry.iter_rules().count(), 12);
    }
}
