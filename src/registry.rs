//! Version tier → method name → descriptor table.

use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{context::RequestContext, errors::DispatchError};

/// Reserved fallback tier consulted when the requested version has no entry.
pub const DEFAULT_TIER: &str = "default";

pub type MethodResult = Result<Map<String, Value>, DispatchError>;

pub type Handler = Arc<dyn Fn(&RequestContext) -> MethodResult + Send + Sync>;

#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub version: String,
    pub required_params: Vec<String>,
    pub handler: Handler,
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("required_params", &self.required_params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct MethodRegistry {
    tiers: HashMap<String, HashMap<String, Arc<MethodDescriptor>>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the descriptor at `(version, name)`, replacing any earlier one.
    pub fn register<F>(
        &mut self,
        version: impl Into<String>,
        name: impl Into<String>,
        required_params: &[&str],
        handler: F,
    ) where
        F: Fn(&RequestContext) -> MethodResult + Send + Sync + 'static,
    {
        let descriptor = MethodDescriptor {
            name: name.into(),
            version: version.into(),
            required_params: required_params.iter().map(|param| param.to_string()).collect(),
            handler: Arc::new(handler),
        };

        debug!(
            method = %descriptor.name,
            version = %descriptor.version,
            required_params = ?descriptor.required_params,
            "method registered"
        );

        self.tiers
            .entry(descriptor.version.clone())
            .or_default()
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, version: &str, name: &str) -> Option<Arc<MethodDescriptor>> {
        self.tiers.get(version)?.get(name).cloned()
    }

    pub fn versions(&self) -> Vec<String> {
        let mut versions = self.tiers.keys().cloned().collect::<Vec<_>>();
        versions.sort();
        versions
    }

    pub fn len(&self) -> usize {
        self.tiers.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tagged(tag: &'static str) -> impl Fn(&RequestContext) -> MethodResult + Send + Sync {
        move |_| Ok(Map::from_iter([("handler".to_string(), json!(tag))]))
    }

    fn invoke(descriptor: &MethodDescriptor) -> Value {
        let result = (descriptor.handler)(&RequestContext::default()).expect("handler result");
        Value::Object(result)
    }

    #[test]
    fn lookup_returns_what_was_registered() {
        let mut registry = MethodRegistry::new();
        registry.register("1.0", "echo", &["text", "lang"], tagged("echo"));

        let descriptor = registry.lookup("1.0", "echo").expect("registered method");
        assert_eq!(descriptor.name, "echo");
        assert_eq!(descriptor.version, "1.0");
        assert_eq!(descriptor.required_params, vec!["text", "lang"]);
        assert_eq!(invoke(&descriptor), json!({ "handler": "echo" }));
    }

    #[test]
    fn re_registration_replaces_previous_descriptor() {
        let mut registry = MethodRegistry::new();
        registry.register("1.0", "echo", &["text"], tagged("first"));
        registry.register("1.0", "echo", &[], tagged("second"));

        let descriptor = registry.lookup("1.0", "echo").expect("registered method");
        assert!(descriptor.required_params.is_empty());
        assert_eq!(invoke(&descriptor), json!({ "handler": "second" }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let mut registry = MethodRegistry::new();
        registry.register("1.0", "echo", &[], tagged("echo"));

        assert!(registry.lookup("1.0", "Echo").is_none());
        assert!(registry.lookup("1", "echo").is_none());
        assert!(registry.lookup("2.0", "echo").is_none());
        assert!(registry.lookup(DEFAULT_TIER, "echo").is_none());
    }

    #[test]
    fn same_name_lives_independently_per_tier() {
        let mut registry = MethodRegistry::new();
        registry.register("1.0", "ping", &[], tagged("v1"));
        registry.register(DEFAULT_TIER, "ping", &[], tagged("fallback"));

        let v1 = registry.lookup("1.0", "ping").expect("v1 ping");
        let fallback = registry.lookup(DEFAULT_TIER, "ping").expect("default ping");
        assert_eq!(invoke(&v1), json!({ "handler": "v1" }));
        assert_eq!(invoke(&fallback), json!({ "handler": "fallback" }));
        assert_eq!(registry.versions(), vec!["1.0", "default"]);
    }

    #[test]
    fn duplicate_required_params_are_tolerated() {
        let mut registry = MethodRegistry::new();
        registry.register("1.0", "echo", &["text", "text"], tagged("echo"));

        let descriptor = registry.lookup("1.0", "echo").expect("registered method");
        assert_eq!(descriptor.required_params, vec!["text", "text"]);
    }
}
