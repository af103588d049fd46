//! Registration-based dispatch: per-class method tables built once at
//! startup. After registration, an instance call is a direct indexed call
//! into a Vec, with no key lookup on the hot path.

use crate::descriptor::{MethodKey, ParamSpec};
use crate::format::Format;
use crate::policy::{CorsSpec, CsrfSpec};
use crate::context::RequestContext;
use crate::response::{ReturnValue, Signal};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A controller hosting handler methods. Handlers downcast through
/// `as_any` to reach their concrete type.
pub trait Controller: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

pub type HandlerResult = Result<ReturnValue, Signal>;

/// An instance method: receives the resolved controller, the bound
/// arguments and the request context.
pub type InstanceFn =
    Arc<dyn Fn(&dyn Controller, &[Value], &mut RequestContext) -> HandlerResult + Send + Sync>;

/// A static method: no controller instance.
pub type StaticFn = Arc<dyn Fn(&[Value], &mut RequestContext) -> HandlerResult + Send + Sync>;

/// Creates a fresh controller instance (used for eager singletons).
pub type Factory = Arc<dyn Fn() -> Arc<dyn Controller> + Send + Sync>;

/// Per-class method table. Instance methods get a dense index resolved
/// once at startup; static methods are called through their key directly.
#[derive(Default)]
pub struct DispatchTable {
    handlers: Vec<InstanceFn>,
    indices: HashMap<MethodKey, usize>,
    statics: HashMap<MethodKey, StaticFn>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance method, returning its dispatch index.
    pub fn register(&mut self, key: MethodKey, handler: InstanceFn) -> usize {
        let index = self.handlers.len();
        self.handlers.push(handler);
        self.indices.insert(key, index);
        index
    }

    pub fn register_static(&mut self, key: MethodKey, handler: StaticFn) {
        self.statics.insert(key, handler);
    }

    pub fn index_of(&self, key: &MethodKey) -> Option<usize> {
        self.indices.get(key).copied()
    }

    pub fn static_fn(&self, key: &MethodKey) -> Option<StaticFn> {
        self.statics.get(key).cloned()
    }

    /// Call an instance method by dispatch index.
    pub fn invoke(
        &self,
        index: usize,
        instance: &dyn Controller,
        args: &[Value],
        ctx: &mut RequestContext,
    ) -> HandlerResult {
        match self.handlers.get(index) {
            Some(handler) => handler(instance, args, ctx),
            None => Err(Signal::fail(format!("invalid dispatch index: {}", index))),
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.statics.is_empty()
    }
}

/// Registry entry for one controller class: its method table, instance
/// factory, bindable fields and class-level policies.
pub struct ControllerClass {
    pub name: String,
    pub table: DispatchTable,
    pub factory: Option<Factory>,
    /// Bindable instance fields; a class with none is eligible for eager
    /// singleton instantiation.
    pub fields: Vec<ParamSpec>,
    pub cors: CorsSpec,
    pub csrf: CsrfSpec,
    pub content_type: Option<Format>,
    /// Environment profile this class requires, if any.
    pub profile: Option<String>,
}

impl ControllerClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: DispatchTable::new(),
            factory: None,
            fields: Vec::new(),
            cors: CorsSpec::default(),
            csrf: CsrfSpec::default(),
            content_type: None,
            profile: None,
        }
    }

    pub fn register_method(
        &mut self,
        name: &str,
        param_types: &[&str],
        handler: InstanceFn,
    ) -> usize {
        self.table.register(MethodKey::new(name, param_types), handler)
    }

    pub fn register_static_method(&mut self, name: &str, param_types: &[&str], handler: StaticFn) {
        self.table
            .register_static(MethodKey::new(name, param_types), handler)
    }

    pub fn has_bindable_fields(&self) -> bool {
        !self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Outcome;
    use crate::service::session::InMemorySession;
    use http::Method;

    struct Probe;

    impl Controller for Probe {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, Arc::new(InMemorySession::new()))
    }

    #[test]
    fn test_register_and_invoke_by_index() {
        let mut table = DispatchTable::new();
        let idx = table.register(
            MethodKey::new("ping", &[]),
            Arc::new(|_, _, _| Ok(ReturnValue::Data(serde_json::json!("pong")))),
        );
        assert_eq!(table.index_of(&MethodKey::new("ping", &[])), Some(idx));

        let mut ctx = ctx();
        let out = table.invoke(idx, &Probe, &[], &mut ctx).unwrap();
        assert_eq!(out, ReturnValue::Data(serde_json::json!("pong")));
    }

    #[test]
    fn test_overloads_resolve_by_param_types() {
        let mut table = DispatchTable::new();
        let by_id = table.register(
            MethodKey::new("show", &["u64"]),
            Arc::new(|_, _, _| Ok(ReturnValue::Null)),
        );
        let by_slug = table.register(
            MethodKey::new("show", &["String"]),
            Arc::new(|_, _, _| Ok(ReturnValue::Null)),
        );
        assert_ne!(by_id, by_slug);
        assert_eq!(table.index_of(&MethodKey::new("show", &["String"])), Some(by_slug));
        assert_eq!(table.index_of(&MethodKey::new("show", &["bool"])), None);
    }

    #[test]
    fn test_invalid_index_fails() {
        let table = DispatchTable::new();
        let mut ctx = ctx();
        let result = table.invoke(3, &Probe, &[], &mut ctx);
        assert!(matches!(result, Err(Signal::Fail(_))));
    }

    #[test]
    fn test_static_methods_bypass_index() {
        let mut class = ControllerClass::new("Health");
        class.register_static_method(
            "check",
            &[],
            Arc::new(|_, _| Ok(ReturnValue::Outcome(Outcome::Status(http::StatusCode::OK)))),
        );
        assert!(class.table.static_fn(&MethodKey::new("check", &[])).is_some());
        assert!(class.table.index_of(&MethodKey::new("check", &[])).is_none());
    }
}
