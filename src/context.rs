//! Per-request state read and written by the invocation pipeline.

use crate::dispatch::Controller;
use crate::error::BoxError;
use crate::format::Format;
use crate::invoker::Invoker;
use crate::response::Outcome;
use crate::service::SessionStore;
use http::{Method, StatusCode};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Where the request is in its lifecycle. Template probing only happens
/// while the primary action is being handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    Handling,
    Intercepting,
}

/// A recorded parameter-binding failure. Violations accumulate on the
/// context and only escalate to a response at the explicit check point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub param: String,
    pub message: String,
}

/// Externally owned per-request state. The invoker reads the request
/// surface (method, body, params, headers, session) and writes its
/// per-request caches (controller instance, parsed JSON DTO,
/// template-existence flag, forced response settings, violations).
pub struct RequestContext {
    method: Method,
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    path_vars: HashMap<String, String>,
    body: String,
    content_type: Format,
    accept: Format,
    session: Arc<dyn SessionStore>,
    port_id: Option<String>,
    state: ContextState,
    violations: Vec<Violation>,
    instances: HashMap<String, Arc<dyn Controller>>,
    json_dtos: HashMap<String, Value>,
    has_template: Option<bool>,
    forced_status: Option<StatusCode>,
    prior_outcome: Option<Outcome>,
    exception: Option<Arc<BoxError>>,
    current_invoker: Option<Arc<Invoker>>,
}

impl RequestContext {
    pub fn new(method: Method, session: Arc<dyn SessionStore>) -> Self {
        Self {
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            path_vars: HashMap::new(),
            body: String::new(),
            content_type: Format::Form,
            accept: Format::Html,
            session,
            port_id: None,
            state: ContextState::Handling,
            violations: Vec::new(),
            instances: HashMap::new(),
            json_dtos: HashMap::new(),
            has_template: None,
            forced_status: None,
            prior_outcome: None,
            exception: None,
            current_invoker: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, format: Format) -> Self {
        self.content_type = format;
        self
    }

    pub fn with_accept(mut self, format: Format) -> Self {
        self.accept = format;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_path_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        self.params.insert(name.clone(), value.clone());
        self.path_vars.insert(name, value);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_port(mut self, port_id: impl Into<String>) -> Self {
        self.port_id = Some(port_id.into());
        self
    }

    pub fn with_state(mut self, state: ContextState) -> Self {
        self.state = state;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Safe/idempotent verbs bypass double-submission checks.
    pub fn method_safe(&self) -> bool {
        matches!(
            self.method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
        )
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_ajax(&self) -> bool {
        self.header("x-requested-with")
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false)
    }

    pub fn port_id(&self) -> Option<&str> {
        self.port_id.as_deref()
    }

    pub fn content_type(&self) -> Format {
        self.content_type
    }

    pub fn json_encoded(&self) -> bool {
        self.content_type.is_json()
    }

    pub fn accept(&self) -> Format {
        self.accept
    }

    pub fn accept_json(&self) -> bool {
        self.accept.is_json()
    }

    /// Override the negotiated response format (forced content type).
    pub fn set_accept(&mut self, format: Format) {
        self.accept = format;
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_handling(&self) -> bool {
        self.state == ContextState::Handling
    }

    pub fn set_state(&mut self, state: ContextState) {
        self.state = state;
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn path_var(&self, name: &str) -> Option<&str> {
        self.path_vars.get(name).map(String::as_str)
    }

    /// Names of the route's path variables. A structural property of the
    /// matched route, so invokers cache the result.
    pub fn path_var_names(&self) -> HashSet<String> {
        self.path_vars.keys().cloned().collect()
    }

    pub fn record_violation(&mut self, param: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            param: param.into(),
            message: message.into(),
        });
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn violation_message(&self, separator: &str) -> String {
        self.violations
            .iter()
            .map(|v| v.message.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn controller_instance(&self, class_name: &str) -> Option<Arc<dyn Controller>> {
        self.instances.get(class_name).cloned()
    }

    pub fn cache_controller_instance(
        &mut self,
        class_name: impl Into<String>,
        instance: Arc<dyn Controller>,
    ) {
        self.instances.insert(class_name.into(), instance);
    }

    pub fn json_dto(&self, key: &str) -> Option<&Value> {
        self.json_dtos.get(key)
    }

    pub fn cache_json_dto(&mut self, key: impl Into<String>, dto: Value) {
        self.json_dtos.insert(key.into(), dto);
    }

    pub fn has_template(&self) -> Option<bool> {
        self.has_template
    }

    pub fn set_has_template(&mut self, flag: bool) {
        self.has_template = Some(flag);
    }

    pub fn force_status(&mut self, status: StatusCode) {
        self.forced_status = Some(status);
    }

    pub fn forced_status(&self) -> Option<StatusCode> {
        self.forced_status
    }

    pub fn set_prior_outcome(&mut self, outcome: Outcome) {
        self.prior_outcome = Some(outcome);
    }

    pub fn prior_outcome(&self) -> Option<&Outcome> {
        self.prior_outcome.as_ref()
    }

    pub fn set_exception(&mut self, exception: Arc<BoxError>) {
        self.exception = Some(exception);
    }

    pub fn exception(&self) -> Option<&Arc<BoxError>> {
        self.exception.as_ref()
    }

    pub fn set_current_invoker(&mut self, invoker: Arc<Invoker>) {
        self.current_invoker = Some(invoker);
    }

    /// The invoker currently handling this context, for cross-referencing
    /// by other handlers.
    pub fn current_invoker(&self) -> Option<&Arc<Invoker>> {
        self.current_invoker.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::session::InMemorySession;
    use pretty_assertions::assert_eq;

    fn ctx(method: Method) -> RequestContext {
        RequestContext::new(method, Arc::new(InMemorySession::new()))
    }

    #[test]
    fn test_safe_methods() {
        assert!(ctx(Method::GET).method_safe());
        assert!(ctx(Method::HEAD).method_safe());
        assert!(!ctx(Method::POST).method_safe());
        assert!(!ctx(Method::DELETE).method_safe());
    }

    #[test]
    fn test_ajax_detection() {
        let plain = ctx(Method::GET);
        assert!(!plain.is_ajax());
        let ajax = ctx(Method::GET).with_header("X-Requested-With", "XMLHttpRequest");
        assert!(ajax.is_ajax());
    }

    #[test]
    fn test_violation_message_joins() {
        let mut ctx = ctx(Method::POST);
        assert!(!ctx.has_violations());
        ctx.record_violation("name", "name is required");
        ctx.record_violation("age", "age must be a number");
        assert_eq!(
            ctx.violation_message(";"),
            "name is required;age must be a number"
        );
    }

    #[test]
    fn test_path_vars_are_also_params() {
        let ctx = ctx(Method::GET).with_path_var("id", "42").with_param("q", "x");
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.path_var("q"), None);
        assert_eq!(ctx.path_var_names(), HashSet::from(["id".to_string()]));
    }

    #[test]
    fn test_forced_accept_overrides() {
        let mut ctx = ctx(Method::GET).with_accept(Format::Html);
        assert!(!ctx.accept_json());
        ctx.set_accept(Format::Json);
        assert!(ctx.accept_json());
    }
}
