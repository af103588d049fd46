//! Collaborator contracts consumed by the invocation core, plus in-crate
//! defaults for result inference and session caching.

mod infer;
pub mod session;

pub use infer::DefaultResultInferer;
pub use session::InMemorySession;

use crate::context::RequestContext;
use crate::descriptor::MethodDescriptor;
use crate::dispatch::{Controller, ControllerClass};
use crate::error::BoxError;
use crate::response::{Outcome, ReturnValue};
use serde_json::Value;
use std::sync::Arc;

/// Parameter-loading service: the dependency-injection boundary that
/// materializes controller instances and method arguments. Binding
/// failures are recorded as violations on the context, never thrown.
pub trait ParamLoader: Send + Sync {
    fn load_host_bean(
        &self,
        class: &ControllerClass,
        ctx: &mut RequestContext,
    ) -> Result<Arc<dyn Controller>, BoxError>;

    fn load_method_params(
        &self,
        instance: Option<&Arc<dyn Controller>>,
        descriptor: &MethodDescriptor,
        ctx: &mut RequestContext,
    ) -> Vec<Value>;
}

/// A resolved view template. Only existence matters to this core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub path: String,
}

/// View engine boundary: resolves a template for the current context.
pub trait ViewManager: Send + Sync {
    fn load(&self, ctx: &RequestContext) -> Option<Template>;
}

/// Session-scoped cache with a fixed short expiry, used for
/// double-submission tokens. Must provide read-your-own-write isolation
/// within one session.
pub trait SessionStore: Send + Sync {
    fn cached(&self, key: &str) -> Option<String>;
    fn cache_for_1min(&self, key: &str, value: &str);
}

/// Route-table boundary: whether a static GET route resolves for a URL on
/// a given port (`None` = default port).
pub trait RouteTable: Send + Sync {
    fn has_get_route(&self, port: Option<&str>, url: &str) -> bool;
}

/// Reconciles a raw handler return with the handler metadata, the request
/// context and the template-existence flag into the final outcome.
pub trait ResultInferer: Send + Sync {
    fn infer(
        &self,
        descriptor: &MethodDescriptor,
        raw: ReturnValue,
        ctx: &RequestContext,
        has_template: bool,
    ) -> Outcome;
}
