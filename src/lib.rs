//! Action-core: action-invocation core for a web MVC framework.
//!
//! Given a request already matched to a controller method, resolves the
//! target instance, binds parameters (including JSON body decoding),
//! dispatches the method through a registration-based fast path and
//! normalizes the return value into a response descriptor.

pub mod adapters;
pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod json;
pub mod invoker;
pub mod policy;
pub mod response;
pub mod service;
pub mod template;

pub use adapters::{
    AfterInterceptor, BeforeInterceptor, ControllerAction, ExceptionInterceptor,
    FinallyInterceptor,
};
pub use app::App;
pub use auth::{MissingAuthenticationHandler, RedirectToLoginUrl};
pub use config::{AppConfig, NamedPort};
pub use context::{ContextState, RequestContext, Violation};
pub use descriptor::{MethodDescriptor, MethodKey, ParamSpec, ReturnKind};
pub use dispatch::{
    Controller, ControllerClass, DispatchTable, Factory, HandlerResult, InstanceFn, StaticFn,
};
pub use error::{BoxError, BuildError, InvokeError};
pub use format::Format;
pub use invoker::{Invoker, InvokerVisitor};
pub use policy::{CorsSpec, CsrfSpec, ResolvedPolicies};
pub use response::{Outcome, ReturnValue, Signal};
pub use service::{
    DefaultResultInferer, InMemorySession, ParamLoader, ResultInferer, RouteTable, SessionStore,
    Template, ViewManager,
};
