//! Role adapters: thin wrappers exposing one shared invoker at each
//! pipeline stage (action, before/after/exception/finally interceptors).

use crate::app::App;
use crate::context::RequestContext;
use crate::descriptor::MethodDescriptor;
use crate::error::{BoxError, BuildError, InvokeError};
use crate::invoker::{Invoker, InvokerVisitor};
use crate::policy::{CorsSpec, CsrfSpec};
use crate::response::Outcome;
use std::sync::Arc;

/// The primary action handler.
pub struct ControllerAction {
    invoker: Arc<Invoker>,
}

impl ControllerAction {
    pub fn create(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Self, BuildError> {
        Ok(Self::from_invoker(Invoker::new(descriptor, app)?))
    }

    pub fn from_invoker(invoker: Arc<Invoker>) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &Arc<Invoker> {
        &self.invoker
    }

    pub fn handle(&self, ctx: &mut RequestContext) -> Result<Outcome, InvokeError> {
        self.invoker.handle(ctx)
    }

    pub fn priority(&self) -> i32 {
        self.invoker.priority()
    }

    pub fn session_free(&self) -> bool {
        self.invoker.session_free()
    }

    pub fn non_blocking(&self) -> bool {
        self.invoker.non_blocking()
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        self.invoker.cors_spec()
    }

    pub fn csrf_spec(&self) -> &CsrfSpec {
        self.invoker.csrf_spec()
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        self.invoker.accept(visitor);
    }
}

/// Runs before the action; may short-circuit the request.
pub struct BeforeInterceptor {
    invoker: Arc<Invoker>,
}

impl BeforeInterceptor {
    pub fn create(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Self, BuildError> {
        Ok(Self::from_invoker(Invoker::new(descriptor, app)?))
    }

    pub fn from_invoker(invoker: Arc<Invoker>) -> Self {
        Self { invoker }
    }

    pub fn handle(&self, ctx: &mut RequestContext) -> Result<Outcome, InvokeError> {
        self.invoker.handle(ctx)
    }

    pub fn priority(&self) -> i32 {
        self.invoker.priority()
    }

    pub fn session_free(&self) -> bool {
        self.invoker.session_free()
    }

    pub fn non_blocking(&self) -> bool {
        self.invoker.non_blocking()
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        self.invoker.cors_spec()
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        self.invoker.accept(visitor);
    }
}

/// Runs after the action with the action's outcome seeded on the context.
pub struct AfterInterceptor {
    invoker: Arc<Invoker>,
}

impl AfterInterceptor {
    pub fn create(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Self, BuildError> {
        Ok(Self::from_invoker(Invoker::new(descriptor, app)?))
    }

    pub fn from_invoker(invoker: Arc<Invoker>) -> Self {
        Self { invoker }
    }

    pub fn handle(
        &self,
        prior: Outcome,
        ctx: &mut RequestContext,
    ) -> Result<Outcome, InvokeError> {
        self.invoker.handle_with_outcome(prior, ctx)
    }

    pub fn priority(&self) -> i32 {
        self.invoker.priority()
    }

    pub fn session_free(&self) -> bool {
        self.invoker.session_free()
    }

    pub fn non_blocking(&self) -> bool {
        self.invoker.non_blocking()
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        self.invoker.cors_spec()
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        self.invoker.accept(visitor);
    }
}

/// Invoked once the external dispatch layer has matched a caught failure
/// against `exception_classes`; matching itself happens out there, not here.
#[derive(Debug)]
pub struct ExceptionInterceptor {
    invoker: Arc<Invoker>,
    exception_classes: Vec<String>,
}

impl ExceptionInterceptor {
    pub fn create(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Self, BuildError> {
        Self::from_invoker(Invoker::new(descriptor, app)?)
    }

    pub fn from_invoker(invoker: Arc<Invoker>) -> Result<Self, BuildError> {
        let exception_classes = invoker.descriptor().exception_classes.clone();
        for class in &exception_classes {
            if class.trim().is_empty() {
                return Err(BuildError::BlankExceptionClass(
                    invoker.descriptor().qualified_name(),
                ));
            }
        }
        Ok(Self {
            invoker,
            exception_classes,
        })
    }

    pub fn handle(
        &self,
        error: BoxError,
        ctx: &mut RequestContext,
    ) -> Result<Outcome, InvokeError> {
        self.invoker.handle_with_error(error, ctx)
    }

    /// Error class names this interceptor handles, resolved once at
    /// construction.
    pub fn exception_classes(&self) -> &[String] {
        &self.exception_classes
    }

    pub fn invoker(&self) -> &Arc<Invoker> {
        &self.invoker
    }

    pub fn priority(&self) -> i32 {
        self.invoker.priority()
    }

    pub fn session_free(&self) -> bool {
        self.invoker.session_free()
    }

    pub fn non_blocking(&self) -> bool {
        self.invoker.non_blocking()
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        self.invoker.cors_spec()
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        self.invoker.accept(visitor);
    }
}

/// Runs unconditionally at the end of the request; its outcome is discarded.
pub struct FinallyInterceptor {
    invoker: Arc<Invoker>,
}

impl FinallyInterceptor {
    pub fn create(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Self, BuildError> {
        Ok(Self::from_invoker(Invoker::new(descriptor, app)?))
    }

    pub fn from_invoker(invoker: Arc<Invoker>) -> Self {
        Self { invoker }
    }

    pub fn handle(&self, ctx: &mut RequestContext) -> Result<(), InvokeError> {
        self.invoker.handle(ctx).map(|_| ())
    }

    pub fn priority(&self) -> i32 {
        self.invoker.priority()
    }

    pub fn session_free(&self) -> bool {
        self.invoker.session_free()
    }

    pub fn non_blocking(&self) -> bool {
        self.invoker.non_blocking()
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        self.invoker.cors_spec()
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        self.invoker.accept(visitor);
    }
}
