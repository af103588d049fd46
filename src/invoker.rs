//! The per-endpoint invoker: resolves the call target, binds parameters,
//! applies cross-cutting policies, dispatches the method and normalizes
//! the outcome.

use crate::app::App;
use crate::context::RequestContext;
use crate::descriptor::{MethodDescriptor, ParamSpec, ReturnKind};
use crate::dispatch::{Controller, ControllerClass, HandlerResult, StaticFn};
use crate::error::{BoxError, BuildError, InvokeError};
use crate::json::patched_json_body;
use crate::policy::{ResolvedPolicies, CorsSpec, CsrfSpec, DSP_CACHE_PREFIX};
use crate::response::{Outcome, ReturnValue, Signal};
use crate::template::TemplateProbe;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Weak};

/// Exposes (controller class, method) pairs to external tooling without
/// exposing internal caches.
pub trait InvokerVisitor {
    fn visit(&mut self, controller: &str, method: &MethodDescriptor);
}

/// How the method is reached: a dispatch-table index for instance methods,
/// a direct function for static ones.
enum Target {
    Instance(usize),
    Static(StaticFn),
}

/// One compiled invoker per (controller class, method) pair. Built once at
/// startup, then shared immutably by all request threads; the only mutable
/// state is a pair of bounded caches (path variables, template existence).
pub struct Invoker {
    app: Arc<App>,
    class: Arc<ControllerClass>,
    descriptor: MethodDescriptor,
    target: Target,
    param_count: usize,
    /// Bindable class fields followed by method parameters.
    param_specs: Vec<ParamSpec>,
    fields_and_params_count: usize,
    single_json_field_name: Option<String>,
    policies: ResolvedPolicies,
    /// Per-invoker key for the JSON DTO cached on a shared context.
    dto_key: String,
    singleton: Option<Arc<dyn Controller>>,
    disabled: bool,
    path_variables: OnceCell<HashSet<String>>,
    template_probe: TemplateProbe,
    self_ref: Weak<Invoker>,
}

impl std::fmt::Debug for Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invoker")
            .field("descriptor", &self.descriptor)
            .field("param_count", &self.param_count)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl Invoker {
    pub fn new(descriptor: MethodDescriptor, app: &Arc<App>) -> Result<Arc<Self>, BuildError> {
        let class = app
            .class(&descriptor.class_name)
            .ok_or_else(|| BuildError::UnknownClass(descriptor.class_name.clone()))?;
        let disabled = !app.config().profile_matches(class.profile.as_deref())
            || !app.config().profile_matches(descriptor.profile.as_deref());
        let key = descriptor.key();
        let missing = || BuildError::UnknownMethod {
            class: class.name.clone(),
            method: descriptor.name.clone(),
        };
        let target = if descriptor.is_static {
            Target::Static(class.table.static_fn(&key).ok_or_else(missing)?)
        } else {
            Target::Instance(class.table.index_of(&key).ok_or_else(missing)?)
        };
        let param_count = descriptor.params.len();
        let mut param_specs = class.fields.clone();
        param_specs.extend(descriptor.params.iter().cloned());
        let fields_and_params_count = param_specs.len();
        let single_json_field_name = if fields_and_params_count == 1 {
            param_specs.first().map(|spec| spec.name.clone())
        } else {
            None
        };
        let policies = ResolvedPolicies::resolve(&class, &descriptor, app.config())?;
        let dto_key = app.unique_key();
        let singleton = if descriptor.is_static {
            None
        } else {
            Self::resolve_singleton(app, &class)
        };
        Ok(Arc::new_cyclic(|self_ref| Self {
            app: Arc::clone(app),
            class,
            descriptor,
            target,
            param_count,
            param_specs,
            fields_and_params_count,
            single_json_field_name,
            policies,
            dto_key,
            singleton,
            disabled,
            path_variables: OnceCell::new(),
            template_probe: TemplateProbe::new(),
            self_ref: self_ref.clone(),
        }))
    }

    /// Singleton resolution, once at construction: reuse the cached
    /// application singleton, or eagerly instantiate one when the class
    /// has no bindable instance fields.
    fn resolve_singleton(app: &App, class: &ControllerClass) -> Option<Arc<dyn Controller>> {
        if let Some(existing) = app.singleton(&class.name) {
            return Some(existing);
        }
        if class.has_bindable_fields() {
            return None;
        }
        let factory = class.factory.as_ref()?;
        let instance = factory();
        app.cache_singleton(&class.name, Arc::clone(&instance));
        Some(instance)
    }

    /// Run the pipeline for the primary action (or a before interceptor).
    pub fn handle(&self, ctx: &mut RequestContext) -> Result<Outcome, InvokeError> {
        match self.run(ctx) {
            Ok(outcome) => Ok(outcome),
            Err(Signal::Respond(outcome)) => Ok(outcome),
            Err(Signal::Fail(e)) => Err(e),
        }
    }

    /// Seed the context with the prior outcome, then run the pipeline
    /// (after interceptors).
    pub fn handle_with_outcome(
        &self,
        prior: Outcome,
        ctx: &mut RequestContext,
    ) -> Result<Outcome, InvokeError> {
        ctx.set_prior_outcome(prior);
        self.handle(ctx)
    }

    /// Seed the context with a caught failure, then run the pipeline
    /// (exception interceptors).
    pub fn handle_with_error(
        &self,
        error: BoxError,
        ctx: &mut RequestContext,
    ) -> Result<Outcome, InvokeError> {
        ctx.set_exception(Arc::new(error));
        self.handle(ctx)
    }

    fn run(&self, ctx: &mut RequestContext) -> Result<Outcome, Signal> {
        if self.disabled {
            tracing::debug!(
                handler = %self.descriptor.qualified_name(),
                "endpoint disabled for active profile"
            );
            return Ok(Outcome::NotFound);
        }
        if let Some(me) = self.self_ref.upgrade() {
            ctx.set_current_invoker(me);
        }
        self.prevent_double_submission(ctx)?;
        self.process_force_response(ctx);
        self.ensure_json_dto(ctx)?;
        let instance = self.controller_instance(ctx)?;

        // Violations short-circuit when the client wants data back or no
        // template exists to absorb the error into a rendered page.
        let fail_on_violation = ctx.accept_json() || !self.check_template(ctx);

        let args = self.bind_params(instance.as_ref(), ctx);

        if fail_on_violation && ctx.has_violations() {
            return Ok(Outcome::BadRequest(ctx.violation_message(";")));
        }

        self.invoke(instance.as_ref(), &args, ctx)
    }

    fn prevent_double_submission(&self, ctx: &mut RequestContext) -> Result<(), Signal> {
        let Some(token_key) = self.policies.dsp_token.as_deref() else {
            return Ok(());
        };
        if ctx.method_safe() {
            return Ok(());
        }
        let Some(token) = ctx.param(token_key).map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        let cache_key = format!("{}{}", DSP_CACHE_PREFIX, token_key);
        if ctx.session().cached(&cache_key).as_deref() == Some(token) {
            return Err(Signal::Respond(Outcome::Conflict));
        }
        ctx.session().cache_for_1min(&cache_key, token);
        Ok(())
    }

    fn process_force_response(&self, ctx: &mut RequestContext) {
        if let Some(format) = self.policies.content_type {
            ctx.set_accept(format);
        }
        if let Some(status) = self.policies.status {
            ctx.force_status(status);
        }
    }

    /// Parse the (possibly patched) JSON body into the DTO cached under
    /// this invoker's key. Idempotent; a no-op when the method binds
    /// nothing, the body is not JSON, or the DTO is already cached.
    fn ensure_json_dto(&self, ctx: &mut RequestContext) -> Result<(), Signal> {
        if self.fields_and_params_count == 0
            || !ctx.json_encoded()
            || ctx.json_dto(&self.dto_key).is_some()
        {
            return Ok(());
        }
        if ctx.body().trim().is_empty() {
            // params may still arrive via the query string
            return Ok(());
        }
        let remaining = self.remaining_fields_and_params(ctx);
        let field = self.single_json_field_name(ctx);
        let dto = {
            let body = ctx.body();
            let patched = match patched_json_body(body, remaining, field.as_deref()) {
                Ok(patched) => patched,
                Err(message) => {
                    tracing::warn!(%message, "unparseable JSON body root");
                    return Err(Signal::Respond(Outcome::BadRequest(message)));
                }
            };
            match serde_json::from_str::<Value>(&patched) {
                Ok(dto) => dto,
                Err(e) => {
                    tracing::warn!(error = %e, "error parsing JSON body");
                    return Err(Signal::Respond(Outcome::BadRequest(format!(
                        "cannot parse JSON body: {}",
                        e
                    ))));
                }
            }
        };
        ctx.cache_json_dto(self.dto_key.clone(), dto);
        Ok(())
    }

    /// Bindable fields and parameters left once path variables are bound,
    /// the shape the body-patch heuristic decides on.
    fn remaining_fields_and_params(&self, ctx: &RequestContext) -> usize {
        if self.fields_and_params_count < 2 {
            return self.fields_and_params_count;
        }
        self.fields_and_params_count
            .saturating_sub(self.path_variables(ctx).len())
    }

    fn path_variables(&self, ctx: &RequestContext) -> &HashSet<String> {
        self.path_variables.get_or_init(|| ctx.path_var_names())
    }

    /// The field name a single-parameter JSON body nests under: the
    /// precomputed single spec, or the first spec not already present
    /// among the request parameters.
    fn single_json_field_name(&self, ctx: &RequestContext) -> Option<String> {
        if self.single_json_field_name.is_some() {
            return self.single_json_field_name.clone();
        }
        self.param_specs
            .iter()
            .map(|spec| spec.name.as_str())
            .find(|name| !ctx.has_param(name))
            .map(String::from)
    }

    fn controller_instance(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<Option<Arc<dyn Controller>>, Signal> {
        if self.descriptor.is_static {
            return Ok(None);
        }
        if let Some(singleton) = &self.singleton {
            return Ok(Some(Arc::clone(singleton)));
        }
        if let Some(cached) = ctx.controller_instance(&self.class.name) {
            return Ok(Some(cached));
        }
        let instance = self
            .app
            .param_loader()
            .load_host_bean(&self.class, ctx)
            .map_err(|source| {
                Signal::Fail(InvokeError::BeanLoad {
                    class: self.class.name.clone(),
                    source,
                })
            })?;
        ctx.cache_controller_instance(self.class.name.clone(), Arc::clone(&instance));
        Ok(Some(instance))
    }

    fn bind_params(
        &self,
        instance: Option<&Arc<dyn Controller>>,
        ctx: &mut RequestContext,
    ) -> Vec<Value> {
        if self.param_count == 0 {
            return Vec::new();
        }
        self.app
            .param_loader()
            .load_method_params(instance, &self.descriptor, ctx)
    }

    fn check_template(&self, ctx: &mut RequestContext) -> bool {
        self.template_probe.check(&self.app, ctx)
    }

    fn invoke(
        &self,
        instance: Option<&Arc<dyn Controller>>,
        args: &[Value],
        ctx: &mut RequestContext,
    ) -> Result<Outcome, Signal> {
        let raw = match self.call(instance, args, ctx) {
            Ok(raw) => raw,
            // "throw a result" short-circuit: the raised outcome IS the result
            Err(Signal::Respond(outcome)) => return Ok(outcome),
            Err(failure) => return Err(failure),
        };
        if raw == ReturnValue::Null
            && self.descriptor.return_kind != ReturnKind::Void
            && self.descriptor.return_kind != ReturnKind::Outcome
        {
            // a data-returning method that produced nothing means the
            // resource was not found
            tracing::debug!(
                handler = %self.descriptor.qualified_name(),
                "null return from data-returning handler"
            );
            return Ok(Outcome::NotFound);
        }
        let has_template = self.check_template(ctx);
        let raw = if has_template && raw == ReturnValue::Outcome(Outcome::RenderAny) {
            ReturnValue::Outcome(Outcome::RenderTemplate)
        } else {
            raw
        };
        Ok(self.app.inferer().infer(&self.descriptor, raw, ctx, has_template))
    }

    fn call(
        &self,
        instance: Option<&Arc<dyn Controller>>,
        args: &[Value],
        ctx: &mut RequestContext,
    ) -> HandlerResult {
        match &self.target {
            Target::Instance(index) => match instance {
                Some(instance) => self.class.table.invoke(*index, instance.as_ref(), args, ctx),
                None => Err(Signal::fail("instance method dispatched without an instance")),
            },
            Target::Static(handler) => handler(args, ctx),
        }
    }

    /// The JSON DTO this invoker cached on the context, if any.
    pub fn cached_json_dto<'c>(&self, ctx: &'c RequestContext) -> Option<&'c Value> {
        ctx.json_dto(&self.dto_key)
    }

    pub fn priority(&self) -> i32 {
        self.descriptor.priority
    }

    pub fn session_free(&self) -> bool {
        self.descriptor.session_free
    }

    pub fn non_blocking(&self) -> bool {
        self.descriptor.non_blocking
    }

    pub fn cors_spec(&self) -> &CorsSpec {
        &self.policies.cors
    }

    pub fn csrf_spec(&self) -> &CsrfSpec {
        &self.policies.csrf
    }

    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    pub fn accept(&self, visitor: &mut dyn InvokerVisitor) {
        visitor.visit(&self.class.name, &self.descriptor);
    }
}
