//! Application context: configuration, controller registry, singleton map
//! and collaborator handles, built once at startup and shared by all
//! request threads.

use crate::config::AppConfig;
use crate::dispatch::{Controller, ControllerClass};
use crate::service::{DefaultResultInferer, ParamLoader, ResultInferer, ViewManager};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

pub struct App {
    config: AppConfig,
    classes: HashMap<String, Arc<ControllerClass>>,
    /// Application-scoped controller singletons. Reused across requests
    /// concurrently, so cached controllers must be stateless.
    singletons: RwLock<HashMap<String, Arc<dyn Controller>>>,
    param_loader: Arc<dyn ParamLoader>,
    view_manager: Arc<dyn ViewManager>,
    inferer: Arc<dyn ResultInferer>,
}

impl App {
    pub fn new(
        config: AppConfig,
        param_loader: Arc<dyn ParamLoader>,
        view_manager: Arc<dyn ViewManager>,
    ) -> Self {
        Self {
            config,
            classes: HashMap::new(),
            singletons: RwLock::new(HashMap::new()),
            param_loader,
            view_manager,
            inferer: Arc::new(DefaultResultInferer),
        }
    }

    pub fn with_inferer(mut self, inferer: Arc<dyn ResultInferer>) -> Self {
        self.inferer = inferer;
        self
    }

    /// Register a controller class. Registration happens at startup,
    /// before the app is shared.
    pub fn register(&mut self, class: ControllerClass) {
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    pub fn class(&self, name: &str) -> Option<Arc<ControllerClass>> {
        self.classes.get(name).cloned()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn param_loader(&self) -> &Arc<dyn ParamLoader> {
        &self.param_loader
    }

    pub fn view_manager(&self) -> &dyn ViewManager {
        self.view_manager.as_ref()
    }

    pub fn inferer(&self) -> &dyn ResultInferer {
        self.inferer.as_ref()
    }

    pub fn singleton(&self, class_name: &str) -> Option<Arc<dyn Controller>> {
        self.singletons
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(class_name)
            .cloned()
    }

    pub fn cache_singleton(&self, class_name: &str, instance: Arc<dyn Controller>) {
        self.singletons
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(class_name.to_string(), instance);
    }

    /// Per-invoker unique key, used to avoid cross-invoker collisions on a
    /// shared request context.
    pub fn unique_key(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Release application-scoped resources at shutdown.
    pub fn shutdown(&self) {
        self.singletons
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
