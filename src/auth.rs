//! Redirect-to-login handling when authentication is required but missing.

use crate::config::AppConfig;
use crate::context::RequestContext;
use crate::response::Outcome;
use crate::service::RouteTable;
use std::collections::HashMap;

/// Policy invoked when a protected endpoint is hit without credentials.
pub trait MissingAuthenticationHandler: Send + Sync {
    fn result(&self, ctx: &RequestContext) -> Outcome;
}

/// Redirects to the configured login URL when a GET route for it exists,
/// otherwise answers with a bare unauthorized. Resolved once per port at
/// construction; AJAX requests get the AJAX login URL flavor.
pub struct RedirectToLoginUrl {
    default_result: Outcome,
    default_ajax_result: Outcome,
    by_port: HashMap<String, Outcome>,
    ajax_by_port: HashMap<String, Outcome>,
}

impl RedirectToLoginUrl {
    pub fn new(config: &AppConfig, routes: &dyn RouteTable) -> Self {
        let login_url = config.login_url.as_str();
        let ajax_login_url = config.ajax_login_url();

        let default_result = resolve(routes, None, login_url);
        let default_ajax_result = if ajax_login_url == login_url {
            default_result.clone()
        } else {
            resolve(routes, None, ajax_login_url)
        };

        let mut by_port = HashMap::new();
        let mut ajax_by_port = HashMap::new();
        for port in &config.named_ports {
            let result = resolve(routes, Some(&port.name), login_url);
            let ajax_result = if ajax_login_url == login_url {
                result.clone()
            } else {
                resolve(routes, Some(&port.name), ajax_login_url)
            };
            by_port.insert(port.name.clone(), result);
            ajax_by_port.insert(port.name.clone(), ajax_result);
        }

        Self {
            default_result,
            default_ajax_result,
            by_port,
            ajax_by_port,
        }
    }
}

fn resolve(routes: &dyn RouteTable, port: Option<&str>, url: &str) -> Outcome {
    if routes.has_get_route(port, url) {
        Outcome::redirect(url)
    } else {
        Outcome::Unauthorized
    }
}

impl MissingAuthenticationHandler for RedirectToLoginUrl {
    fn result(&self, ctx: &RequestContext) -> Outcome {
        let (per_port, default) = if ctx.is_ajax() {
            (&self.ajax_by_port, &self.default_ajax_result)
        } else {
            (&self.by_port, &self.default_result)
        };
        match ctx.port_id() {
            Some(port) if !port.is_empty() => per_port
                .get(port)
                .cloned()
                .unwrap_or_else(|| default.clone()),
            _ => default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamedPort;
    use crate::service::session::InMemorySession;
    use http::Method;
    use std::collections::HashSet;
    use std::sync::Arc;

    struct StaticRoutes {
        urls: HashSet<(Option<String>, String)>,
    }

    impl StaticRoutes {
        fn of(entries: &[(Option<&str>, &str)]) -> Self {
            Self {
                urls: entries
                    .iter()
                    .map(|(port, url)| (port.map(String::from), url.to_string()))
                    .collect(),
            }
        }
    }

    impl RouteTable for StaticRoutes {
        fn has_get_route(&self, port: Option<&str>, url: &str) -> bool {
            self.urls
                .contains(&(port.map(String::from), url.to_string()))
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Method::GET, Arc::new(InMemorySession::new()))
    }

    #[test]
    fn test_redirects_when_login_route_exists() {
        let config = AppConfig::default();
        let routes = StaticRoutes::of(&[(None, "/login")]);
        let handler = RedirectToLoginUrl::new(&config, &routes);
        assert_eq!(handler.result(&ctx()), Outcome::redirect("/login"));
    }

    #[test]
    fn test_unauthorized_without_login_route() {
        let config = AppConfig::default();
        let routes = StaticRoutes::of(&[]);
        let handler = RedirectToLoginUrl::new(&config, &routes);
        assert_eq!(handler.result(&ctx()), Outcome::Unauthorized);
    }

    #[test]
    fn test_ajax_flavor_uses_ajax_login_url() {
        let config = AppConfig {
            ajax_login_url: Some("/ajax/login".to_string()),
            ..AppConfig::default()
        };
        let routes = StaticRoutes::of(&[(None, "/login"), (None, "/ajax/login")]);
        let handler = RedirectToLoginUrl::new(&config, &routes);
        let ajax = ctx().with_header("X-Requested-With", "XMLHttpRequest");
        assert_eq!(handler.result(&ajax), Outcome::redirect("/ajax/login"));
        assert_eq!(handler.result(&ctx()), Outcome::redirect("/login"));
    }

    #[test]
    fn test_named_port_resolution() {
        let config = AppConfig {
            named_ports: vec![NamedPort {
                name: "admin".to_string(),
                port: 9001,
            }],
            ..AppConfig::default()
        };
        // login route exists on the admin port only
        let routes = StaticRoutes::of(&[(Some("admin"), "/login")]);
        let handler = RedirectToLoginUrl::new(&config, &routes);
        assert_eq!(handler.result(&ctx()), Outcome::Unauthorized);
        let admin = ctx().with_port("admin");
        assert_eq!(handler.result(&admin), Outcome::redirect("/login"));
        let unknown = ctx().with_port("metrics");
        assert_eq!(handler.result(&unknown), Outcome::Unauthorized);
    }
}
