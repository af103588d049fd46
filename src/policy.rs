//! Cross-cutting policies: CORS/CSRF spec chaining, forced response
//! settings and the double-submission token, resolved once per invoker.

use crate::config::AppConfig;
use crate::descriptor::MethodDescriptor;
use crate::dispatch::ControllerClass;
use crate::error::BuildError;
use crate::format::Format;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Sentinel token value meaning "use the application default".
pub const DSP_TOKEN_DEFAULT: &str = "*";

/// Prefix for double-submission entries in the session cache.
pub const DSP_CACHE_PREFIX: &str = "DSP-";

/// CORS settings declared on a class or method. Every field is optional so
/// a method-level spec can override a class-level one field-by-field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsSpec {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub allow_origin: Option<String>,
    #[serde(default)]
    pub allow_methods: Option<Vec<String>>,
    #[serde(default)]
    pub allow_headers: Option<String>,
    #[serde(default)]
    pub max_age: Option<u32>,
}

impl CorsSpec {
    /// Chain this spec over a base: present fields win, absent fields fall
    /// back to the base.
    pub fn chain(&self, base: &CorsSpec) -> CorsSpec {
        CorsSpec {
            enabled: self.enabled.or(base.enabled),
            allow_origin: self.allow_origin.clone().or_else(|| base.allow_origin.clone()),
            allow_methods: self
                .allow_methods
                .clone()
                .or_else(|| base.allow_methods.clone()),
            allow_headers: self
                .allow_headers
                .clone()
                .or_else(|| base.allow_headers.clone()),
            max_age: self.max_age.or(base.max_age),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfSpec {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl CsrfSpec {
    pub fn chain(&self, base: &CsrfSpec) -> CsrfSpec {
        CsrfSpec {
            enabled: self.enabled.or(base.enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }
}

/// Policies merged from class- and method-level declarations, fixed for the
/// lifetime of one invoker.
#[derive(Clone, Debug)]
pub struct ResolvedPolicies {
    pub cors: CorsSpec,
    pub csrf: CsrfSpec,
    pub content_type: Option<Format>,
    pub status: Option<StatusCode>,
    pub dsp_token: Option<String>,
}

impl ResolvedPolicies {
    pub fn resolve(
        class: &ControllerClass,
        method: &MethodDescriptor,
        config: &AppConfig,
    ) -> Result<Self, BuildError> {
        let status = match method.status {
            Some(code) => Some(StatusCode::from_u16(code).map_err(|_| {
                BuildError::InvalidStatus {
                    handler: method.qualified_name(),
                    status: code,
                }
            })?),
            None => None,
        };
        let dsp_token = method.dsp_token.as_deref().map(|token| {
            if token == DSP_TOKEN_DEFAULT {
                config.dsp_token.clone()
            } else {
                token.to_string()
            }
        });
        Ok(Self {
            cors: method.cors.chain(&class.cors),
            csrf: method.csrf.chain(&class.csrf),
            content_type: method.content_type.or(class.content_type),
            status,
            dsp_token,
        })
    }
}
