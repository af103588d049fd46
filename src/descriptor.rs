//! Method metadata handed in by the annotation pipeline as structured data.

use crate::format::Format;
use crate::policy::{CorsSpec, CsrfSpec};
use serde::{Deserialize, Serialize};

/// One bindable field or method parameter: its name and semantic type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(default)]
    pub type_name: String,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Declared return type category of a handler method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    #[default]
    Void,
    /// Returns a data value to be serialized or rendered.
    Data,
    /// Returns a response descriptor directly.
    Outcome,
}

/// Immutable metadata about one controller method, produced out of band
/// and consumed here to build an invoker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub class_name: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub return_kind: ReturnKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub session_free: bool,
    #[serde(default)]
    pub non_blocking: bool,
    #[serde(default)]
    pub cors: CorsSpec,
    #[serde(default)]
    pub csrf: CsrfSpec,
    /// Forced response content type; falls back to the class-level setting.
    #[serde(default)]
    pub content_type: Option<Format>,
    /// Forced response status, method-level only.
    #[serde(default)]
    pub status: Option<u16>,
    /// Double-submission token parameter name; `"*"` means the configured default.
    #[serde(default)]
    pub dsp_token: Option<String>,
    /// Environment profile this method requires, if any.
    #[serde(default)]
    pub profile: Option<String>,
    /// For exception interceptors: names of the error classes handled.
    #[serde(default)]
    pub exception_classes: Vec<String>,
}

impl MethodDescriptor {
    pub fn new(class_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            params: Vec::new(),
            return_kind: ReturnKind::Void,
            is_static: false,
            priority: 0,
            session_free: false,
            non_blocking: false,
            cors: CorsSpec::default(),
            csrf: CsrfSpec::default(),
            content_type: None,
            status: None,
            dsp_token: None,
            profile: None,
            exception_classes: Vec::new(),
        }
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            name: self.name.clone(),
            param_types: self.params.iter().map(|p| p.type_name.clone()).collect(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.class_name, self.name)
    }
}

/// Dispatch-table key: method name plus declared parameter type names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub param_types: Vec<String>,
}

impl MethodKey {
    pub fn new(name: impl Into<String>, param_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            param_types: param_types.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_with_defaults() {
        let m: MethodDescriptor = serde_json::from_str(
            r#"{"class_name": "Users", "name": "show",
                "params": [{"name": "id", "type_name": "u64"}],
                "return_kind": "data"}"#,
        )
        .unwrap();
        assert_eq!(m.qualified_name(), "Users::show");
        assert_eq!(m.return_kind, ReturnKind::Data);
        assert_eq!(m.priority, 0);
        assert!(!m.is_static);
        assert!(m.dsp_token.is_none());
    }

    #[test]
    fn test_key_carries_param_types() {
        let mut m = MethodDescriptor::new("Users", "update");
        m.params = vec![
            ParamSpec::new("id", "u64"),
            ParamSpec::new("body", "UserPatch"),
        ];
        assert_eq!(m.key(), MethodKey::new("update", &["u64", "UserPatch"]));
    }
}
