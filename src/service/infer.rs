//! Default result inference.

use crate::context::RequestContext;
use crate::descriptor::MethodDescriptor;
use crate::response::{Outcome, ReturnValue};
use crate::service::ResultInferer;
use http::StatusCode;

/// Maps raw handler returns to outcomes: explicit outcomes pass through,
/// data renders through the matched template when one exists and as a
/// payload otherwise, and a void completion is a bare status.
pub struct DefaultResultInferer;

impl ResultInferer for DefaultResultInferer {
    fn infer(
        &self,
        _descriptor: &MethodDescriptor,
        raw: ReturnValue,
        _ctx: &RequestContext,
        has_template: bool,
    ) -> Outcome {
        match raw {
            ReturnValue::Outcome(outcome) => outcome,
            ReturnValue::Data(value) => {
                if has_template {
                    Outcome::RenderTemplate
                } else {
                    Outcome::Payload(value)
                }
            }
            ReturnValue::Null => {
                if has_template {
                    Outcome::RenderTemplate
                } else {
                    Outcome::Status(StatusCode::NO_CONTENT)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::session::InMemorySession;
    use http::Method;
    use std::sync::Arc;

    fn infer(raw: ReturnValue, has_template: bool) -> Outcome {
        let descriptor = MethodDescriptor::new("Pages", "show");
        let ctx = RequestContext::new(Method::GET, Arc::new(InMemorySession::new()));
        DefaultResultInferer.infer(&descriptor, raw, &ctx, has_template)
    }

    #[test]
    fn test_explicit_outcome_passes_through() {
        let out = infer(ReturnValue::Outcome(Outcome::Conflict), true);
        assert_eq!(out, Outcome::Conflict);
    }

    #[test]
    fn test_data_renders_template_when_present() {
        let out = infer(ReturnValue::Data(serde_json::json!({"a": 1})), true);
        assert_eq!(out, Outcome::RenderTemplate);
    }

    #[test]
    fn test_data_becomes_payload_without_template() {
        let value = serde_json::json!({"a": 1});
        let out = infer(ReturnValue::Data(value.clone()), false);
        assert_eq!(out, Outcome::Payload(value));
    }

    #[test]
    fn test_void_completion_is_no_content() {
        let out = infer(ReturnValue::Null, false);
        assert_eq!(out, Outcome::Status(StatusCode::NO_CONTENT));
    }
}
