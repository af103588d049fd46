//! Body-patch heuristic for single-parameter JSON endpoints.
//!
//! Callers may POST either a bare value or an object already nested under
//! the parameter's name; `patched_json_body` normalizes the former into the
//! latter so both decode identically.

use std::borrow::Cow;

/// States of the root-key scanner.
enum Scan {
    SeekingKey,
    InsideKey,
}

/// Extract the first quoted key of an object-rooted body (spaces skipped)
/// and compare it against the expected field name. Any mismatch in length
/// or characters means the body needs wrapping.
fn root_key_matches(body: &str, name: &str) -> bool {
    let mut state = Scan::SeekingKey;
    let mut key = String::new();
    for c in body.chars().skip(1) {
        if c == ' ' {
            continue;
        }
        match state {
            Scan::SeekingKey => {
                if c == '"' {
                    state = Scan::InsideKey;
                }
            }
            Scan::InsideKey => {
                if c == '"' {
                    break;
                }
                key.push(c);
                if key.len() > name.len() {
                    break;
                }
            }
        }
    }
    key == name
}

/// Wrap the body as `{"<field>": <body>}` when the method expects a single
/// compound value and the JSON root is not already keyed by the field name.
///
/// `remaining` is the count of bindable fields and parameters left after
/// subtracting path variables; the heuristic only applies when it is at
/// most one. Array-rooted bodies always wrap. A body rooted in neither an
/// object nor an array is an error carrying a descriptive message.
pub fn patched_json_body<'a>(
    body: &'a str,
    remaining: usize,
    field: Option<&str>,
) -> Result<Cow<'a, str>, String> {
    let trimmed = body.trim();
    if trimmed.is_empty() || remaining > 1 {
        return Ok(Cow::Borrowed(body));
    }
    let Some(name) = field else {
        return Ok(Cow::Borrowed(body));
    };
    let needs_patch = if trimmed.starts_with('[') {
        true
    } else if !trimmed.starts_with('{') {
        return Err(format!("cannot parse JSON body: {}", trimmed));
    } else {
        !root_key_matches(trimmed, name)
    };
    if needs_patch {
        Ok(Cow::Owned(format!("{{\"{}\": {}}}", name, trimmed)))
    } else {
        Ok(Cow::Borrowed(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matching_root_key_passes_unchanged() {
        let body = r#"{"foo": 1}"#;
        let out = patched_json_body(body, 1, Some("foo")).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_mismatched_root_key_wraps() {
        let out = patched_json_body(r#"{"x":1}"#, 1, Some("foo")).unwrap();
        assert_eq!(out, r#"{"foo": {"x":1}}"#);
    }

    #[test]
    fn test_array_root_always_wraps() {
        let out = patched_json_body("[1,2,3]", 1, Some("ids")).unwrap();
        assert_eq!(out, r#"{"ids": [1,2,3]}"#);
    }

    #[test]
    fn test_spaces_before_key_are_skipped() {
        let body = r#"{   "foo" : {"a": 1}}"#;
        let out = patched_json_body(body, 1, Some("foo")).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_key_prefix_of_name_wraps() {
        let out = patched_json_body(r#"{"fo": 1}"#, 1, Some("foo")).unwrap();
        assert_eq!(out, r#"{"foo": {"fo": 1}}"#);
    }

    #[test]
    fn test_key_longer_than_name_wraps() {
        let out = patched_json_body(r#"{"fooo": 1}"#, 1, Some("foo")).unwrap();
        assert_eq!(out, r#"{"foo": {"fooo": 1}}"#);
    }

    #[test]
    fn test_scalar_root_is_an_error() {
        let err = patched_json_body("42", 1, Some("foo")).unwrap_err();
        assert!(err.contains("cannot parse JSON body"));
    }

    #[test]
    fn test_multiple_remaining_params_pass_through() {
        let body = r#"{"x": 1}"#;
        let out = patched_json_body(body, 2, Some("foo")).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_blank_body_passes_through() {
        assert_eq!(patched_json_body("  ", 1, Some("foo")).unwrap(), "  ");
    }

    #[test]
    fn test_no_field_name_passes_through() {
        let body = r#"{"x": 1}"#;
        assert_eq!(patched_json_body(body, 1, None).unwrap(), body);
    }

    #[test]
    fn test_empty_object_wraps() {
        let out = patched_json_body("{}", 1, Some("foo")).unwrap();
        assert_eq!(out, r#"{"foo": {}}"#);
    }
}
