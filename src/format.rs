//! Response/content format vocabulary shared by negotiation, probing and policies.

use serde::{Deserialize, Serialize};

/// Media format a request body carries or a response is negotiated into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Html,
    Json,
    Xml,
    Txt,
    Csv,
    Form,
    Binary,
}

impl Format {
    pub fn is_json(self) -> bool {
        matches!(self, Format::Json)
    }

    /// Whether a view template can render this format. Pure data formats
    /// never resolve to a template, so probing short-circuits on them.
    pub fn supports_template(self) -> bool {
        matches!(self, Format::Html | Format::Xml | Format::Txt)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Html => "text/html",
            Format::Json => "application/json",
            Format::Xml => "text/xml",
            Format::Txt => "text/plain",
            Format::Csv => "text/csv",
            Format::Form => "application/x-www-form-urlencoded",
            Format::Binary => "application/octet-stream",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_support() {
        assert!(Format::Html.supports_template());
        assert!(Format::Txt.supports_template());
        assert!(!Format::Json.supports_template());
        assert!(!Format::Csv.supports_template());
        assert!(!Format::Binary.supports_template());
    }

    #[test]
    fn test_json_predicate() {
        assert!(Format::Json.is_json());
        assert!(!Format::Html.is_json());
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(Format::Json.mime_type(), "application/json");
        assert_eq!(Format::Html.mime_type(), "text/html");
        assert_eq!(Format::Binary.mime_type(), "application/octet-stream");
    }

    #[test]
    fn test_serde_names() {
        let fmt: Format = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(fmt, Format::Json);
    }
}
