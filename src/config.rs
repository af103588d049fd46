//! Application configuration: active profile, token defaults, login URLs, ports.

use serde::{Deserialize, Serialize};

/// A secondary service port with its own router.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamedPort {
    pub name: String,
    pub port: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Active environment profile, matched against per-class/per-method
    /// profile requirements.
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Development mode: template probes re-run on every request so edits
    /// to templates are picked up without a restart.
    #[serde(default)]
    pub dev_mode: bool,
    /// Default request-parameter name for the double-submission token.
    #[serde(default = "default_dsp_token")]
    pub dsp_token: String,
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Login URL served to AJAX requests; falls back to `login_url`.
    #[serde(default)]
    pub ajax_login_url: Option<String>,
    #[serde(default)]
    pub named_ports: Vec<NamedPort>,
}

fn default_profile() -> String {
    "prod".to_string()
}

fn default_dsp_token() -> String {
    "dsp_token".to_string()
}

fn default_login_url() -> String {
    "/login".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            dev_mode: false,
            dsp_token: default_dsp_token(),
            login_url: default_login_url(),
            ajax_login_url: None,
            named_ports: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn ajax_login_url(&self) -> &str {
        self.ajax_login_url.as_deref().unwrap_or(&self.login_url)
    }

    /// Whether a profile requirement is satisfied by the active profile.
    /// `None` always matches; a leading `!` negates the requirement.
    pub fn profile_matches(&self, required: Option<&str>) -> bool {
        match required {
            None => true,
            Some(req) => match req.strip_prefix('!') {
                Some(negated) => !negated.eq_ignore_ascii_case(&self.profile),
                None => req.eq_ignore_ascii_case(&self.profile),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_matching() {
        let config = AppConfig {
            profile: "dev".to_string(),
            ..AppConfig::default()
        };
        assert!(config.profile_matches(None));
        assert!(config.profile_matches(Some("dev")));
        assert!(config.profile_matches(Some("DEV")));
        assert!(!config.profile_matches(Some("prod")));
        assert!(config.profile_matches(Some("!prod")));
        assert!(!config.profile_matches(Some("!dev")));
    }

    #[test]
    fn test_ajax_login_url_fallback() {
        let mut config = AppConfig::default();
        assert_eq!(config.ajax_login_url(), "/login");
        config.ajax_login_url = Some("/ajax/login".to_string());
        assert_eq!(config.ajax_login_url(), "/ajax/login");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.profile, "prod");
        assert_eq!(config.dsp_token, "dsp_token");
        assert!(!config.dev_mode);
        assert!(config.named_ports.is_empty());
    }
}
