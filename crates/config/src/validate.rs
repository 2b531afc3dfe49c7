//! Semantic checks on a loaded configuration.

use crate::schema::ChatLabsConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "server.port"
    pub path: &'static str,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.path, self.message)
    }
}

/// Validate a configuration. An empty result means the config is usable as-is.
#[must_use]
pub fn validate(config: &ChatLabsConfig) -> Vec<Diagnostic> {
    let mut out = Vec::new();

    if config.server.port == 0 {
        out.push(Diagnostic {
            severity: Severity::Warning,
            path: "server.port",
            message: "port 0 binds a random port".into(),
        });
    }
    if config.limits.assistant_image_concurrency == 0 {
        out.push(Diagnostic {
            severity: Severity::Error,
            path: "limits.assistant_image_concurrency",
            message: "must be at least 1".into(),
        });
    }
    if config.share.brand_name.trim().is_empty() {
        out.push(Diagnostic {
            severity: Severity::Warning,
            path: "share.brand_name",
            message: "empty brand name renders a blank share banner".into(),
        });
    }
    if !is_http_url(&config.share.brand_url) {
        out.push(Diagnostic {
            severity: Severity::Error,
            path: "share.brand_url",
            message: format!("expected an http(s) URL, got {:?}", config.share.brand_url),
        });
    }
    if !is_http_url(&config.image_generation.api_base_url) {
        out.push(Diagnostic {
            severity: Severity::Error,
            path: "image_generation.api_base_url",
            message: format!(
                "expected an http(s) URL, got {:?}",
                config.image_generation.api_base_url
            ),
        });
    }
    if !config.auth.login_path.starts_with('/') {
        out.push(Diagnostic {
            severity: Severity::Error,
            path: "auth.login_path",
            message: "must be an absolute path".into(),
        });
    }

    out
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_clean() {
        assert!(validate(&ChatLabsConfig::default()).is_empty());
    }

    #[test]
    fn reports_zero_concurrency_and_bad_urls() {
        let mut cfg = ChatLabsConfig::default();
        cfg.limits.assistant_image_concurrency = 0;
        cfg.share.brand_url = "labs.example.com".into();
        cfg.auth.login_path = "login".into();

        let diags = validate(&cfg);
        let paths: Vec<_> = diags.iter().map(|d| d.path).collect();
        assert_eq!(paths, [
            "limits.assistant_image_concurrency",
            "share.brand_url",
            "auth.login_path"
        ]);
        assert!(diags.iter().all(|d| d.severity == Severity::Error));
    }
}
