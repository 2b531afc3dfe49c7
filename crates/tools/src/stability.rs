//! Stability AI image generation client.

use {
    base64::Engine as _,
    reqwest::{Client, multipart::Form},
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

use crate::{Error, Result};

/// Stability API base URL.
pub const API_BASE: &str = "https://api.stability.ai";

/// Optional per-user generation settings, forwarded when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub output_format: Option<String>,
    pub aspect_ratio: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    image: String,
}

#[derive(Clone)]
pub struct StabilityClient {
    client: Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

impl std::fmt::Debug for StabilityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StabilityClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StabilityClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<Secret<String>>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.expose_secret().is_empty()),
        }
    }

    /// Read the key from `STABILITY_API_KEY`.
    #[must_use]
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let key = std::env::var("STABILITY_API_KEY").ok().map(Secret::new);
        Self::new(base_url, key)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn api_key(&self) -> Option<&Secret<String>> {
        self.api_key.as_ref()
    }

    /// Generate one image with Stable Diffusion 3 and return the decoded bytes.
    pub async fn generate_sd3(
        &self,
        api_key: &Secret<String>,
        prompt: &str,
        settings: &ImageSettings,
    ) -> Result<Vec<u8>> {
        let mut form = Form::new().text("prompt", prompt.to_string());
        for (name, value) in [
            ("output_format", &settings.output_format),
            ("aspect_ratio", &settings.aspect_ratio),
            ("model", &settings.model),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                form = form.text(name, value.to_string());
            }
        }

        let url = format!(
            "{}/v2beta/stable-image/generate/sd3",
            self.base_url.trim_end_matches('/')
        );
        debug!(url = %url, prompt_len = prompt.len(), "requesting stability image");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json; type=image/*")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Stability API error: {}, Message: {body}",
                status.as_u16()
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(e.to_string()))?;
        base64::engine::general_purpose::STANDARD
            .decode(data.image.as_bytes())
            .map_err(|e| Error::generation(format!("invalid image data: {e}")))
    }
}
