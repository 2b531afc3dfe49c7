//! Stable Diffusion 3 platform tool: generate an image from a prompt and
//! publish it to object storage.

use std::sync::Arc;

use {
    async_trait::async_trait,
    chatlabs_store::ObjectStore,
    serde::Deserialize,
    tracing::{info, warn},
};

use crate::{
    Error, Result,
    platform::{
        PlatformTool, ResultProcessingMode, ToolDescriptor, ToolFunction, ToolInvocation,
        ToolOutput, ToolParameter,
    },
    stability::{ImageSettings, StabilityClient},
};

pub const TOOL_ID: &str = "b3f07a6e-5e01-423e-1f05-ee51830608dd";
pub const TOOL_NAME: &str = "stableDiffusion3";
pub const FUNCTION_ID: &str = "imageGenerationViaStableDiffusion3";
pub const MIN_PROMPT_LEN: usize = 10;

const FUNCTION_DESCRIPTION: &str = "Generate images using Stable Diffusion v3 based on a text description.
Returns the URL of the image. Never display the image in the response, nor include the link or url, it is handled in the frontend.
Never include image url in the response for generated images. Do not say you can't display image.
Do not use semi-colons when describing the image. Never use html, always use Markdown.
You should only return the function call in tools call sections.";

#[derive(Debug, Clone, Default, Deserialize)]
struct PromptParams {
    prompt: Option<String>,
}

/// Accepted parameter shapes: `{prompt}` or `{parameters: {prompt}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawParams {
    Wrapped { parameters: PromptParams },
    Flat(PromptParams),
}

/// Normalized image generation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGenerationRequest {
    pub prompt: Option<String>,
    pub settings: ImageSettings,
}

impl ImageGenerationRequest {
    pub fn from_invocation(invocation: ToolInvocation) -> Result<Self> {
        let params = if invocation.params.is_null() {
            PromptParams::default()
        } else {
            match serde_json::from_value(invocation.params) {
                Ok(RawParams::Wrapped { parameters }) => parameters,
                Ok(RawParams::Flat(params)) => params,
                Err(e) => return Err(Error::invalid_input(format!("invalid parameters: {e}"))),
            }
        };
        let settings = if invocation.settings.is_null() {
            ImageSettings::default()
        } else {
            serde_json::from_value(invocation.settings)
                .map_err(|e| Error::invalid_input(format!("invalid settings: {e}")))?
        };
        Ok(Self {
            prompt: params.prompt,
            settings,
        })
    }

    fn validated_prompt(&self) -> Result<&str> {
        let prompt = self
            .prompt
            .as_deref()
            .ok_or_else(|| Error::invalid_input("Prompt is required"))?;
        if prompt.chars().count() < MIN_PROMPT_LEN {
            return Err(Error::invalid_input(
                "Prompt must be at least 10 characters long",
            ));
        }
        Ok(prompt)
    }
}

/// Object key for a generated image: whitespace runs become `_`, path
/// separators are dropped.
#[must_use]
pub fn image_file_name(prompt: &str) -> String {
    let mut name = String::with_capacity(prompt.len() + 4);
    let mut in_space = false;
    for c in prompt.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c != '/' && c != '\\' {
            name.push(c);
        }
    }
    name.push_str(".png");
    name
}

#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        id: TOOL_ID.into(),
        name: "Stable Diffusion 3".into(),
        tool_name: TOOL_NAME.into(),
        version: "v1.0.0".into(),
        description: "Generate images using Stable Diffusion v3 based on a text description."
            .into(),
        tools_functions: vec![ToolFunction {
            id: FUNCTION_ID.into(),
            description: FUNCTION_DESCRIPTION.into(),
            result_processing_mode: ResultProcessingMode::RenderMarkdown,
            parameters: vec![ToolParameter {
                name: "prompt".into(),
                description: "The prompt, a detailed description, to generate an image from."
                    .into(),
                required: true,
                schema: serde_json::json!({ "type": "string" }),
            }],
        }],
    }
}

pub struct StableDiffusion3Tool {
    descriptor: ToolDescriptor,
    client: StabilityClient,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl StableDiffusion3Tool {
    pub fn new(
        client: StabilityClient,
        objects: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            descriptor: descriptor(),
            client,
            objects,
            bucket: bucket.into(),
        }
    }

    /// Validate, generate, upload. Returns the public image URL.
    pub async fn generate(&self, request: &ImageGenerationRequest) -> Result<String> {
        let api_key = self
            .client
            .api_key()
            .ok_or_else(|| Error::invalid_input("Stability API key is required"))?;
        let prompt = request.validated_prompt()?;

        let bytes = self
            .client
            .generate_sd3(api_key, prompt, &request.settings)
            .await
            .inspect_err(|e| warn!(error = %e, "image generation failed"))?;

        let key = image_file_name(prompt);
        self.objects
            .put(&self.bucket, &key, bytes)
            .await
            .map_err(|e| {
                warn!(bucket = %self.bucket, key = %key, error = %e, "image upload failed");
                Error::generation(format!("Storage upload error: {e}"))
            })?;

        let url = self.objects.public_url(&self.bucket, &key);
        info!(bucket = %self.bucket, key = %key, "generated image stored");
        Ok(url)
    }
}

#[async_trait]
impl PlatformTool for StableDiffusion3Tool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, function_id: &str, invocation: ToolInvocation) -> Result<ToolOutput> {
        if function_id != FUNCTION_ID {
            return Err(Error::UnknownFunction {
                tool_name: TOOL_NAME.into(),
                function_id: function_id.into(),
            });
        }
        let request = ImageGenerationRequest::from_invocation(invocation)?;
        let url = self.generate(&request).await?;
        Ok(ToolOutput {
            result: serde_json::Value::String(url),
            result_processing_mode: ResultProcessingMode::RenderMarkdown,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        chatlabs_store::MemoryObjectStore,
        rstest::rstest,
        secrecy::Secret,
        serde_json::json,
    };

    fn invocation(params: serde_json::Value) -> ToolInvocation {
        ToolInvocation {
            params,
            settings: serde_json::Value::Null,
        }
    }

    fn tool(base_url: &str, key: Option<&str>, objects: Arc<MemoryObjectStore>) -> StableDiffusion3Tool {
        StableDiffusion3Tool::new(
            StabilityClient::new(base_url, key.map(|k| Secret::new(k.to_string()))),
            objects,
            "generated_images",
        )
    }

    #[rstest]
    #[case(json!({ "prompt": "a castle on a hill" }))]
    #[case(json!({ "parameters": { "prompt": "a castle on a hill" } }))]
    fn both_parameter_shapes_normalize(#[case] params: serde_json::Value) {
        let request = ImageGenerationRequest::from_invocation(invocation(params)).unwrap();
        assert_eq!(request.prompt.as_deref(), Some("a castle on a hill"));
    }

    #[test]
    fn settings_are_parsed() {
        let request = ImageGenerationRequest::from_invocation(ToolInvocation {
            params: json!({ "prompt": "a castle on a hill" }),
            settings: json!({ "output_format": "png", "model": "sd3-large" }),
        })
        .unwrap();
        assert_eq!(request.settings.output_format.as_deref(), Some("png"));
        assert_eq!(request.settings.model.as_deref(), Some("sd3-large"));
        assert!(request.settings.aspect_ratio.is_none());
    }

    #[rstest]
    #[case("a  red\tfox", "a_red_fox.png")]
    #[case(" lead and trail ", "_lead_and_trail_.png")]
    #[case("cats/dogs at ../night", "catsdogs_at_..night.png")]
    fn file_names_collapse_whitespace(#[case] prompt: &str, #[case] expected: &str) {
        assert_eq!(image_file_name(prompt), expected);
    }

    #[tokio::test]
    async fn validation_runs_before_any_request() {
        let objects = Arc::new(MemoryObjectStore::default());
        // Unroutable base URL: any request would fail with a generation error.
        let no_key = tool("http://127.0.0.1:9", None, objects.clone());
        let err = no_key
            .invoke(FUNCTION_ID, invocation(json!({ "prompt": "a castle on a hill" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Stability API key is required");

        let keyed = tool("http://127.0.0.1:9", Some("k"), objects);
        let err = keyed
            .invoke(FUNCTION_ID, invocation(json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompt is required");

        let err = keyed
            .invoke(FUNCTION_ID, invocation(json!({ "prompt": "tiny" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Prompt must be at least 10 characters long");
    }

    #[tokio::test]
    async fn generates_uploads_and_returns_public_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2beta/stable-image/generate/sd3")
            .with_status(200)
            .with_body(r#"{"image":"iVBORw0KGgo="}"#)
            .create_async()
            .await;

        let objects = Arc::new(MemoryObjectStore::default());
        let sd3 = tool(&server.url(), Some("k"), objects.clone());
        let out = sd3
            .invoke(
                FUNCTION_ID,
                invocation(json!({ "parameters": { "prompt": "a castle on a hill" } })),
            )
            .await
            .unwrap();

        assert_eq!(
            out.result,
            json!("/storage/generated_images/a_castle_on_a_hill.png")
        );
        assert_eq!(out.result_processing_mode, ResultProcessingMode::RenderMarkdown);
        let stored = objects
            .get("generated_images", "a_castle_on_a_hill.png")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, b"\x89PNG\r\n\x1a\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_errors_are_wrapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2beta/stable-image/generate/sd3")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let sd3 = tool(&server.url(), Some("k"), Arc::new(MemoryObjectStore::default()));
        let err = sd3
            .invoke(FUNCTION_ID, invocation(json!({ "prompt": "a castle on a hill" })))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation { .. }));
        assert_eq!(err.to_string(), "Error: Stability API error: 500, Message: boom");
    }

    #[test]
    fn descriptor_matches_published_ids() {
        let d = descriptor();
        assert_eq!(d.id, TOOL_ID);
        assert_eq!(d.tool_name, "stableDiffusion3");
        let f = d.function(FUNCTION_ID).unwrap();
        assert!(f.parameters[0].required);
        assert_eq!(f.parameters[0].name, "prompt");
    }
}
