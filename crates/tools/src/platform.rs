//! Platform tool descriptors and the registry that dispatches invocations.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::{Error, Result};

/// How the chat UI presents a function result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultProcessingMode {
    RenderMarkdown,
    SendToLlm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub schema: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolFunction {
    pub id: String,
    pub description: String,
    pub result_processing_mode: ResultProcessingMode,
    pub parameters: Vec<ToolParameter>,
}

/// Public description of a built-in tool, as listed to the chat UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    pub tool_name: String,
    pub version: String,
    pub description: String,
    pub tools_functions: Vec<ToolFunction>,
}

impl ToolDescriptor {
    #[must_use]
    pub fn function(&self, function_id: &str) -> Option<&ToolFunction> {
        self.tools_functions.iter().find(|f| f.id == function_id)
    }
}

/// Body of a tool invocation: function parameters plus per-user settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolInvocation {
    pub params: serde_json::Value,
    pub settings: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    pub result: serde_json::Value,
    pub result_processing_mode: ResultProcessingMode,
}

#[async_trait]
pub trait PlatformTool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn invoke(&self, function_id: &str, invocation: ToolInvocation) -> Result<ToolOutput>;
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn PlatformTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn PlatformTool>) {
        self.tools.push(tool);
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor().clone()).collect()
    }

    #[must_use]
    pub fn get(&self, tool_name: &str) -> Option<&Arc<dyn PlatformTool>> {
        self.tools
            .iter()
            .find(|t| t.descriptor().tool_name == tool_name)
    }

    pub async fn invoke(
        &self,
        tool_name: &str,
        function_id: &str,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput> {
        let tool = self.get(tool_name).ok_or_else(|| Error::UnknownTool {
            tool_name: tool_name.to_string(),
        })?;
        if tool.descriptor().function(function_id).is_none() {
            return Err(Error::UnknownFunction {
                tool_name: tool_name.to_string(),
                function_id: function_id.to_string(),
            });
        }
        debug!(tool_name, function_id, "invoking platform tool");
        tool.invoke(function_id, invocation).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        descriptor: ToolDescriptor,
    }

    #[async_trait]
    impl PlatformTool for Echo {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn invoke(&self, _function_id: &str, invocation: ToolInvocation) -> Result<ToolOutput> {
            Ok(ToolOutput {
                result: invocation.params,
                result_processing_mode: ResultProcessingMode::SendToLlm,
            })
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo {
            descriptor: ToolDescriptor {
                id: "echo-id".into(),
                name: "Echo".into(),
                tool_name: "echo".into(),
                version: "v1.0.0".into(),
                description: "Echoes input".into(),
                tools_functions: vec![ToolFunction {
                    id: "echoBack".into(),
                    description: "Echo".into(),
                    result_processing_mode: ResultProcessingMode::SendToLlm,
                    parameters: vec![],
                }],
            },
        }));
        registry
    }

    #[tokio::test]
    async fn dispatches_to_known_function() {
        let out = registry()
            .invoke("echo", "echoBack", ToolInvocation {
                params: serde_json::json!({ "x": 1 }),
                settings: serde_json::Value::Null,
            })
            .await
            .unwrap();
        assert_eq!(out.result["x"], 1);
    }

    #[tokio::test]
    async fn rejects_unknown_tool_and_function() {
        let r = registry();
        assert!(matches!(
            r.invoke("nope", "echoBack", ToolInvocation::default())
                .await
                .unwrap_err(),
            Error::UnknownTool { .. }
        ));
        assert!(matches!(
            r.invoke("echo", "nope", ToolInvocation::default())
                .await
                .unwrap_err(),
            Error::UnknownFunction { .. }
        ));
    }

    #[test]
    fn descriptors_serialize_in_camel_case() {
        let json = serde_json::to_value(registry().descriptors()).unwrap();
        assert_eq!(json[0]["toolName"], "echo");
        assert_eq!(
            json[0]["toolsFunctions"][0]["resultProcessingMode"],
            "send_to_llm"
        );
    }
}
