//! Built-in platform tools callable from chat.
//!
//! Tools: Stable Diffusion 3 image generation.

pub mod error;
pub mod image_generation;
pub mod platform;
pub mod stability;

pub use {
    error::{Error, Result},
    image_generation::{ImageGenerationRequest, StableDiffusion3Tool},
    platform::{
        PlatformTool, ResultProcessingMode, ToolDescriptor, ToolFunction, ToolInvocation,
        ToolOutput, ToolParameter, ToolRegistry,
    },
    stability::{ImageSettings, StabilityClient},
};
