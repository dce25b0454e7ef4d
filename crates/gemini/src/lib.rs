//! Gemini REST client implementing the image generation gateway.
//!
//! Sends the source image and prompt to a Gemini image model
//! (`models/{model}:generateContent`) and extracts the returned inline image.

pub mod api;
pub mod config;
pub mod messages;

pub use api::{GeminiApi, GeminiError};
pub use config::GeminiConfig;
