//! Dish generator - turns a free-text idea and style weights into a menu item
//!
//! Sequences OpenAI-compatible text and image generation calls to produce a
//! dish name, description, ingredients, components, instructions and image,
//! and serves the result over a small HTTP API.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod sections;
pub mod server;

pub use error::{Error, GenerationStage, Result};
