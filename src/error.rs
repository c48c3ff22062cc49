//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use std::fmt;
use thiserror::Error;

/// The generation step a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Description,
    Name,
    Details,
    Courses,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GenerationStage::Description => "description",
            GenerationStage::Name => "name",
            GenerationStage::Details => "ingredients, components, or instructions",
            GenerationStage::Courses => "courses",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to generate {0}.")]
    Generation(GenerationStage),
}

pub type Result<T> = std::result::Result<T, Error>;
