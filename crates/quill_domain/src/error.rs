use thiserror::Error;

use crate::SourceId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Markdown transform failed: {0}")]
    Markdown(String),

    #[error("Math rendering failed: {0}")]
    Math(String),

    #[error("Syntax highlighting failed for language '{language}': {message}")]
    Highlight { language: String, message: String },

    #[error("Diagram compile failed: {0}")]
    DiagramCompile(String),

    #[error("Content source '{0}' not found")]
    SourceNotFound(SourceId),

    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("Invalid raw text payload: {0}")]
    InvalidPayload(String),
}

pub type Result<T> = std::result::Result<T, Error>;
