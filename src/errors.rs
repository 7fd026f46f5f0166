use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize)]
pub enum RenderError {
    #[error("File content requires a url or inline data: {0}")]
    MissingFileSource(String),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
