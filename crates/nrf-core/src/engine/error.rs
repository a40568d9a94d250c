use super::config::ConfigError;
use crate::core::models::material::MaterialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Material mismatch: {0}")]
    MaterialMismatch(String),

    #[error("No usable input: {0}")]
    EmptyInput(String),

    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),
}

impl From<MaterialError> for EngineError {
    fn from(e: MaterialError) -> Self {
        EngineError::MaterialMismatch(e.to_string())
    }
}
