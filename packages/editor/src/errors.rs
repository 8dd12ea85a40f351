//! Error types for the editor

use thiserror::Error;

use crate::config::ConfigError;
use pagebuilder_model::ImportError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
