//! Request file handling for the CLI.

pub use fnsync_config::{ConfigError, FunctionConfig};

use std::path::Path;

use fnsync::ReconcileRequest;

/// Load and validate a request file.
pub fn load(path: &Path) -> Result<ReconcileRequest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    let spec = FunctionConfig::from_json(&content)?.into_spec()?;
    Ok(ReconcileRequest::from_spec(&spec)?)
}
