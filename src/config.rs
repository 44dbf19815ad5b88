//! Context configuration

use serde::{Deserialize, Serialize};

use crate::error::VmError;

/// Flash's own recursion limit
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Settings of an execution context.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// let config = asvm::VmConfig::from_json(r#"{ "version": 6 }"#).unwrap();
/// assert_eq!(config.version, 6);
/// assert_eq!(config.max_call_depth, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    /// SWF version of the context. Gates coercions and builtin visibility.
    pub version: u8,
    /// Maximum number of nested frames
    pub max_call_depth: usize,
    /// Override property-name case sensitivity; by default names are
    /// case-insensitive below version 7
    pub case_sensitive: Option<bool>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            version: 7,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            case_sensitive: None,
        }
    }
}

impl VmConfig {
    pub fn with_version(version: u8) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, VmError> {
        let config: VmConfig =
            serde_json::from_str(json).map_err(|e| VmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, VmError> {
        serde_json::to_string_pretty(self).map_err(|e| VmError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), VmError> {
        if self.version == 0 {
            return Err(VmError::Config("version must be at least 1".to_string()));
        }
        if self.max_call_depth == 0 {
            return Err(VmError::Config(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether property names compare case-sensitively
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(self.version >= 7)
    }
}
