//! Capability schema advertised to the reasoning service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared name, description and JSON input schema of one capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySchema {
    /// Wire name the service must use when calling the capability
    pub name: String,

    /// Instructions shown to the service
    pub description: String,

    /// JSON Schema of the arguments object
    #[serde(rename = "parameters")]
    pub input_schema: Value,
}

impl CapabilitySchema {
    /// Create a schema entry
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
