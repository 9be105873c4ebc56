use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON body returned by the generation service on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub output: GenerateOutput,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateOutput {
    /// Location of the packaged `.arfont` artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Any other artifact locations the service reports (atlas image, metrics, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
