use serde::Deserialize;
use serde_json::{Map, Value};

// Replies look like {"method":"getPilot","env":"pro","result":{"mac":"...","state":true,...}}
// or {"method":"getPilot","id":1,"error":{"code":-32601,"message":"Method not found"}}
// Only the presence of `result` matters, everything else is read leniently.
#[derive(Debug)]
pub struct PilotResponse {
    has_result: bool,
    pub error: Option<WizError>,
}

#[derive(Debug, Deserialize)]
pub struct WizError {
    pub code: i64,
    pub message: String,
}

impl PilotResponse {
    /// Fails only when the payload is not a JSON object.
    pub fn from_slice(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let object: Map<String, Value> = serde_json::from_slice(payload)?;

        Ok(PilotResponse {
            has_result: object.contains_key("result"),
            error: object.get("error").and_then(|error| WizError::deserialize(error).ok()),
        })
    }

    /// A reply counts as a success as soon as it carries a `result` key, whatever its content.
    pub fn is_success(&self) -> bool {
        self.has_result
    }
}
