use crate::domain::{Color, Dimming};
use serde::Serialize;

/// The bulbs accept any id and echo it back, a constant is enough for a single requester.
const REQUEST_ID: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BulbCommand {
    GetPilot,
    SetPilot { color: Color, dimming: Dimming },
}

impl BulbCommand {
    pub fn method(&self) -> &'static str {
        match self {
            BulbCommand::GetPilot => "getPilot",
            BulbCommand::SetPilot { .. } => "setPilot",
        }
    }
}

// API: {"id":1,"method":"setPilot","params":{"r":255,"g":128,"b":0,"dimming":80}}
#[derive(Debug, Serialize)]
pub struct PilotRequest {
    id: u32,
    method: &'static str,
    params: PilotParams,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum PilotParams {
    Empty {},
    Rgb { r: u8, g: u8, b: u8, dimming: Dimming },
}

impl From<BulbCommand> for PilotRequest {
    fn from(command: BulbCommand) -> Self {
        let params = match command {
            BulbCommand::GetPilot => PilotParams::Empty {},
            BulbCommand::SetPilot { color, dimming } => PilotParams::Rgb {
                r: color.r,
                g: color.g,
                b: color.b,
                dimming,
            },
        };

        PilotRequest {
            id: REQUEST_ID,
            method: command.method(),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn encodes_get_pilot() -> Result<(), serde_json::Error> {
        let request = PilotRequest::from(BulbCommand::GetPilot);

        assert_eq!(serde_json::to_string(&request)?, r#"{"id":1,"method":"getPilot","params":{}}"#);
        Ok(())
    }

    #[test]
    fn encodes_set_pilot() -> Result<(), serde_json::Error> {
        let request = PilotRequest::from(BulbCommand::SetPilot {
            color: Color::new(255, 128, 0),
            dimming: Dimming::new(80).unwrap(),
        });

        assert_eq!(
            serde_json::to_value(&request)?,
            json!({"id": 1, "method": "setPilot", "params": {"r": 255, "g": 128, "b": 0, "dimming": 80}})
        );
        Ok(())
    }

    #[test]
    fn keeps_the_reference_field_order() -> Result<(), serde_json::Error> {
        let request = PilotRequest::from(BulbCommand::SetPilot {
            color: Color::new(1, 2, 3),
            dimming: Dimming::new(10).unwrap(),
        });

        assert_eq!(
            serde_json::to_string(&request)?,
            r#"{"id":1,"method":"setPilot","params":{"r":1,"g":2,"b":3,"dimming":10}}"#
        );
        Ok(())
    }
}
