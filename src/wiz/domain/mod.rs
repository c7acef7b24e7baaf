mod pilot_request;
mod pilot_response;

pub use pilot_request::{BulbCommand, PilotRequest};
pub use pilot_response::PilotResponse;
