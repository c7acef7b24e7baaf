mod bulb_target;
mod client;
mod domain;
#[cfg(test)]
pub mod mock_bulb;

pub use bulb_target::BulbTarget;
pub use client::{ProtocolError, WizClient};
