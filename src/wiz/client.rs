use crate::domain::{Color, Dimming};
use crate::wiz::BulbTarget;
use crate::wiz::domain::{BulbCommand, PilotRequest, PilotResponse};
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

const RECEIVE_BUFFER_SIZE: usize = 2048;

/// Talks to WiZ bulbs over their local UDP JSON protocol. Owns a single socket, dropping the client closes it.
#[derive(Debug)]
pub struct WizClient {
    socket: UdpSocket,
}

impl WizClient {
    pub async fn bind() -> Result<Self, ProtocolError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(ProtocolError::Bind)?;
        debug!(local_addr = ?socket.local_addr().ok(), "Bound bulb socket");
        Ok(WizClient { socket })
    }

    /// Asks the bulb for its pilot and waits up to `wait` for a reply carrying a result.
    /// Never fails, every problem reads as an unreachable bulb.
    #[instrument(skip_all, fields(bulb = %target))]
    pub async fn test_connection(&self, target: &BulbTarget, wait: Duration) -> bool {
        info!("💡 Testing connection to bulb {}...", target);

        if let Err(e) = self.send(target, BulbCommand::GetPilot).await {
            warn!("💡 Testing connection to bulb {}... failed, {}", target, e);
            return false;
        }

        let mut buffer = [0u8; RECEIVE_BUFFER_SIZE];
        let (len, from) = match timeout(wait, self.socket.recv_from(&mut buffer)).await {
            Ok(Ok(received)) => received,
            Ok(Err(e)) => {
                warn!("💡 Testing connection to bulb {}... failed, {}", target, e);
                return false;
            }
            Err(_) => {
                warn!("💡 Testing connection to bulb {}... failed, no reply within {:?}", target, wait);
                return false;
            }
        };

        debug!(%from, payload = %String::from_utf8_lossy(&buffer[..len]), "Received reply");
        match PilotResponse::from_slice(&buffer[..len]) {
            Ok(response) if response.is_success() => {
                info!("💡 Testing connection to bulb {}... OK", target);
                true
            }
            Ok(response) => {
                let reason = response.error.map_or("no result".to_string(), |e| format!("{} ({})", e.message, e.code));
                warn!("💡 Testing connection to bulb {}... failed, {}", target, reason);
                false
            }
            Err(e) => {
                warn!("💡 Testing connection to bulb {}... failed, unreadable reply: {}", target, e);
                false
            }
        }
    }

    /// Sends a single `setPilot` without waiting for an answer. A lost datagram goes unnoticed.
    pub async fn set_color(&self, target: &BulbTarget, color: Color, dimming: Dimming) -> Result<(), ProtocolError> {
        self.send(target, BulbCommand::SetPilot { color, dimming }).await
    }

    async fn send(&self, target: &BulbTarget, command: BulbCommand) -> Result<(), ProtocolError> {
        let payload = serde_json::to_vec(&PilotRequest::from(command))?;
        debug!(bulb = %target, payload = %String::from_utf8_lossy(&payload), "Sending {}", command.method());

        self.socket
            .send_to(&payload, target.socket_addr())
            .await
            .map_err(|source| ProtocolError::Transmit {
                method: command.method(),
                target: target.to_string(),
                source,
            })?;

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("unable to bind UDP socket: {0}")]
    Bind(#[source] io::Error),
    #[error("unable to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("unable to send {method} to {target}: {source}")]
    Transmit {
        method: &'static str,
        target: String,
        source: io::Error,
    },
}
