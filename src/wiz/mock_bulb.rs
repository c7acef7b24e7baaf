use crate::wiz::BulbTarget;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

pub const PILOT_REPLY: &str = r#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50000000","rssi":-58,"state":true,"sceneId":0,"dimming":100}}"#;

/// A local UDP socket standing in for a bulb.
pub struct MockBulb {
    socket: UdpSocket,
}

impl MockBulb {
    pub async fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("could not bind mock bulb");
        MockBulb { socket }
    }

    pub fn target(&self) -> BulbTarget {
        let port = self.socket.local_addr().expect("mock bulb has no local address").port();
        BulbTarget::new("127.0.0.1").with_port(port)
    }

    /// Waits up to `wait` for the next datagram and decodes it.
    pub async fn recv_json(&self, wait: Duration) -> Option<(Value, SocketAddr)> {
        let mut buffer = [0u8; 1024];
        let (len, from) = timeout(wait, self.socket.recv_from(&mut buffer)).await.ok()?.ok()?;
        let value = serde_json::from_slice(&buffer[..len]).expect("received invalid JSON");
        Some((value, from))
    }

    pub async fn reply(&self, to: SocketAddr, payload: &str) {
        self.socket.send_to(payload.as_bytes(), to).await.expect("could not reply");
    }

    /// Receives one request and answers it like a healthy bulb, returns the request.
    pub async fn answer(&self, wait: Duration) -> Option<Value> {
        let (request, from) = self.recv_json(wait).await?;
        self.reply(from, PILOT_REPLY).await;
        Some(request)
    }
}
