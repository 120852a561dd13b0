//! TCP liveness probe

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::traits::PortProbe;

/// Connect-based probe: a port counts as bound when a connect succeeds
#[derive(Debug, Clone)]
pub struct RealPortProbe {
    connect_timeout: Duration,
}

impl RealPortProbe {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_millis(500),
        }
    }
}

impl Default for RealPortProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortProbe for RealPortProbe {
    async fn is_listening(&self, addr: SocketAddr) -> bool {
        matches!(
            tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_bound_port_is_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert!(RealPortProbe::new().is_listening(addr).await);
    }

    #[tokio::test]
    async fn test_released_port_is_not_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(!RealPortProbe::new().is_listening(addr).await);
    }
}
