/*!
Outbound sender.

Opens one connection to the peer, writes the whole payload and closes the
connection again. Nothing is retried; the caller decides what a failure
means.
*/

use std::io::{self, Write};
use std::net::{Shutdown, TcpStream};

use super::{check_cancelled, CancellationToken, Deadline, TransportConfig};
use crate::core::error::{Error, Result};
use crate::protocol::peer::PeerAddress;

/// Sends a single blob to the peer over a fresh TCP connection
#[derive(Debug, Clone, Default)]
pub struct OutboundSender {
    config: TransportConfig,
    cancel: Option<CancellationToken>,
}

impl OutboundSender {
    /// Create a sender with the given deadlines
    pub fn new(config: TransportConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Stop before connecting once `token` is triggered
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Connect to `peer`, write all of `payload` and close.
    ///
    /// A refused or failed connection is [`Error::PeerUnreachable`]. The
    /// socket is released on every path.
    pub fn send(&self, peer: &PeerAddress, payload: &[u8]) -> Result<()> {
        check_cancelled(self.cancel.as_ref())?;

        let mut stream = self.connect(peer)?;
        log::debug!("Connected to {}, writing {} bytes", peer, payload.len());

        stream.write_all(payload)?;
        stream.flush()?;

        // The peer learns the message is complete from the close.
        if let Err(e) = stream.shutdown(Shutdown::Write) {
            if e.kind() != io::ErrorKind::NotConnected {
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn connect(&self, peer: &PeerAddress) -> Result<TcpStream> {
        let unreachable = |source: io::Error| Error::PeerUnreachable {
            peer: peer.to_string(),
            source,
        };

        let addrs = peer.resolve().map_err(unreachable)?;
        let deadline = Deadline::start("connect", self.config.connect_timeout);

        let mut last_err = None;
        for addr in addrs {
            let attempt = match deadline.remaining()? {
                Some(remaining) => TcpStream::connect_timeout(&addr, remaining),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) if e.kind() == io::ErrorKind::TimedOut && deadline.is_bounded() => {
                    return Err(Error::timeout("connect", self.config.connect_timeout.unwrap_or_default()));
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(unreachable(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "peer address did not resolve")
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_send_delivers_whole_payload() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();

        let peer = thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            conn.read_to_end(&mut received).unwrap();
            received
        });

        let payload: Vec<u8> = (0..800u32).map(|i| (i % 251) as u8).collect();
        OutboundSender::default().send(&PeerAddress::new("127.0.0.1", port), &payload)?;

        assert_eq!(peer.join().unwrap(), payload);
        Ok(())
    }

    #[test]
    fn test_refused_connection_is_unreachable() -> Result<()> {
        // Bind then drop to find a port with nobody listening.
        let port = TcpListener::bind("127.0.0.1:0")?.local_addr()?.port();

        let result = OutboundSender::default().send(&PeerAddress::new("127.0.0.1", port), b"ek");
        match result {
            Err(Error::PeerUnreachable { peer, source }) => {
                assert_eq!(peer, format!("127.0.0.1:{}", port));
                assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
            }
            other => panic!("expected PeerUnreachable, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_cancelled_before_connect() {
        let token = CancellationToken::new();
        token.cancel();

        let sender = OutboundSender::default().with_cancellation(token);
        let result = sender.send(&PeerAddress::new("127.0.0.1", 9), b"ek");
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
