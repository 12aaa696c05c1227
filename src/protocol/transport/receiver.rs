/*!
Inbound receiver.

Binds a listening socket, accepts exactly one connection and accumulates
bytes until the expected length is reached or the peer closes. A peer that
closes early yields a short buffer, not an error; the caller decides what
to do with it.
*/

use std::io::{self, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use bytes::{Bytes, BytesMut};

use super::{check_cancelled, CancellationToken, Deadline, TransportConfig};
use crate::core::constants::{ACCEPT_POLL_INTERVAL, READ_POLL_INTERVAL};
use crate::core::error::{Error, Result};

/// Largest single read into the accumulation buffer
const READ_CHUNK_SIZE: usize = 4096;

/// Receives one fixed-length message on a single accepted connection
#[derive(Debug, Clone, Default)]
pub struct InboundReceiver {
    config: TransportConfig,
    cancel: Option<CancellationToken>,
}

impl InboundReceiver {
    /// Create a receiver with the given deadlines
    pub fn new(config: TransportConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Stop waiting once `token` is triggered
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Bind the listening endpoint
    pub fn bind(host: &str, port: u16) -> Result<TcpListener> {
        Ok(TcpListener::bind((host, port))?)
    }

    /// Bind `host:listen_port`, accept one connection and read up to
    /// `expected_length` bytes from it.
    ///
    /// The result is shorter than `expected_length` when the peer closed
    /// early. Listener and connection are closed when this returns.
    pub fn receive_fixed_length(&self, host: &str, listen_port: u16, expected_length: usize) -> Result<Bytes> {
        let listener = Self::bind(host, listen_port)?;
        log::debug!("Listening on {}", listener.local_addr()?);
        self.accept_fixed_length(&listener, expected_length)
    }

    /// Accept one connection on an already bound listener and read up to
    /// `expected_length` bytes from it
    pub fn accept_fixed_length(&self, listener: &TcpListener, expected_length: usize) -> Result<Bytes> {
        let (mut stream, remote) = self.accept(listener)?;
        log::debug!("Accepted connection from {}", remote);

        let deadline = Deadline::start("read", self.config.read_timeout);
        let cancel = self.cancel.as_ref();
        let polling = deadline.is_bounded() || cancel.is_some();

        let received = accumulate(
            &mut stream,
            expected_length,
            |stream: &mut TcpStream| {
                check_cancelled(cancel)?;
                let remaining = deadline.remaining()?;
                if polling {
                    stream.set_read_timeout(self.read_poll_timeout(remaining))?;
                }
                Ok(())
            },
            |err| if polling { Ok(()) } else { Err(err.into()) },
        )?;

        if received.len() < expected_length {
            log::warn!(
                "Peer {} closed the connection after {} of {} bytes",
                remote,
                received.len(),
                expected_length
            );
        }
        Ok(received.freeze())
    }

    fn accept(&self, listener: &TcpListener) -> Result<(TcpStream, SocketAddr)> {
        let deadline = Deadline::start("accept", self.config.accept_timeout);
        if !deadline.is_bounded() && self.cancel.is_none() {
            return Ok(listener.accept()?);
        }

        listener.set_nonblocking(true)?;
        loop {
            check_cancelled(self.cancel.as_ref())?;
            match listener.accept() {
                Ok((stream, remote)) => {
                    stream.set_nonblocking(false)?;
                    return Ok((stream, remote));
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    deadline.remaining()?;
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    // Each read is bounded by the time left; a cancellable read also wakes
    // up periodically to look at the token.
    fn read_poll_timeout(&self, remaining: Option<Duration>) -> Option<Duration> {
        match (remaining, &self.cancel) {
            (Some(left), Some(_)) => Some(left.min(READ_POLL_INTERVAL)),
            (None, Some(_)) => Some(READ_POLL_INTERVAL),
            (left, None) => left,
        }
        .filter(|timeout| !timeout.is_zero())
    }
}

/// Read from `reader` until `expected_length` bytes have accumulated or it
/// reports end of stream. A short result means the stream ended early.
pub fn read_fixed_length<R: Read>(reader: &mut R, expected_length: usize) -> Result<Bytes> {
    accumulate(reader, expected_length, |_| Ok(()), |err| Err(err.into())).map(BytesMut::freeze)
}

// `before_read` runs ahead of every read and may end the receive.
// `on_idle` decides whether a timed-out read is retried or ends the receive.
fn accumulate<R, B, F>(reader: &mut R, expected_length: usize, mut before_read: B, mut on_idle: F) -> Result<BytesMut>
where
    R: Read,
    B: FnMut(&mut R) -> Result<()>,
    F: FnMut(io::Error) -> Result<()>,
{
    let mut buffer = BytesMut::with_capacity(expected_length);
    let mut chunk = vec![0u8; expected_length.min(READ_CHUNK_SIZE)];

    while buffer.len() < expected_length {
        before_read(reader)?;
        let wanted = (expected_length - buffer.len()).min(chunk.len());
        match reader.read(&mut chunk[..wanted]) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                on_idle(e)?;
            }
            Err(e) => return Err(Error::Io(e)),
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::time::Instant;

    // Hands out at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.step).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_accumulates_across_reads() -> Result<()> {
        let data: Vec<u8> = (0..768u32).map(|i| i as u8).collect();
        let mut reader = Trickle { data: data.clone(), pos: 0, step: 100 };

        let received = read_fixed_length(&mut reader, 768)?;
        assert_eq!(&received[..], &data[..]);
        Ok(())
    }

    #[test]
    fn test_stops_at_expected_length() -> Result<()> {
        let mut reader = Cursor::new(vec![0xAAu8; 1000]);
        let received = read_fixed_length(&mut reader, 768)?;
        assert_eq!(received.len(), 768);
        assert_eq!(reader.position(), 768);
        Ok(())
    }

    #[test]
    fn test_short_stream_returns_short_buffer() -> Result<()> {
        let mut reader = Cursor::new(vec![0x55u8; 300]);
        let received = read_fixed_length(&mut reader, 768)?;
        assert_eq!(received.len(), 300);
        Ok(())
    }

    #[test]
    fn test_zero_length_reads_nothing() -> Result<()> {
        let mut reader = Cursor::new(vec![1u8; 10]);
        assert!(read_fixed_length(&mut reader, 0)?.is_empty());
        assert_eq!(reader.position(), 0);
        Ok(())
    }

    #[test]
    fn test_accept_times_out_without_peer() -> Result<()> {
        let listener = InboundReceiver::bind("127.0.0.1", 0)?;
        let receiver = InboundReceiver::new(TransportConfig {
            accept_timeout: Some(Duration::from_millis(100)),
            ..TransportConfig::default()
        });

        let started = Instant::now();
        let result = receiver.accept_fixed_length(&listener, 768);
        assert!(matches!(result, Err(Error::Timeout { operation: "accept", .. })));
        assert!(started.elapsed() >= Duration::from_millis(100));
        Ok(())
    }

    #[test]
    fn test_read_times_out_on_silent_peer() -> Result<()> {
        let listener = InboundReceiver::bind("127.0.0.1", 0)?;
        let addr = listener.local_addr()?;
        let receiver = InboundReceiver::new(TransportConfig {
            read_timeout: Some(Duration::from_millis(100)),
            ..TransportConfig::default()
        });

        let peer = thread::spawn(move || {
            let mut conn = TcpStream::connect(addr).unwrap();
            conn.write_all(&[7u8; 10]).unwrap();
            thread::sleep(Duration::from_millis(500));
        });

        let result = receiver.accept_fixed_length(&listener, 768);
        assert!(matches!(result, Err(Error::Timeout { operation: "read", .. })));
        peer.join().unwrap();
        Ok(())
    }

    #[test]
    fn test_cancel_while_waiting_for_peer() -> Result<()> {
        let listener = InboundReceiver::bind("127.0.0.1", 0)?;
        let token = CancellationToken::new();
        let receiver = InboundReceiver::default().with_cancellation(token.clone());

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        });

        let result = receiver.accept_fixed_length(&listener, 768);
        assert!(matches!(result, Err(Error::Cancelled)));
        canceller.join().unwrap();
        Ok(())
    }

    // Writes one byte every `interval` until `count` bytes are out or the
    // receiver goes away.
    fn spawn_slow_peer(addr: SocketAddr, count: usize, interval: Duration) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut conn = TcpStream::connect(addr).unwrap();
            for _ in 0..count {
                if conn.write_all(&[0x5A]).is_err() {
                    break;
                }
                thread::sleep(interval);
            }
        })
    }

    #[test]
    fn test_read_deadline_covers_whole_message() -> Result<()> {
        let listener = InboundReceiver::bind("127.0.0.1", 0)?;
        let addr = listener.local_addr()?;
        let receiver = InboundReceiver::new(TransportConfig {
            read_timeout: Some(Duration::from_millis(300)),
            ..TransportConfig::default()
        });

        // Never silent for a full timeout window, but far too slow overall.
        let peer = spawn_slow_peer(addr, 40, Duration::from_millis(100));

        let started = Instant::now();
        let result = receiver.accept_fixed_length(&listener, 40);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(Error::Timeout { operation: "read", .. })), "{:?}", result);
        assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
        drop(listener);
        peer.join().unwrap();
        Ok(())
    }

    #[test]
    fn test_cancel_while_peer_is_sending() -> Result<()> {
        let listener = InboundReceiver::bind("127.0.0.1", 0)?;
        let addr = listener.local_addr()?;
        let token = CancellationToken::new();
        let receiver = InboundReceiver::default().with_cancellation(token.clone());

        let peer = spawn_slow_peer(addr, 40, Duration::from_millis(25));
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            token.cancel();
        });

        let started = Instant::now();
        let result = receiver.accept_fixed_length(&listener, 40);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(Error::Cancelled)), "{:?}", result);
        assert!(elapsed < Duration::from_millis(800), "took {:?}", elapsed);
        canceller.join().unwrap();
        peer.join().unwrap();
        Ok(())
    }
}
