use std::io::Read;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Abis link errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbisError {
    /// No BSC host configured
    NoHosts,
    /// BSC host name could not be resolved
    Resolve(String),
    /// Transport could not be started
    Connect(String),
}

impl std::fmt::Display for AbisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbisError::NoHosts => write!(f, "no BSC host configured"),
            AbisError::Resolve(msg) => write!(f, "resolve failed: {}", msg),
            AbisError::Connect(msg) => write!(f, "connect failed: {}", msg),
        }
    }
}

impl std::error::Error for AbisError {}

/// Signalling link events reported by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// OML (and with it all RSL) signalling established
    SignLinkUp,
    /// Connection closed or could not be established
    SignLinkDown(String),
}

/// Connection to the BSC. `open` only starts establishment, the outcome is
/// reported through `poll_event`.
pub trait AbisTransport: Send {
    fn open(&mut self, host: &str, port: u16) -> Result<(), AbisError>;

    /// Next pending event, non-blocking
    fn poll_event(&mut self) -> Option<TransportEvent>;

    fn close(&mut self);
}

// ─── TCP transport ───

/// TCP transport. Connection and read loop run on a worker thread which
/// reports back over crossbeam channels.
pub struct TcpTransport {
    connect_timeout: Duration,
    event_receiver: Option<Receiver<TransportEvent>>,
    /// Clone of the worker's stream, used to unblock its read on close
    stream_receiver: Option<Receiver<TcpStream>>,
    stream: Option<TcpStream>,
    /// Raised by `close`, tells a worker still connecting to give up
    shutdown: Arc<AtomicBool>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            event_receiver: None,
            stream_receiver: None,
            stream: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            worker_handle: None,
        }
    }

    fn run_worker(
        addr: std::net::SocketAddr,
        timeout: Duration,
        shutdown: Arc<AtomicBool>,
        events: Sender<TransportEvent>,
        streams: Sender<TcpStream>,
    ) {
        let mut stream = match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = events.send(TransportEvent::SignLinkDown(format!("connect to {} failed: {}", addr, e)));
                return;
            }
        };
        // The clone is handed over before the flag is checked: a close() racing
        // with us either sees the clone or we see its flag
        if let Ok(clone) = stream.try_clone() {
            let _ = streams.send(clone);
        }
        if shutdown.load(Ordering::SeqCst) {
            tracing::debug!("TcpTransport: closed while connecting to {}, dropping connection", addr);
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
        tracing::info!("TcpTransport: connected to {}", addr);
        let _ = events.send(TransportEvent::SignLinkUp);

        // Message decoding is not done here, only track the connection
        let mut buf = [0u8; 2048];
        let reason = loop {
            match stream.read(&mut buf) {
                Ok(0) => break "connection closed".to_string(),
                Ok(n) => tracing::trace!("TcpTransport: {} bytes from {}", n, addr),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => break format!("read error: {}", e),
            }
        };
        let _ = events.send(TransportEvent::SignLinkDown(reason));
    }
}

impl AbisTransport for TcpTransport {
    fn open(&mut self, host: &str, port: u16) -> Result<(), AbisError> {
        self.close();

        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| AbisError::Resolve(format!("{}: {}", host, e)))?
            .next()
            .ok_or_else(|| AbisError::Resolve(format!("{}: no address", host)))?;

        let (event_sender, event_receiver) = unbounded::<TransportEvent>();
        let (stream_sender, stream_receiver) = unbounded::<TcpStream>();
        let timeout = self.connect_timeout;
        let shutdown = Arc::new(AtomicBool::new(false));
        self.shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name("abis-tcp".to_string())
            .spawn(move || Self::run_worker(addr, timeout, shutdown, event_sender, stream_sender))
            .map_err(|e| AbisError::Connect(format!("failed to spawn worker: {}", e)))?;

        tracing::debug!("TcpTransport: connecting to {}", addr);
        self.event_receiver = Some(event_receiver);
        self.stream_receiver = Some(stream_receiver);
        self.worker_handle = Some(handle);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        if self.stream.is_none() {
            if let Some(rx) = &self.stream_receiver {
                self.stream = rx.try_recv().ok();
            }
        }
        self.event_receiver.as_ref()?.try_recv().ok()
    }

    fn close(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if self.stream.is_none() {
            if let Some(rx) = &self.stream_receiver {
                self.stream = rx.try_recv().ok();
            }
        }
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.event_receiver = None;
        self.stream_receiver = None;
        // A worker still inside connect_timeout sees the flag once it returns
        if let Some(handle) = self.worker_handle.take_if(|h| h.is_finished()) {
            let _ = handle.join();
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        let handle = self.worker_handle.take();
        self.close();

        // Shutdown unblocks the read, give the worker a moment to wind down
        if let Some(handle) = handle {
            let timeout = Duration::from_secs(3);
            let start = std::time::Instant::now();
            loop {
                if handle.is_finished() {
                    let _ = handle.join();
                    tracing::debug!("TcpTransport: worker thread joined");
                    break;
                }
                if start.elapsed() >= timeout {
                    tracing::warn!("TcpTransport: worker thread did not finish in time, abandoning");
                    break;
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Instant;

    use super::*;

    fn wait_event(t: &mut TcpTransport) -> Option<TransportEvent> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if let Some(ev) = t.poll_event() {
                return Some(ev);
            }
            thread::sleep(Duration::from_millis(10));
        }
        None
    }

    #[test]
    fn test_tcp_up_and_down() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut t = TcpTransport::new(Duration::from_secs(2));
        t.open("127.0.0.1", port).unwrap();
        let (peer, _) = listener.accept().unwrap();
        assert_eq!(wait_event(&mut t), Some(TransportEvent::SignLinkUp));

        drop(peer);
        assert!(matches!(wait_event(&mut t), Some(TransportEvent::SignLinkDown(_))));
        t.close();
    }

    #[test]
    fn test_tcp_close_while_connecting() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut t = TcpTransport::new(Duration::from_secs(2));
        t.open("127.0.0.1", port).unwrap();
        t.close();

        // Whichever side wins the race, the connection must not stay open
        let (mut peer, _) = listener.accept().unwrap();
        peer.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(peer.read(&mut buf).unwrap(), 0);
        assert_eq!(t.poll_event(), None);
    }

    #[test]
    fn test_tcp_refused() {
        // Grab a free port, then release it so nobody listens
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let mut t = TcpTransport::new(Duration::from_secs(2));
        t.open("127.0.0.1", port).unwrap();
        assert!(matches!(wait_event(&mut t), Some(TransportEvent::SignLinkDown(_))));
    }

    #[test]
    fn test_tcp_resolve_error() {
        let mut t = TcpTransport::new(Duration::from_secs(1));
        assert!(matches!(t.open("no such host.invalid", 3002), Err(AbisError::Resolve(_))));
    }
}
