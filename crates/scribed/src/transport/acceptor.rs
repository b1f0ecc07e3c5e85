use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use scribe_config::SocketEndpoint;

use super::{ClientConnection, ConnectionHandler, TRANSPORT_TARGET, TransportError};

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};

/// Pause after a failed `accept` so a persistent error (say, EMFILE) does
/// not spin the thread.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);
const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

enum Socket {
    Tcp(TcpListener, SocketAddr),
    #[cfg(unix)]
    Unix(UnixListener, Utf8PathBuf),
}

/// Endpoint the daemon owns but is not yet accepting on.
pub(crate) struct Acceptor {
    endpoint: SocketEndpoint,
    socket: Socket,
}

impl Acceptor {
    /// Claims `endpoint`. A Unix socket file left behind by a dead daemon is
    /// removed first; a live one, or a path that is not a socket, is not.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, TransportError> {
        let bind_failed = |source| TransportError::Bind {
            endpoint: endpoint.to_string(),
            source,
        };
        let socket = match endpoint {
            SocketEndpoint::Tcp { host, port } => {
                let listener = TcpListener::bind((host.as_str(), *port)).map_err(bind_failed)?;
                let address = listener.local_addr().map_err(bind_failed)?;
                Socket::Tcp(listener, address)
            }
            #[cfg(unix)]
            SocketEndpoint::Unix(path) => {
                reclaim_socket_path(endpoint, path)?;
                let listener = UnixListener::bind(path).map_err(bind_failed)?;
                Socket::Unix(listener, path.clone())
            }
            #[cfg(not(unix))]
            SocketEndpoint::Unix(_) => {
                return Err(bind_failed(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix sockets are not available on this platform",
                )));
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// Bound TCP address, which differs from the configured one when port 0
    /// was requested.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            Socket::Tcp(_, address) => Some(*address),
            #[cfg(unix)]
            Socket::Unix(..) => None,
        }
    }

    /// Moves the accept loop onto its own thread.
    pub(crate) fn serve(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<Serving, TransportError> {
        let stopping = Arc::new(AtomicBool::new(false));
        let wake = self.wake_target();
        let flag = Arc::clone(&stopping);
        let thread = thread::Builder::new()
            .name("scribed-accept".to_owned())
            .spawn(move || self.accept_until_stopped(&flag, &handler))
            .map_err(|source| TransportError::Spawn { source })?;
        Ok(Serving {
            stopping,
            wake,
            thread: Some(thread),
        })
    }

    fn wake_target(&self) -> WakeTarget {
        match &self.socket {
            Socket::Tcp(_, address) => WakeTarget::Tcp(loopback_for(*address)),
            #[cfg(unix)]
            Socket::Unix(_, path) => WakeTarget::Unix(path.clone()),
        }
    }

    fn accept_until_stopped(self, stopping: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(target: TRANSPORT_TARGET, endpoint = %self.endpoint, "accepting connections");
        loop {
            let accepted = self.accept();
            if stopping.load(Ordering::Acquire) {
                break;
            }
            match accepted {
                Ok(connection) => hand_off(handler, connection),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => {
                    warn!(target: TRANSPORT_TARGET, %error, "accept failed");
                    thread::sleep(ACCEPT_RETRY_DELAY);
                }
            }
        }
        self.release();
        debug!(target: TRANSPORT_TARGET, endpoint = %self.endpoint, "accept loop finished");
    }

    fn accept(&self) -> io::Result<ClientConnection> {
        match &self.socket {
            Socket::Tcp(listener, _) => listener
                .accept()
                .map(|(stream, peer)| ClientConnection::new(peer.to_string(), stream)),
            #[cfg(unix)]
            Socket::Unix(listener, _) => listener
                .accept()
                .map(|(stream, _)| ClientConnection::new("unix", stream)),
        }
    }

    /// Unlinks the Unix socket file so the next daemon finds a clean path.
    fn release(&self) {
        #[cfg(unix)]
        {
            if let Socket::Unix(_, path) = &self.socket
                && let Err(error) = fs::remove_file(path)
                && error.kind() != io::ErrorKind::NotFound
            {
                warn!(target: TRANSPORT_TARGET, %error, %path, "failed to remove socket file");
            }
        }
    }
}

/// The running accept thread. Dropping it asks the thread to stop without
/// waiting for it.
pub(crate) struct Serving {
    stopping: Arc<AtomicBool>,
    wake: WakeTarget,
    thread: Option<JoinHandle<()>>,
}

impl Serving {
    /// Stops accepting and waits for the accept thread. Clients already
    /// handed off finish on their own threads.
    pub(crate) fn stop(mut self) -> Result<(), TransportError> {
        self.request_stop();
        self.thread
            .take()
            .map_or(Ok(()), |thread| thread.join().map_err(|_| TransportError::Panicked))
    }

    fn request_stop(&self) {
        if !self.stopping.swap(true, Ordering::AcqRel) {
            self.wake.dial();
        }
    }
}

impl Drop for Serving {
    fn drop(&mut self) {
        self.request_stop();
    }
}

enum WakeTarget {
    Tcp(SocketAddr),
    #[cfg(unix)]
    Unix(Utf8PathBuf),
}

impl WakeTarget {
    fn dial(&self) {
        let outcome = match self {
            Self::Tcp(address) => TcpStream::connect_timeout(address, WAKE_TIMEOUT).map(drop),
            #[cfg(unix)]
            Self::Unix(path) => UnixStream::connect(path).map(drop),
        };
        if let Err(error) = outcome {
            warn!(target: TRANSPORT_TARGET, %error, "failed to wake the accept thread");
        }
    }
}

/// A wildcard bind address cannot be dialled portably; use loopback.
fn loopback_for(address: SocketAddr) -> SocketAddr {
    let ip = match address.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, address.port())
}

fn hand_off(handler: &Arc<dyn ConnectionHandler>, connection: ClientConnection) {
    let handler = Arc::clone(handler);
    if let Err(error) = thread::Builder::new()
        .name("scribed-client".to_owned())
        .spawn(move || handler.handle(connection))
    {
        warn!(target: TRANSPORT_TARGET, %error, "failed to spawn client thread");
    }
}

#[cfg(unix)]
fn reclaim_socket_path(endpoint: &SocketEndpoint, path: &Utf8Path) -> Result<(), TransportError> {
    let occupied = |reason| TransportError::Occupied {
        endpoint: endpoint.to_string(),
        reason,
    };
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(TransportError::Bind {
                endpoint: endpoint.to_string(),
                source,
            });
        }
    };
    if !metadata.file_type().is_socket() {
        return Err(occupied("the path exists and is not a socket"));
    }
    if UnixStream::connect(path).is_ok() {
        return Err(occupied("another process is listening on it"));
    }
    debug!(target: TRANSPORT_TARGET, %path, "removing stale socket file");
    fs::remove_file(path).map_err(|source| TransportError::Bind {
        endpoint: endpoint.to_string(),
        source,
    })
}
