//! Accepting daemon connections.
//!
//! [`Acceptor::bind`] claims the configured endpoint and [`Acceptor::serve`]
//! blocks in `accept` on a named thread, handing every client to a
//! [`ConnectionHandler`] on a thread of its own. Stopping raises a flag and
//! dials the endpoint once so the blocked `accept` returns.

use std::io::{self, Read, Write};

use thiserror::Error;

mod acceptor;

pub(crate) use self::acceptor::{Acceptor, Serving};

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Byte stream to a connected client.
pub(crate) trait Connection: Read + Write + Send {}

impl<T: Read + Write + Send> Connection for T {}

/// An accepted client and a printable description of where it came from.
pub(crate) struct ClientConnection {
    peer: String,
    stream: Box<dyn Connection>,
}

impl ClientConnection {
    pub(crate) fn new(peer: impl Into<String>, stream: impl Connection + 'static) -> Self {
        Self {
            peer: peer.into(),
            stream: Box::new(stream),
        }
    }

    pub(crate) fn into_parts(self) -> (String, Box<dyn Connection>) {
        (self.peer, self.stream)
    }
}

/// Serves one accepted client. Failures go to the client or the log.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    fn handle(&self, connection: ClientConnection);
}

/// Failures while claiming the endpoint or running the accept thread.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to listen on {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },
    #[error("refusing to take over {endpoint}: {reason}")]
    Occupied {
        endpoint: String,
        reason: &'static str,
    },
    #[error("failed to spawn the accept thread: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("the accept thread panicked")]
    Panicked,
}
