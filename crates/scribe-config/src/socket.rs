//! Where the daemon listens.
//!
//! Every layer (file, environment, flag) spells the endpoint as a URL:
//! `unix:///run/user/1000/scribe/scribed.sock` or `tcp://127.0.0.1:9781`.

use std::fmt;
use std::fs::DirBuilder;
use std::io;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{Host, Url};

/// Socket the daemon binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SocketEndpoint {
    /// Unix domain socket at a filesystem path.
    Unix(Utf8PathBuf),
    /// TCP address. Port 0 lets the OS choose.
    Tcp {
        /// Host name or IP literal, without IPv6 brackets.
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl SocketEndpoint {
    /// Unix socket at `path`.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix(path.into())
    }

    /// TCP socket at `host:port`.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Socket file path for Unix endpoints.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        if let Self::Unix(path) = self {
            Some(path)
        } else {
            None
        }
    }

    /// Creates the directory that will hold a Unix socket, readable by the
    /// owner only. A bare file name needs no directory; TCP needs nothing.
    ///
    /// # Errors
    ///
    /// [`EndpointError::Directory`] when the directory cannot be created.
    pub fn create_socket_dir(&self) -> Result<(), EndpointError> {
        let Some(dir) = self
            .unix_path()
            .and_then(Utf8Path::parent)
            .filter(|dir| !dir.as_str().is_empty())
        else {
            return Ok(());
        };

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o700);

        match builder.create(dir) {
            Err(source) if source.kind() != io::ErrorKind::AlreadyExists => {
                Err(EndpointError::Directory {
                    path: dir.to_owned(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } if host.contains(':') => {
                write!(formatter, "tcp://[{host}]:{port}")
            }
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = EndpointError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input).map_err(|source| EndpointError::Syntax {
            input: input.to_owned(),
            source,
        })?;
        let incomplete = |part| EndpointError::Incomplete {
            input: input.to_owned(),
            part,
        };

        match url.scheme() {
            "unix" => match url.path() {
                "" | "/" => Err(incomplete("socket path")),
                path => Ok(Self::unix(path)),
            },
            "tcp" => {
                let host = match url.host() {
                    Some(Host::Ipv6(address)) => address.to_string(),
                    Some(Host::Ipv4(address)) => address.to_string(),
                    Some(Host::Domain(name)) if !name.is_empty() => name.to_owned(),
                    _ => return Err(incomplete("host")),
                };
                let port = url.port().ok_or_else(|| incomplete("port"))?;
                Ok(Self::Tcp { host, port })
            }
            scheme => Err(EndpointError::Scheme {
                input: input.to_owned(),
                scheme: scheme.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for SocketEndpoint {
    type Error = EndpointError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SocketEndpoint> for String {
    fn from(endpoint: SocketEndpoint) -> Self {
        endpoint.to_string()
    }
}

/// Problems with a configured endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The value is not a URL.
    #[error("'{input}' is not a socket URL: {source}")]
    Syntax {
        /// Rejected value.
        input: String,
        /// URL parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The URL uses neither `unix` nor `tcp`.
    #[error("'{input}' uses scheme '{scheme}'; expected unix:// or tcp://")]
    Scheme {
        /// Rejected value.
        input: String,
        /// Scheme found.
        scheme: String,
    },
    /// A required part of the URL is absent.
    #[error("'{input}' has no {part}")]
    Incomplete {
        /// Rejected value.
        input: String,
        /// Missing component.
        part: &'static str,
    },
    /// The socket directory could not be created.
    #[error("cannot create socket directory '{path}': {source}")]
    Directory {
        /// Directory that was being created.
        path: Utf8PathBuf,
        /// Filesystem failure.
        #[source]
        source: io::Error,
    },
}
