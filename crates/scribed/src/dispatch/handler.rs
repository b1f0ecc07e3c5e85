//! Connection handler that authenticates and dispatches JSONL commands.

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

use scribe_core::ThemeFiles;
use tracing::{debug, warn};

use crate::transport::{ClientConnection, ConnectionHandler};

use super::auth::TokenAuthenticator;
use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::ResponseWriter;
use super::router::{DISPATCH_TARGET, DomainRouter};

/// Maximum size of a single request line in bytes. Edit requests carry the
/// whole replacement file.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Connection handler that parses, authenticates, and dispatches one request
/// per connection.
#[derive(Debug)]
pub(crate) struct DispatchConnectionHandler {
    router: DomainRouter,
    authenticator: TokenAuthenticator,
}

impl DispatchConnectionHandler {
    pub(crate) fn new(files: Arc<ThemeFiles>, authenticator: TokenAuthenticator) -> Self {
        Self {
            router: DomainRouter::new(files),
            authenticator,
        }
    }

    /// Reads one request from `stream` and writes the full response.
    ///
    /// Generic over the stream so tests can drive it with in-memory buffers.
    pub(crate) fn dispatch<S: Read + Write>(&self, stream: &mut S, peer: &str) {
        let request_bytes = match read_request_line(stream) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, peer, "client disconnected without request");
                return;
            }
            Err(error) => {
                warn!(target: DISPATCH_TARGET, peer, %error, "failed to read request");
                let _ = ResponseWriter::new(stream).write_error(&error);
                return;
            }
        };

        let mut writer = ResponseWriter::new(stream);
        let status = match self.execute(&request_bytes, peer, &mut writer) {
            Ok(status) => status,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, peer, %error, "dispatch failed");
                if let Err(write_error) = writer.write_error(&error) {
                    warn!(target: DISPATCH_TARGET, %write_error, "failed to write error");
                }
                return;
            }
        };

        if let Err(error) = writer.write_exit(status) {
            warn!(target: DISPATCH_TARGET, %error, "failed to write exit");
        }
    }

    fn execute<W: Write>(
        &self,
        request_bytes: &[u8],
        peer: &str,
        writer: &mut ResponseWriter<W>,
    ) -> Result<i32, DispatchError> {
        let request = CommandRequest::decode(request_bytes)?;
        let capability = self.authenticator.authenticate(request.token(), peer)?;

        debug!(
            target: DISPATCH_TARGET,
            domain = request.domain(),
            operation = request.operation(),
            subject = capability.subject(),
            "dispatching request"
        );

        self.router.route(&request, &capability, writer)
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, connection: ClientConnection) {
        let (peer, mut stream) = connection.into_parts();
        self.dispatch(&mut stream, &peer);
    }
}

/// Reads the request line, newline included when present. `Ok(None)` means
/// the client hung up without sending anything.
fn read_request_line<R: Read>(stream: &mut R) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut line = Vec::new();
    let window = u64::try_from(MAX_REQUEST_BYTES).map_or(u64::MAX, |limit| limit + 1);
    BufReader::new(stream.take(window)).read_until(b'\n', &mut line)?;
    if line.len() > MAX_REQUEST_BYTES {
        return Err(DispatchError::TooLarge {
            limit: MAX_REQUEST_BYTES,
        });
    }
    Ok((!line.is_empty()).then_some(line))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_up_to_first_newline() {
        let mut input = Cursor::new(b"{\"a\":1}\n{\"b\":2}\n".to_vec());
        let line = read_request_line(&mut input)
            .expect("read")
            .expect("line present");
        assert_eq!(line, b"{\"a\":1}\n");
    }

    #[test]
    fn accepts_unterminated_final_line() {
        let mut input = Cursor::new(b"{\"a\":1}".to_vec());
        let line = read_request_line(&mut input).expect("read");
        assert_eq!(line.as_deref(), Some(&b"{\"a\":1}"[..]));
    }

    #[test]
    fn empty_stream_yields_nothing() {
        let mut input = Cursor::new(Vec::new());
        assert!(read_request_line(&mut input).expect("read").is_none());
    }

    #[test]
    fn a_line_of_exactly_the_limit_is_accepted() {
        let mut body = vec![b'x'; MAX_REQUEST_BYTES - 1];
        body.push(b'\n');
        let mut input = Cursor::new(body);
        let line = read_request_line(&mut input).expect("read").expect("line");
        assert_eq!(line.len(), MAX_REQUEST_BYTES);
    }

    #[test]
    fn oversized_requests_are_rejected() {
        let mut input = Cursor::new(vec![b'x'; MAX_REQUEST_BYTES + 1]);
        let error = read_request_line(&mut input).expect_err("too large");
        assert!(matches!(error, DispatchError::TooLarge { .. }));
    }
}
