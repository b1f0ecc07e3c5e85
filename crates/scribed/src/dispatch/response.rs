//! Reply framing.
//!
//! Every reply is a run of `stream` lines followed by one `exit` line.
//! Operation payloads and error envelopes are JSON documents carried as text
//! in the `data` field of a stream line.

use std::io::Write;

use serde::Serialize;

use super::errors::DispatchError;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Channel {
    Stdout,
    Stderr,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Frame<'a> {
    Stream { stream: Channel, data: &'a str },
    Exit { status: i32 },
}

/// `{"status":"error","code":...,"message":...,"data":{"status":N}}`
#[derive(Debug, Serialize)]
pub(crate) struct ErrorEnvelope<'a> {
    status: &'static str,
    code: &'a str,
    message: String,
    data: EnvelopeData,
}

#[derive(Debug, Serialize)]
struct EnvelopeData {
    status: u16,
}

impl<'a> ErrorEnvelope<'a> {
    pub(crate) fn new(code: &'a str, message: impl Into<String>, http_status: u16) -> Self {
        Self {
            status: "error",
            code,
            message: message.into(),
            data: EnvelopeData {
                status: http_status,
            },
        }
    }
}

/// Client exit status for an HTTP-class status: 2 when the daemon is at
/// fault, 1 when the caller is.
pub(crate) fn exit_status_for(http_status: u16) -> i32 {
    if http_status >= 500 { 2 } else { 1 }
}

/// Frames replies onto a client stream.
pub(crate) struct ResponseWriter<W> {
    out: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    /// Sends `payload` on stdout.
    pub(crate) fn write_json<T: Serialize>(&mut self, payload: &T) -> Result<(), DispatchError> {
        self.stream(Channel::Stdout, payload)
    }

    /// Sends `envelope` on stderr.
    pub(crate) fn write_envelope(
        &mut self,
        envelope: &ErrorEnvelope<'_>,
    ) -> Result<(), DispatchError> {
        self.stream(Channel::Stderr, envelope)
    }

    /// Ends the reply.
    pub(crate) fn write_exit(&mut self, status: i32) -> Result<(), DispatchError> {
        self.frame(&Frame::Exit { status })?;
        self.out.flush()?;
        Ok(())
    }

    /// Reports a protocol failure and ends the reply.
    pub(crate) fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        let (code, http_status) = error.classify();
        self.write_envelope(&ErrorEnvelope::new(code, error.to_string(), http_status))?;
        self.write_exit(exit_status_for(http_status))
    }

    fn stream<T: Serialize + ?Sized>(
        &mut self,
        stream: Channel,
        document: &T,
    ) -> Result<(), DispatchError> {
        let mut data = serde_json::to_string(document)?;
        data.push('\n');
        self.frame(&Frame::Stream {
            stream,
            data: &data,
        })
    }

    fn frame(&mut self, frame: &Frame<'_>) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.out, frame)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}
