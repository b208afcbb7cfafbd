// Control socket client (one JSON request per connection, response until EOF)

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, Span};

use blasterctl_core::domain::SocketCommand;
use blasterctl_core::ProtocolError;

/// Default write deadline
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read deadline
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 512;
const INITIAL_RESPONSE_CAPACITY: usize = 20_000;

enum ReadOutcome {
    Data(usize),
    Eof,
    /// Connection reset while reading; the traffic generator resets the socket
    /// on teardown after a complete response.
    Transient,
}

/// Client for the control socket of a running instance
#[derive(Debug, Clone)]
pub struct SocketClient {
    write_timeout: Duration,
    read_timeout: Duration,
    span: Span,
}

impl SocketClient {
    pub fn new(write_timeout: Duration, read_timeout: Duration, span: Span) -> Self {
        Self {
            write_timeout,
            read_timeout,
            span,
        }
    }

    /// Send `command` and return the raw, undecoded response
    ///
    /// Connect and write share the write deadline. The read deadline covers
    /// the whole response.
    pub async fn request(
        &self,
        socket: &Path,
        command: &SocketCommand,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut request = serde_json::to_vec(command).map_err(ProtocolError::Encode)?;
        request.push(b'\n');

        let write_deadline = Instant::now() + self.write_timeout;
        let mut stream = match timeout_at(write_deadline, UnixStream::connect(socket)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ProtocolError::Connect {
                    path: socket.display().to_string(),
                    source,
                })
            }
            Err(_) => return Err(ProtocolError::WriteTimeout(self.write_timeout.as_millis())),
        };

        let write = async {
            stream.write_all(&request).await?;
            stream.flush().await
        };
        let written = timeout_at(write_deadline, write).await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ProtocolError::Write(e)),
            Err(_) => return Err(ProtocolError::WriteTimeout(self.write_timeout.as_millis())),
        }
        debug!(parent: &self.span, command = %command.command, socket = %socket.display(), "Command sent");

        let received = self.read_response(&mut stream).await?;
        debug!(parent: &self.span, command = %command.command, bytes = received.len(), "Response received");
        Ok(received)
    }

    async fn read_response(&self, stream: &mut UnixStream) -> Result<Vec<u8>, ProtocolError> {
        let mut received = Vec::with_capacity(INITIAL_RESPONSE_CAPACITY);
        let mut chunk = [0u8; READ_CHUNK];

        let read_all = async {
            loop {
                match read_chunk(stream, &mut chunk).await {
                    Ok(ReadOutcome::Data(n)) => received.extend_from_slice(&chunk[..n]),
                    Ok(ReadOutcome::Eof) => return Ok(()),
                    Ok(ReadOutcome::Transient) => {
                        debug!(parent: &self.span, received = received.len(), "Connection reset while reading, continuing");
                    }
                    Err(source) => {
                        return Err(ProtocolError::Read {
                            received: received.len(),
                            source,
                        })
                    }
                }
            }
        };

        let outcome = timeout(self.read_timeout, read_all).await;
        match outcome {
            Ok(Ok(())) => Ok(received),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProtocolError::PartialResponse {
                received: received.len(),
            }),
        }
    }
}

async fn read_chunk(stream: &mut UnixStream, chunk: &mut [u8]) -> std::io::Result<ReadOutcome> {
    match stream.read(chunk).await {
        Ok(0) => Ok(ReadOutcome::Eof),
        Ok(n) => Ok(ReadOutcome::Data(n)),
        Err(e) if e.kind() == ErrorKind::ConnectionReset => Ok(ReadOutcome::Transient),
        Err(e) => Err(e),
    }
}
