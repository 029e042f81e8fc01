//! Newline-delimited JSON transport.
//!
//! Reads one request per line and writes one response per line. Malformed
//! lines get an `invalid_request` response and the session continues.

use crate::protocol::{ErrorKind, Request, Response};
use crate::ServerError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, info, warn};

/// Maximum request size (1MB)
const MAX_REQUEST_SIZE: usize = 1024 * 1024;

/// JSON-lines server over a byte stream pair
pub struct JsonLineServer {
    handler: Arc<dyn RequestHandler>,
}

impl JsonLineServer {
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self { handler }
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader`, writing responses to `writer`.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let limit = MAX_REQUEST_SIZE as u64 + 1;
            if (&mut reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = if buf.len() > MAX_REQUEST_SIZE && buf.last() != Some(&b'\n') {
                let discarded = discard_line(&mut reader).await?;
                warn!(bytes = buf.len() + discarded, "Request too large, discarded");
                Response::error(ErrorKind::InvalidRequest, "Request too large (max 1MB)")
            } else {
                let line = buf.trim_ascii();
                if line.is_empty() {
                    continue;
                }
                self.dispatch(line).await
            };

            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            writer.write_all(&frame).await?;
            writer.flush().await?;
        }

        info!("Input closed, stopping server");

        Ok(())
    }

    async fn dispatch(&self, line: &[u8]) -> Response {
        match serde_json::from_slice::<Request>(line) {
            Ok(request) => {
                debug!(?request, "Received request");
                self.handler.handle(request).await
            }
            Err(e) => {
                debug!(error = %e, "Malformed request");
                Response::error(
                    ErrorKind::InvalidRequest,
                    format!("Failed to parse request: {}", e),
                )
            }
        }
    }
}

/// Skip input up to and including the next newline without buffering it.
async fn discard_line<R>(reader: &mut R) -> Result<usize, ServerError>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(discarded);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(discarded + pos + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                discarded += len;
            }
        }
    }
}

/// Trait for handling incoming requests
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle a request and return a response
    async fn handle(&self, request: Request) -> Response;
}
