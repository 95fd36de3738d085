use crate::codec::MllpCodec;
use crate::{MllpError, MllpResult};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// Sends HL7 messages over MLLP, one connection per message.
///
/// The client holds no connection between calls, so it can be cloned and shared freely
/// across tasks.
#[derive(Clone, Copy, Debug, Default)]
pub struct MllpClient {
    codec: MllpCodec,
}

impl MllpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `codec` (for example with a different maximum frame length) for each call.
    pub fn with_codec(codec: MllpCodec) -> Self {
        Self { codec }
    }

    /// Connects to `host:port`, sends `message` as one frame and waits for one framed reply.
    ///
    /// The connection is opened for this call only and is closed when the call returns,
    /// whether it succeeded or not.
    ///
    /// # Returns
    ///
    /// The acknowledgment payload with the framing removed.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`MllpError::Connect`] if the endpoint cannot be reached,
    /// - [`MllpError::Io`] or [`MllpError::Framing`] if the exchange fails part way,
    /// - [`MllpError::ConnectionClosed`] if the peer closes without replying,
    /// - [`MllpError::InvalidUtf8`] if the reply is not text.
    pub async fn send(&self, host: &str, port: u16, message: &str) -> MllpResult<String> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| MllpError::Connect {
                addr: addr.clone(),
                source,
            })?;

        tracing::debug!(%addr, bytes = message.len(), "sending HL7 message over MLLP");

        let mut transport = Framed::new(stream, self.codec);
        transport
            .send(Bytes::copy_from_slice(message.as_bytes()))
            .await?;

        let frame = match transport.next().await {
            Some(frame) => frame?,
            None => return Err(MllpError::ConnectionClosed),
        };

        let ack = String::from_utf8(frame.to_vec())?;
        tracing::debug!(%addr, bytes = ack.len(), "received MLLP acknowledgment");
        Ok(ack)
    }
}

/// Sends `message` to `host:port` with the default codec. See [`MllpClient::send`].
pub async fn send(host: &str, port: u16, message: &str) -> MllpResult<String> {
    MllpClient::new().send(host, port, message).await
}
