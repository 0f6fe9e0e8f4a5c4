use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::build_response;

/// A framed response (header block followed by body) being written out.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    head_len: usize,
    written: usize,
}

impl ResponseWriter {
    pub fn new(status_code: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        let mut buffer = build_response(status_code, content_type);
        let head_len = buffer.len();
        buffer.extend_from_slice(body);

        Self {
            buffer,
            head_len,
            written: 0,
        }
    }

    /// Number of body bytes, excluding the header block.
    pub fn body_len(&self) -> usize {
        self.buffer.len() - self.head_len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes whatever has not been written yet, then flushes.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
