//! frame - u16-length-prefixed framing over a stream socket

use async_std::io::{Read, ReadExt, Write, WriteExt};
use thiserror::Error;

/// Largest payload a 2-byte length prefix can declare.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("peer closed the connection")]
    Closed,
    #[error("zero length frame")]
    ZeroLength,
    #[error("frame of {0} bytes exceeds the length prefix")]
    Oversize(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub async fn send_frame<W: Write + Unpin>(stream: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let len = u16::try_from(payload.len()).map_err(|_| FrameError::Oversize(payload.len()))?;
    if len == 0 {
        return Err(FrameError::ZeroLength);
    }
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(payload).await?;
    Ok(())
}

/// Read one frame, looping until exactly the declared number of payload bytes
/// has arrived.  A clean end-of-stream on the frame boundary is reported as
/// `Closed`; end-of-stream mid-frame is an I/O error.
pub async fn recv_frame<R: Read + Unpin>(stream: &mut R) -> Result<Vec<u8>, FrameError> {
    let mut len_buf = [0u8; 2];
    let n = stream.read(&mut len_buf[..1]).await?;
    if n == 0 {
        return Err(FrameError::Closed);
    }
    stream.read_exact(&mut len_buf[1..]).await?;

    let len = u16::from_be_bytes(len_buf) as usize;
    if len == 0 {
        return Err(FrameError::ZeroLength);
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}
