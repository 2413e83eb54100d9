//! Length-prefixed ICP frame codec.
//!
//! Frame layout: `[length: u32 BE][callType: u32 BE][tag: u32 BE]
//! [direction: u8][status: u32 BE][payload: length bytes]`.
//!
//! `length` counts only the payload; the header itself is fixed at
//! [`HEADER_SIZE`] bytes and is not included.

use std::io::{self, Read, Write};

/// Request direction: frontend -> manager, or manager -> frontend outbound call.
pub const DIRECTION_REQUEST: u8 = 0;
/// Response direction: the answer to a previously sent request.
pub const DIRECTION_RESPONSE: u8 = 1;

/// Status indicating the call was decoded and handled normally.
pub const STATUS_OK: u32 = 0;
/// Status set when decoding the payload failed, or the callType was unrecognized.
pub const STATUS_ERROR: u32 = 1;

/// 4 (length) + 4 (callType) + 4 (tag) + 1 (direction) + 4 (status).
const HEADER_SIZE: usize = 17;

/// Maximum payload size accepted from the wire (16 MiB).
const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("frame payload too large: {0} bytes")]
    TooLarge(u32),
}

/// A single decoded ICP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub call_type: u32,
    pub tag: u32,
    pub direction: u8,
    pub status: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn is_request(&self) -> bool {
        self.direction == DIRECTION_REQUEST
    }

    pub fn is_response(&self) -> bool {
        self.direction == DIRECTION_RESPONSE
    }
}

/// Read a single frame from a blocking reader. Returns `Ok(None)` on clean EOF.
pub fn read_frame(reader: &mut impl Read) -> Result<Option<Frame>, FrameError> {
    let mut header = [0u8; HEADER_SIZE];
    match reader.read_exact(&mut header) {
        Ok(()) => {}
        Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let length = u32::from_be_bytes(header[0..4].try_into().unwrap());
    let call_type = u32::from_be_bytes(header[4..8].try_into().unwrap());
    let tag = u32::from_be_bytes(header[8..12].try_into().unwrap());
    let direction = header[12];
    let status = u32::from_be_bytes(header[13..17].try_into().unwrap());

    if length > MAX_PAYLOAD_SIZE {
        return Err(FrameError::TooLarge(length));
    }

    let mut payload = vec![0u8; length as usize];
    if length > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok(Some(Frame {
        call_type,
        tag,
        direction,
        status,
        payload,
    }))
}

/// Write a single frame to a blocking writer.
pub fn write_frame(writer: &mut impl Write, frame: &Frame) -> Result<(), FrameError> {
    let length = frame.payload.len() as u32;
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&length.to_be_bytes());
    header[4..8].copy_from_slice(&frame.call_type.to_be_bytes());
    header[8..12].copy_from_slice(&frame.tag.to_be_bytes());
    header[12] = frame.direction;
    header[13..17].copy_from_slice(&frame.status.to_be_bytes());

    writer.write_all(&header)?;
    if !frame.payload.is_empty() {
        writer.write_all(&frame.payload)?;
    }
    writer.flush()?;
    Ok(())
}

/// Build an empty-payload error response for an unrecognized or undecodable
/// call, preserving the original tag (§6, §7 DecodeError).
pub fn error_response(call_type: u32, tag: u32) -> Frame {
    Frame {
        call_type,
        tag,
        direction: DIRECTION_RESPONSE,
        status: STATUS_ERROR,
        payload: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample(payload: &[u8]) -> Frame {
        Frame {
            call_type: 7,
            tag: 42,
            direction: DIRECTION_REQUEST,
            status: STATUS_OK,
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn round_trip_empty_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &sample(&[])).unwrap();

        let mut cursor = Cursor::new(&buf);
        let frame = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(frame, sample(&[]));
    }

    #[test]
    fn round_trip_with_payload() {
        let data = b"hello proto";
        let mut buf = Vec::new();
        write_frame(&mut buf, &sample(data)).unwrap();

        let mut cursor = Cursor::new(&buf);
        let frame = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(frame.payload, data);
        assert_eq!(frame.tag, 42);
    }

    #[test]
    fn eof_returns_none() {
        let buf: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&buf);
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn multiple_frames_in_sequence() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &sample(b"one")).unwrap();
        write_frame(&mut buf, &sample(b"two")).unwrap();

        let mut cursor = Cursor::new(&buf);
        let f1 = read_frame(&mut cursor).unwrap().unwrap();
        let f2 = read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(f1.payload, b"one");
        assert_eq!(f2.payload, b"two");
        assert!(read_frame(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn error_response_preserves_tag_and_empty_payload() {
        let resp = error_response(99, 7);
        assert_eq!(resp.tag, 7);
        assert_eq!(resp.status, STATUS_ERROR);
        assert!(resp.payload.is_empty());
        assert!(resp.is_response());
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());
        let mut cursor = Cursor::new(&header[..]);
        assert!(matches!(
            read_frame(&mut cursor),
            Err(FrameError::TooLarge(_))
        ));
    }
}
