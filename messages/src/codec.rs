//! Message codec: version prefix plus bincode payload.

use crate::{CodecError, FlowMessage};

/// Current session protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum encoded message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024; // 4 MiB

/// Encode a message for transmission: 2-byte big-endian version, then bincode.
pub fn encode(message: &FlowMessage) -> Result<Vec<u8>, CodecError> {
    let payload = bincode::serialize(message).map_err(|e| CodecError::Malformed(e.to_string()))?;
    let size = payload.len() + 2;
    if size > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a message from raw bytes.
///
/// Unknown enum variants (for example a command this build does not know)
/// surface as [`CodecError::Malformed`].
pub fn decode(data: &[u8]) -> Result<FlowMessage, CodecError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(CodecError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let [hi, lo, payload @ ..] = data else {
        return Err(CodecError::Malformed("missing version prefix".into()));
    };
    let version = u16::from_be_bytes([*hi, *lo]);
    if version != PROTOCOL_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    bincode::deserialize(payload).map_err(|e| CodecError::Malformed(e.to_string()))
}
