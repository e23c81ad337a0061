//! On-disk entry format
//!
//! Each entry file carries its expiry as explicit data rather than
//! repurposed filesystem metadata:
//!
//! ```text
//! MAGIC(4) | FORMAT_VERSION(u32 LE) | EXPIRES_AT(i64 LE, Unix ms) | payload...
//! ```
//!
//! A file whose header fails to parse reads as absent; the garbage
//! collector falls back to file mtime for such files.

use chrono::{DateTime, TimeZone, Utc};

/// File magic identifying a larder entry
pub const MAGIC: [u8; 4] = *b"LARD";

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

/// Total header length in bytes
pub const HEADER_LEN: usize = 16;

/// A stored payload together with its expiry instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The encoded value, opaque at this layer
    pub payload: Vec<u8>,

    /// When the entry stops being valid
    pub expires_at: DateTime<Utc>,
}

impl Entry {
    /// Serialize header + payload into a single buffer
    pub fn encode(payload: &[u8], expires_at: DateTime<Utc>) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&expires_at.timestamp_millis().to_le_bytes());
        buf.extend_from_slice(payload);
        buf
    }

    /// Parse a full entry file, `None` if the header is invalid
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let expires_at = decode_expiry(bytes)?;
        Some(Self {
            payload: bytes[HEADER_LEN..].to_vec(),
            expires_at,
        })
    }
}

/// Parse just the expiry from the leading header bytes
///
/// Used by the garbage collector to sniff staleness without reading
/// whole payloads.
pub fn decode_expiry(bytes: &[u8]) -> Option<DateTime<Utc>> {
    if bytes.len() < HEADER_LEN || bytes[..4] != MAGIC {
        return None;
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().ok()?);
    if version != FORMAT_VERSION {
        return None;
    }
    let millis = i64::from_le_bytes(bytes[8..16].try_into().ok()?);
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let expires = Utc.timestamp_millis_opt(1_900_000_000_123).unwrap();
        let buf = Entry::encode(b"hello", expires);
        assert_eq!(buf.len(), HEADER_LEN + 5);

        let entry = Entry::decode(&buf).unwrap();
        assert_eq!(entry.payload, b"hello");
        assert_eq!(entry.expires_at, expires);
    }

    #[test]
    fn empty_payload_round_trips() {
        let expires = Utc::now();
        let buf = Entry::encode(b"", expires);
        let entry = Entry::decode(&buf).unwrap();
        assert!(entry.payload.is_empty());
        assert_eq!(
            entry.expires_at.timestamp_millis(),
            expires.timestamp_millis()
        );
    }

    #[test]
    fn short_file_is_rejected() {
        assert!(Entry::decode(b"LARD").is_none());
        assert!(Entry::decode(b"").is_none());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buf = Entry::encode(b"x", Utc::now());
        buf[0] = b'X';
        assert!(Entry::decode(&buf).is_none());
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut buf = Entry::encode(b"x", Utc::now());
        buf[4..8].copy_from_slice(&99u32.to_le_bytes());
        assert!(Entry::decode(&buf).is_none());
    }

    #[test]
    fn expiry_sniff_matches_full_decode() {
        let expires = Utc.timestamp_millis_opt(1_234_567_890_000).unwrap();
        let buf = Entry::encode(b"payload", expires);
        assert_eq!(decode_expiry(&buf[..HEADER_LEN]), Some(expires));
    }
}
