//! Out-of-band item override packet.
//!
//! The base slot update carries only id, stack and prefix. Clients learn
//! about an override from this message, sent right after the slot update it
//! refers to:
//!
//! ```text
//! i16 LE  total length (patched after the body is written)
//! u8      message type (17)
//! u8      sentinel 0xFF
//! i16 LE  item id
//! u8      name length, then UTF-8 name
//! u8      value length, then UTF-8 value
//! ```

pub const OVERRIDE_MESSAGE_TYPE: u8 = 17;
pub const OVERRIDE_SENTINEL: u8 = 0xFF;

const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("item id {0} does not fit the 16-bit wire field")]
    ItemIdOutOfRange(i32),

    #[error("{field} is {len} bytes, the wire limit is 255")]
    FieldTooLong { field: &'static str, len: usize },

    #[error("packet truncated at byte {0}")]
    Truncated(usize),

    #[error("length prefix says {declared} bytes, packet has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("unexpected message type {0}")]
    UnexpectedType(u8),

    #[error("missing override sentinel, found {0:#04x}")]
    MissingSentinel(u8),

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePacket {
    pub item_id: i16,
    pub param: String,
    pub value: String,
}

fn push_field(buf: &mut Vec<u8>, field: &'static str, text: &str) -> Result<(), ProtocolError> {
    let len = u8::try_from(text.len()).map_err(|_| ProtocolError::FieldTooLong {
        field,
        len: text.len(),
    })?;
    buf.push(len);
    buf.extend_from_slice(text.as_bytes());
    Ok(())
}

pub fn encode_override(item_id: i32, param: &str, value: &str) -> Result<Vec<u8>, ProtocolError> {
    let net_id = i16::try_from(item_id).map_err(|_| ProtocolError::ItemIdOutOfRange(item_id))?;

    let mut buf = Vec::with_capacity(HEADER_LEN + 2 + param.len() + value.len());
    buf.extend_from_slice(&0i16.to_le_bytes());
    buf.push(OVERRIDE_MESSAGE_TYPE);
    buf.push(OVERRIDE_SENTINEL);
    buf.extend_from_slice(&net_id.to_le_bytes());
    push_field(&mut buf, "parameter name", param)?;
    push_field(&mut buf, "parameter value", value)?;

    let total = i16::try_from(buf.len()).map_err(|_| ProtocolError::FieldTooLong {
        field: "packet",
        len: buf.len(),
    })?;
    buf[..2].copy_from_slice(&total.to_le_bytes());
    Ok(buf)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self.pos + n;
        let out = self
            .bytes
            .get(self.pos..end)
            .ok_or(ProtocolError::Truncated(self.pos))?;
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    fn i16(&mut self) -> Result<i16, ProtocolError> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    fn text(&mut self, field: &'static str) -> Result<String, ProtocolError> {
        let len = self.u8()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ProtocolError::InvalidUtf8(field))
    }
}

pub fn decode_override(bytes: &[u8]) -> Result<OverridePacket, ProtocolError> {
    let mut r = Reader { bytes, pos: 0 };
    let declared = r.i16()? as u16 as usize;
    if declared != bytes.len() {
        return Err(ProtocolError::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }
    let kind = r.u8()?;
    if kind != OVERRIDE_MESSAGE_TYPE {
        return Err(ProtocolError::UnexpectedType(kind));
    }
    let sentinel = r.u8()?;
    if sentinel != OVERRIDE_SENTINEL {
        return Err(ProtocolError::MissingSentinel(sentinel));
    }
    let item_id = r.i16()?;
    let param = r.text("parameter name")?;
    let value = r.text("parameter value")?;
    Ok(OverridePacket {
        item_id,
        param,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_layout() {
        let bytes = encode_override(100, "damage", "2.0").unwrap();
        let mut expected = vec![17, 0, 17, 0xFF, 100, 0, 6];
        expected.extend_from_slice(b"damage");
        expected.push(3);
        expected.extend_from_slice(b"2.0");
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), 17);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let bytes = encode_override(4956, "color", "FF8000").unwrap();
        let packet = decode_override(&bytes).unwrap();
        assert_eq!(packet.item_id, 4956);
        assert_eq!(packet.param, "color");
        assert_eq!(packet.value, "FF8000");
    }

    #[test]
    fn rejects_oversized_fields() {
        assert_eq!(
            encode_override(70_000, "damage", "2"),
            Err(ProtocolError::ItemIdOutOfRange(70_000))
        );
        let long = "9".repeat(256);
        assert!(matches!(
            encode_override(1, "damage", &long),
            Err(ProtocolError::FieldTooLong { len: 256, .. })
        ));
    }

    #[test]
    fn decode_checks_header() {
        let mut bytes = encode_override(1, "crit", "5").unwrap();
        assert!(matches!(
            decode_override(&bytes[..bytes.len() - 1]),
            Err(ProtocolError::LengthMismatch { .. })
        ));

        bytes[3] = 0x00;
        assert_eq!(decode_override(&bytes), Err(ProtocolError::MissingSentinel(0)));

        bytes[2] = 7;
        assert_eq!(decode_override(&bytes), Err(ProtocolError::UnexpectedType(7)));
    }

    #[test]
    fn decode_detects_truncated_body() {
        // Length prefix matches but the name claims more bytes than remain.
        let bytes = vec![7, 0, 17, 0xFF, 1, 0, 9];
        assert!(matches!(
            decode_override(&bytes),
            Err(ProtocolError::Truncated(_))
        ));
    }
}
