//! Scan events: the raw tag identifier sent by the scanner process.

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Size in bytes of one scan event on the wire. Both ends of the scan pipe
/// agree on it; there is no length prefix or delimiter.
pub const FRAME_LEN: usize = 4;

/// Length of the canonical hex form of a tag.
pub const HEX_LEN: usize = FRAME_LEN * 2;

/// Raw identifier read from a physical tag.
///
/// The canonical text form is eight uppercase hex digits, most significant
/// byte first. That string is the key used to resolve an [`AppBinding`].
///
/// [`AppBinding`]: crate::AppBinding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub [u8; FRAME_LEN]);

impl TagId {
    /// Canonical uppercase hex string, e.g. `01020304`.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(HEX_LEN);
        for byte in self.0 {
            let _ = write!(out, "{byte:02X}");
        }
        out
    }
}

impl From<[u8; FRAME_LEN]> for TagId {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        TagId(bytes)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TagId {
    type Err = ModelError;

    /// Parses the hex form back into raw bytes. Lowercase digits are
    /// accepted; the canonical form produced by [`TagId::to_hex`] is
    /// uppercase.
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != HEX_LEN {
            return Err(ModelError::HexLength {
                expected: HEX_LEN,
                actual: chars.len(),
            });
        }

        let mut bytes = [0u8; FRAME_LEN];
        for (index, pair) in chars.chunks(2).enumerate() {
            let mut value = 0u8;
            for (offset, digit) in pair.iter().enumerate() {
                let nibble = digit.to_digit(16).ok_or(ModelError::HexDigit {
                    digit: *digit,
                    position: index * 2 + offset,
                })?;
                value = (value << 4) | nibble as u8;
            }
            bytes[index] = value;
        }
        Ok(TagId(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn hex_is_big_endian_uppercase() {
        assert_eq!(TagId([0x01, 0x02, 0x03, 0x04]).to_hex(), "01020304");
        assert_eq!(TagId([0xDE, 0xAD, 0xBE, 0xEF]).to_hex(), "DEADBEEF");
        assert_eq!(TagId([0x00; 4]).to_hex(), "00000000");
        assert_eq!(TagId([0xff; 4]).to_string(), "FFFFFFFF");
    }

    #[test]
    fn sampled_tags_match_u32_formatting() {
        let mut rng = StdRng::seed_from_u64(0x7a6d);
        for _ in 0..10_000 {
            let value: u32 = rng.random();
            let tag = TagId(value.to_be_bytes());
            let hex = tag.to_hex();

            assert_eq!(hex.len(), HEX_LEN);
            assert_eq!(hex, format!("{value:08X}"));
            assert!(
                hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
                "{hex} is not uppercase hex"
            );
            assert_eq!(hex.parse::<TagId>().unwrap(), tag);
        }
    }

    #[test]
    fn parse_accepts_lowercase() {
        let tag: TagId = "0a0b0c0d".parse().unwrap();
        assert_eq!(tag, TagId([0x0A, 0x0B, 0x0C, 0x0D]));
        assert_eq!(tag.to_hex(), "0A0B0C0D");
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            "0102".parse::<TagId>(),
            Err(ModelError::HexLength {
                expected: 8,
                actual: 4
            })
        );
    }

    #[test]
    fn parse_rejects_non_hex_digit() {
        assert_eq!(
            "0102G304".parse::<TagId>(),
            Err(ModelError::HexDigit {
                digit: 'G',
                position: 4
            })
        );
    }
}
