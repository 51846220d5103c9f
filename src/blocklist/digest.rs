//! One-way digests of blocked suggestion URLs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA-256 digest of a suggestion URL.
///
/// The blocklist stores only these, never the plaintext URL. Serialized as a
/// lowercase hex string.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Digest of a URL string, byte for byte.
    pub fn of(url: &str) -> Self {
        Self(Sha256::digest(url.as_bytes()).into())
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the digest as a lowercase hexadecimal string
    pub fn as_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // 32 bytes * 2 hex characters
        if s.len() != 64 {
            return Err(ParseDigestError::InvalidLength(s.len()));
        }
        // `from_str_radix` alone would accept a sign in each pair.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseDigestError::InvalidHex);
        }

        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hex_str = std::str::from_utf8(chunk).map_err(|_| ParseDigestError::InvalidHex)?;
            bytes[i] = u8::from_str_radix(hex_str, 16).map_err(|_| ParseDigestError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for digest parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    #[error("invalid hexadecimal characters in digest string")]
    InvalidHex,
    #[error("invalid digest length: expected 64 hex characters, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_deterministic() {
        check!(Digest::of("http://example.com/0") == Digest::of("http://example.com/0"));
        check!(Digest::of("http://example.com/0") != Digest::of("http://example.com/1"));
        check!(Digest::of("http://example.com/0") != Digest::of("https://example.com/0"));
    }

    #[test]
    fn test_hex_roundtrip() {
        let digest = Digest::of("http://example.com/amp");
        let hex = digest.to_string();
        check!(hex.len() == 64);
        check!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
        check!(hex.parse::<Digest>() == Ok(digest));
    }

    #[test]
    fn test_uppercase_accepted() {
        let digest = Digest::from_bytes([0xab; 32]);
        check!(digest.as_hex().to_uppercase().parse::<Digest>() == Ok(digest));
    }

    #[rstest]
    #[case("", 0)]
    #[case("abc123", 6)]
    #[case("123456789abcdef0", 16)]
    fn test_invalid_length(#[case] input: &str, #[case] len: usize) {
        let_assert!(Err(ParseDigestError::InvalidLength(actual)) = input.parse::<Digest>());
        check!(actual == len);
    }

    #[rstest]
    #[case("z".repeat(64))]
    #[case("+f".repeat(32))]
    #[case(format!("-1{}", "0".repeat(62)))]
    fn test_invalid_hex(#[case] input: String) {
        check!(input.parse::<Digest>() == Err(ParseDigestError::InvalidHex));
    }

    #[test]
    fn test_serde_as_string() {
        let digest = Digest::from_bytes([0x0f; 32]);
        let json = serde_json::to_string(&digest).unwrap();
        check!(json == format!("\"{}\"", "0f".repeat(32)));
        let back: Digest = serde_json::from_str(&json).unwrap();
        check!(back == digest);
    }
}
