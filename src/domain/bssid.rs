//! BSSID value object.
//!
//! A BSSID is stored as its six raw bytes, so two values compare equal
//! regardless of the case or surrounding whitespace of the text they were
//! parsed from.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Hardware address of one access point radio.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Bssid([u8; 6]);

/// Text that is not a six-octet hardware address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BssidParseError {
    pub input: String,
}

impl fmt::Display for BssidParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a hardware address: '{}'", self.input)
    }
}

impl std::error::Error for BssidParseError {}

impl Bssid {
    pub const ZERO: Self = Self([0; 6]);

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Parse `aa:bb:cc:dd:ee:ff` (or `-` separated, any case, padded with
    /// whitespace).
    pub fn parse(s: &str) -> Result<Self, BssidParseError> {
        let err = || BssidParseError { input: s.to_owned() };
        let trimmed = s.trim();
        let sep = if trimmed.contains('-') { '-' } else { ':' };

        let mut bytes = [0u8; 6];
        let mut count = 0;
        for part in trimmed.split(sep) {
            if count == 6 || part.len() != 2 {
                return Err(err());
            }
            bytes[count] = u8::from_str_radix(part, 16).map_err(|_| err())?;
            count += 1;
        }
        if count != 6 {
            return Err(err());
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// `00:00:00:00:00:00`, reported by some tools when not associated.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl FromStr for Bssid {
    type Err = BssidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bssid({self})")
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for Bssid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Bssid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
