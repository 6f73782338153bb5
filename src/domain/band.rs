//! Frequency catalog: channel centre frequency (MHz) to band label.
//!
//! The 5 GHz / 6 GHz split sits at 5925 MHz, the lower edge of UNII-5.
//! Frequencies from 5925 upward belong to 6 GHz even though a few
//! legacy tables extend "5 GHz" to 6000.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lowest 6 GHz frequency (MHz).
pub const SIX_GHZ_LOWER_MHZ: u32 = 5925;

/// Band a radio operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    TwoPointFour,
    Five,
    Six,
    Unknown,
}

impl Band {
    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoPointFour => "2.4G",
            Self::Five => "5G",
            Self::Six => "6G",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a centre frequency to its band.
pub const fn band_for_frequency(mhz: u32) -> Band {
    match mhz {
        2400..=2500 => Band::TwoPointFour,
        5000..=5924 => Band::Five,
        SIX_GHZ_LOWER_MHZ..=7125 => Band::Six,
        _ => Band::Unknown,
    }
}

// ───────────────────────────────────────────────────────────────
// Band preference (configuration)
// ───────────────────────────────────────────────────────────────

/// Band the operator would rather be on.  Never `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandPreference {
    TwoPointFour,
    Five,
    Six,
}

impl BandPreference {
    pub const fn band(self) -> Band {
        match self {
            Self::TwoPointFour => Band::TwoPointFour,
            Self::Five => Band::Five,
            Self::Six => Band::Six,
        }
    }

    pub fn matches(self, band: Band) -> bool {
        self.band() == band
    }
}

impl fmt::Display for BandPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.band().label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBand(pub String);

impl fmt::Display for UnknownBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown band '{}' (expected 2.4G, 5G or 6G)", self.0)
    }
}

impl std::error::Error for UnknownBand {}

impl FromStr for BandPreference {
    type Err = UnknownBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        let norm = norm
            .strip_suffix("ghz")
            .or_else(|| norm.strip_suffix('g'))
            .unwrap_or(&norm);
        match norm {
            "2.4" => Ok(Self::TwoPointFour),
            "5" => Ok(Self::Five),
            "6" => Ok(Self::Six),
            _ => Err(UnknownBand(s.to_owned())),
        }
    }
}

impl Serialize for BandPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BandPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
