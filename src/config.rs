//! Daemon configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, environment variables (both via [`ConfigOverrides`]), and an
//! optional TOML file ([`FileConfig`]).  [`RoamConfig::resolve`] merges the
//! layers and validates the result.  Anything wrong here is fatal at
//! startup and never re-checked at runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::BandPreference;
use crate::error::ConfigError;

pub const DEFAULT_INTERFACE: &str = "wlan0";
pub const DEFAULT_LEASE_STATE_DIR: &str = "/var/lib/dhcpcd";

/// Fully resolved, validated configuration.  Immutable for the life of
/// the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoamConfig {
    /// Network name every candidate must broadcast.
    pub ssid: String,
    /// Wireless interface driven through the supplicant.
    pub interface: String,
    /// Lower bound of the jittered wait between iterations.
    pub min_wait_minutes: u32,
    /// Upper bound (inclusive) of the jittered wait.
    pub max_wait_minutes: u32,
    /// Candidates weaker than this are never roamed to.
    pub min_signal_dbm: i32,
    pub preferred_band: BandPreference,
    /// Force a lease renewal after every confirmed roam.
    pub renew_after_roam: bool,
    /// Log a statistics snapshot every N iterations (0 = only at exit).
    pub stats_every: u64,
    /// Runtime-state directory the lease daemon must be able to write.
    pub lease_state_dir: PathBuf,
    pub timing: TimingConfig,
}

/// Delays, timeouts and retry bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Default bound for short control commands.
    pub command_timeout_ms: u64,
    /// Bound for a full-spectrum `iw` scan.
    pub scan_timeout_ms: u64,
    pub scan_attempts: u32,
    /// Wait after triggering a scan before reading results.
    pub scan_settle_ms: u64,
    /// Wait between empty scan attempts.
    pub scan_retry_delay_ms: u64,
    pub roam_timeout_ms: u64,
    pub verify_interval_ms: u64,
    pub verify_attempts: u32,
    pub ping_timeout_ms: u64,
    /// Bound for lease release and daemon renew commands.
    pub lease_release_timeout_ms: u64,
    /// Bound for lease requests and daemon start.
    pub lease_request_timeout_ms: u64,
    /// Pause between releasing a lease and requesting a new one.
    pub lease_release_pause_ms: u64,
    pub address_poll_interval_ms: u64,
    pub address_poll_attempts: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 5_000,
            scan_timeout_ms: 20_000,
            scan_attempts: 3,
            scan_settle_ms: 8_000,
            scan_retry_delay_ms: 3_000,
            roam_timeout_ms: 10_000,
            verify_interval_ms: 1_000,
            verify_attempts: 10,
            ping_timeout_ms: 2_000,
            lease_release_timeout_ms: 15_000,
            lease_request_timeout_ms: 30_000,
            lease_release_pause_ms: 1_000,
            address_poll_interval_ms: 1_000,
            address_poll_attempts: 10,
        }
    }
}

impl TimingConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn scan_settle(&self) -> Duration {
        Duration::from_millis(self.scan_settle_ms)
    }

    pub fn scan_retry_delay(&self) -> Duration {
        Duration::from_millis(self.scan_retry_delay_ms)
    }

    pub fn roam_timeout(&self) -> Duration {
        Duration::from_millis(self.roam_timeout_ms)
    }

    pub fn verify_interval(&self) -> Duration {
        Duration::from_millis(self.verify_interval_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn lease_release_timeout(&self) -> Duration {
        Duration::from_millis(self.lease_release_timeout_ms)
    }

    pub fn lease_request_timeout(&self) -> Duration {
        Duration::from_millis(self.lease_request_timeout_ms)
    }

    pub fn lease_release_pause(&self) -> Duration {
        Duration::from_millis(self.lease_release_pause_ms)
    }

    pub fn address_poll_interval(&self) -> Duration {
        Duration::from_millis(self.address_poll_interval_ms)
    }
}

// ───────────────────────────────────────────────────────────────
// Layers
// ───────────────────────────────────────────────────────────────

/// Contents of the optional TOML file.  Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub ssid: Option<String>,
    pub interface: Option<String>,
    pub min_wait_minutes: Option<u32>,
    pub max_wait_minutes: Option<u32>,
    pub min_signal_dbm: Option<i32>,
    pub preferred_band: Option<BandPreference>,
    pub renew_after_roam: Option<bool>,
    pub stats_every: Option<u64>,
    pub lease_state_dir: Option<PathBuf>,
    pub timing: TimingConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&raw).map_err(|reason| ConfigError::File {
            path: path.display().to_string(),
            reason,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.message().to_owned())
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub ssid: Option<String>,
    pub interface: Option<String>,
    pub min_wait_minutes: Option<u32>,
    pub max_wait_minutes: Option<u32>,
    pub min_signal_dbm: Option<i32>,
    pub preferred_band: Option<BandPreference>,
}

impl RoamConfig {
    /// Merge the layers and validate.
    pub fn resolve(file: FileConfig, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = Self {
            ssid: overrides
                .ssid
                .or(file.ssid)
                .ok_or(ConfigError::Missing("ssid"))?,
            interface: overrides
                .interface
                .or(file.interface)
                .unwrap_or_else(|| DEFAULT_INTERFACE.to_owned()),
            min_wait_minutes: overrides
                .min_wait_minutes
                .or(file.min_wait_minutes)
                .ok_or(ConfigError::Missing("min_wait_minutes"))?,
            max_wait_minutes: overrides
                .max_wait_minutes
                .or(file.max_wait_minutes)
                .ok_or(ConfigError::Missing("max_wait_minutes"))?,
            min_signal_dbm: overrides
                .min_signal_dbm
                .or(file.min_signal_dbm)
                .ok_or(ConfigError::Missing("min_signal_dbm"))?,
            preferred_band: overrides
                .preferred_band
                .or(file.preferred_band)
                .ok_or(ConfigError::Missing("preferred_band"))?,
            renew_after_roam: file.renew_after_roam.unwrap_or(false),
            stats_every: file.stats_every.unwrap_or(10),
            lease_state_dir: file
                .lease_state_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LEASE_STATE_DIR)),
            timing: file.timing,
        };
        config.validate()?;
        Ok(config)
    }

    /// Range and format checks.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.is_empty() || self.ssid.len() > 32 {
            return Err(invalid("ssid", "must be 1-32 bytes"));
        }
        if self.ssid.chars().any(char::is_control) {
            return Err(invalid("ssid", "must not contain control characters"));
        }
        if self.interface.is_empty()
            || self.interface.len() > 15
            || self
                .interface
                .chars()
                .any(|c| c == '/' || c.is_whitespace() || c.is_control())
        {
            return Err(invalid(
                "interface",
                "must be 1-15 bytes without '/' or whitespace",
            ));
        }
        if self.min_wait_minutes == 0 {
            return Err(invalid("min_wait_minutes", "must be at least 1"));
        }
        if self.max_wait_minutes > 1440 {
            return Err(invalid("max_wait_minutes", "must be at most 1440"));
        }
        if self.min_wait_minutes > self.max_wait_minutes {
            return Err(invalid(
                "min_wait_minutes",
                "must not exceed max_wait_minutes",
            ));
        }
        if !(-100..=0).contains(&self.min_signal_dbm) {
            return Err(invalid("min_signal_dbm", "must be between -100 and 0"));
        }
        validate_timing(&self.timing)
    }
}

/// Upper bound for any single delay or timeout: six hours.
pub const MAX_TIMING_MS: u64 = 6 * 60 * 60 * 1000;

fn validate_timing(t: &TimingConfig) -> Result<(), ConfigError> {
    let durations = [
        ("timing.command_timeout_ms", t.command_timeout_ms),
        ("timing.scan_timeout_ms", t.scan_timeout_ms),
        ("timing.scan_settle_ms", t.scan_settle_ms),
        ("timing.scan_retry_delay_ms", t.scan_retry_delay_ms),
        ("timing.roam_timeout_ms", t.roam_timeout_ms),
        ("timing.verify_interval_ms", t.verify_interval_ms),
        ("timing.ping_timeout_ms", t.ping_timeout_ms),
        ("timing.lease_release_timeout_ms", t.lease_release_timeout_ms),
        ("timing.lease_request_timeout_ms", t.lease_request_timeout_ms),
        ("timing.lease_release_pause_ms", t.lease_release_pause_ms),
        ("timing.address_poll_interval_ms", t.address_poll_interval_ms),
    ];
    for (field, value) in durations {
        if value == 0 {
            return Err(invalid(field, "must be non-zero"));
        }
        if value > MAX_TIMING_MS {
            return Err(invalid(field, "must be at most 21600000 (6 h)"));
        }
    }
    let counts = [
        ("timing.scan_attempts", t.scan_attempts),
        ("timing.verify_attempts", t.verify_attempts),
        ("timing.address_poll_attempts", t.address_poll_attempts),
    ];
    for (field, value) in counts {
        if value == 0 {
            return Err(invalid(field, "must be at least 1"));
        }
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}
