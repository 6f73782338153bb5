//! Error taxonomy for the roaming daemon.
//!
//! Every subsystem has its own small enum; all of them convert into the
//! top-level [`Error`] so the roaming loop can report any failure through
//! one event type.  Only [`ConfigError`] is ever fatal, and only at
//! startup.

use core::fmt;
use std::time::Duration;

use crate::domain::Bssid;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An external program could not be run to completion.
    Command(CommandError),
    /// The supplicant control interface answered, but not as expected.
    Control(ControlError),
    /// Discovery produced no usable candidates.
    Scan(ScanError),
    /// A roam could not be carried out or confirmed.
    Roam(RoamError),
    /// No address could be acquired.
    Address(AddressError),
    /// Configuration is missing or invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Control(e) => write!(f, "control: {e}"),
            Self::Scan(e) => write!(f, "scan: {e}"),
            Self::Roam(e) => write!(f, "roam: {e}"),
            Self::Address(e) => write!(f, "address: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// External commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The program could not be started (missing binary, permissions).
    Spawn { program: String, reason: String },
    /// The program outlived its timeout and was killed.
    TimedOut { program: String, after: Duration },
    /// The program exited unsuccessfully.  `status` is `None` when it
    /// was terminated by a signal.
    Failed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { program, reason } => write!(f, "failed to run {program}: {reason}"),
            Self::TimedOut { program, after } => {
                write!(f, "{program} timed out after {} ms", after.as_millis())
            }
            Self::Failed {
                program,
                status: Some(code),
                stderr,
            } => write!(f, "{program} exited with status {code}: {}", stderr.trim()),
            Self::Failed {
                program,
                status: None,
                ..
            } => write!(f, "{program} terminated by signal"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Supplicant control interface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    Command(CommandError),
    /// The supplicant replied with something other than `OK`.
    Rejected { op: &'static str, reply: String },
    /// Every raw scan source failed.
    NoScanData,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "{e}"),
            Self::Rejected { op, reply } => write!(f, "{op} rejected: '{}'", reply.trim()),
            Self::NoScanData => write!(f, "no scan source produced output"),
        }
    }
}

impl std::error::Error for ControlError {}

impl From<CommandError> for ControlError {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<ControlError> for Error {
    fn from(e: ControlError) -> Self {
        Self::Control(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// Every attempt produced zero records for the target SSID.
    NoCandidates { attempts: u32 },
    /// Shutdown was requested while waiting for a scan to settle.
    Interrupted,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCandidates { attempts } => {
                write!(f, "no candidates after {attempts} scan attempt(s)")
            }
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Self::Scan(e)
    }
}

// ---------------------------------------------------------------------------
// Roam execution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoamError {
    /// Both the roam command and the select-network fallback failed.
    CommandFailed { target: Bssid, reason: String },
    /// No verification method reported a live BSSID in time.
    Unverified { target: Bssid, probes: u32 },
    /// Shutdown was requested mid-roam.
    Interrupted { target: Bssid },
}

impl fmt::Display for RoamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFailed { target, reason } => {
                write!(f, "roam to {target} failed: {reason}")
            }
            Self::Unverified { target, probes } => {
                write!(f, "roam to {target} unverified after {probes} probe(s)")
            }
            Self::Interrupted { target } => write!(f, "roam to {target} interrupted"),
        }
    }
}

impl std::error::Error for RoamError {}

impl From<RoamError> for Error {
    fn from(e: RoamError) -> Self {
        Self::Roam(e)
    }
}

// ---------------------------------------------------------------------------
// Address acquisition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Every strategy in the fallback chain was tried.
    Exhausted { tried: Vec<&'static str> },
    Interrupted,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { tried } if tried.is_empty() => {
                write!(f, "no acquisition strategy available")
            }
            Self::Exhausted { tried } => {
                write!(f, "no address after trying {}", tried.join(", "))
            }
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for AddressError {}

impl From<AddressError> for Error {
    fn from(e: AddressError) -> Self {
        Self::Address(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided by any source.
    Missing(&'static str),
    /// A setting failed range or format validation.
    Invalid { field: &'static str, reason: String },
    /// The configuration file could not be read or parsed.
    File { path: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing required setting '{field}'"),
            Self::Invalid { field, reason } => write!(f, "invalid '{field}': {reason}"),
            Self::File { path, reason } => write!(f, "{path}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
