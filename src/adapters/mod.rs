//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements              | Connects to                       |
//! |------------|-------------------------|-----------------------------------|
//! | `wifi`     | WirelessControl         | `wpa_cli -i IF`                   |
//! |            | LinkQuery               | `iw dev IF link`, `iwconfig IF`   |
//! | `net`      | NetworkPort             | `ip`, `ping`                      |
//! | `lease`    | LeasePort               | `dhcpcd`, `dhclient`, `pgrep`     |
//! | `log_sink` | EventSink               | `log` facade                      |
//! | `pause`    | Pause                   | Mutex + Condvar shutdown flag     |
//!
//! `command` runs the programs, `parse` turns their output into values.

pub mod command;
pub mod lease;
pub mod log_sink;
pub mod net;
pub mod parse;
pub mod pause;
pub mod utils;
pub mod wifi;
