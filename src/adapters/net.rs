//! IPv4 state and link control through `ip` and `ping`.

use std::net::Ipv4Addr;
use std::time::Duration;

use log::debug;

use crate::app::ports::NetworkPort;
use crate::config::TimingConfig;
use crate::error::CommandError;

use super::command::{CommandRunner, SystemRunner};
use super::parse;

/// Extra time granted to `ping` beyond its own reply deadline.
const PING_SLACK: Duration = Duration::from_secs(1);

pub struct NetAdapter<R: CommandRunner = SystemRunner> {
    runner: R,
    interface: String,
    command_timeout: Duration,
    ping_timeout: Duration,
}

impl<R: CommandRunner> NetAdapter<R> {
    pub fn new(runner: R, interface: impl Into<String>, timing: &TimingConfig) -> Self {
        Self {
            runner,
            interface: interface.into(),
            command_timeout: timing.command_timeout(),
            ping_timeout: timing.ping_timeout(),
        }
    }

    fn ip(&mut self, args: &[&str]) -> Result<String, CommandError> {
        Ok(self.runner.run_ok("ip", args, self.command_timeout)?.stdout)
    }
}

impl<R: CommandRunner> NetworkPort for NetAdapter<R> {
    fn ipv4_address(&mut self) -> Result<Option<Ipv4Addr>, CommandError> {
        let iface = self.interface.clone();
        let text = self.ip(&["-4", "-o", "addr", "show", "dev", &iface])?;
        Ok(parse::parse_ipv4_address(&text))
    }

    fn default_gateway(&mut self) -> Result<Option<Ipv4Addr>, CommandError> {
        let iface = self.interface.clone();
        let text = self.ip(&["-4", "route", "show", "default", "dev", &iface])?;
        Ok(parse::parse_default_gateway(&text))
    }

    fn gateway_reachable(&mut self, gateway: Ipv4Addr) -> bool {
        let wait = self.ping_timeout.as_secs().max(1).to_string();
        let target = gateway.to_string();
        let iface = self.interface.clone();
        let args = ["-c", "1", "-W", wait.as_str(), "-I", iface.as_str(), target.as_str()];
        match self.runner.run("ping", &args, self.ping_timeout.saturating_add(PING_SLACK)) {
            Ok(out) => out.success(),
            Err(e) => {
                debug!("gateway probe {gateway} failed: {e}");
                false
            }
        }
    }

    fn set_link(&mut self, up: bool) -> Result<(), CommandError> {
        let iface = self.interface.clone();
        let state = if up { "up" } else { "down" };
        self.ip(&["link", "set", "dev", &iface, state]).map(drop)
    }
}
