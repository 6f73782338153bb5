//! DHCP clients: `dhcpcd` as the long-running daemon, `dhclient` as the
//! one-shot client.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use log::debug;

use crate::app::ports::LeasePort;
use crate::config::TimingConfig;
use crate::error::CommandError;

use super::command::{CommandRunner, SystemRunner, program_available};

const DAEMON: &str = "dhcpcd";
const ONESHOT: &str = "dhclient";

pub struct LeaseAdapter<R: CommandRunner = SystemRunner> {
    runner: R,
    interface: String,
    state_dir: PathBuf,
    command_timeout: Duration,
    release_timeout: Duration,
    request_timeout: Duration,
    available: fn(&str) -> bool,
}

impl<R: CommandRunner> LeaseAdapter<R> {
    pub fn new(
        runner: R,
        interface: impl Into<String>,
        state_dir: impl Into<PathBuf>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            runner,
            interface: interface.into(),
            state_dir: state_dir.into(),
            command_timeout: timing.command_timeout(),
            release_timeout: timing.lease_release_timeout(),
            request_timeout: timing.lease_request_timeout(),
            available: program_available,
        }
    }

    /// Replace the `PATH` lookup.
    pub fn with_availability(mut self, available: fn(&str) -> bool) -> Self {
        self.available = available;
        self
    }

    fn client(&mut self, program: &str, flag: &str, timeout: Duration) -> Result<(), CommandError> {
        let iface = self.interface.clone();
        self.runner.run_ok(program, &[flag, &iface], timeout).map(drop)
    }
}

impl<R: CommandRunner> LeasePort for LeaseAdapter<R> {
    fn daemon_available(&mut self) -> bool {
        (self.available)(DAEMON)
    }

    fn daemon_running(&mut self) -> bool {
        match self
            .runner
            .run("pgrep", &["-x", DAEMON], self.command_timeout)
        {
            Ok(out) => out.success(),
            Err(e) => {
                debug!("pgrep {DAEMON}: {e}");
                false
            }
        }
    }

    fn state_dir_writable(&mut self) -> bool {
        dir_writable(&self.state_dir)
    }

    fn daemon_release_renew(&mut self) -> Result<(), CommandError> {
        self.client(DAEMON, "-k", self.release_timeout)?;
        self.client(DAEMON, "-n", self.release_timeout)
    }

    fn daemon_start(&mut self) -> Result<(), CommandError> {
        self.client(DAEMON, "-b", self.request_timeout)
    }

    fn oneshot_available(&mut self) -> bool {
        (self.available)(ONESHOT)
    }

    fn oneshot_release(&mut self) -> Result<(), CommandError> {
        self.client(ONESHOT, "-r", self.release_timeout)
    }

    fn oneshot_request(&mut self) -> Result<(), CommandError> {
        self.client(ONESHOT, "-1", self.request_timeout)
    }
}

/// Probe by creating and removing a scratch file.
fn dir_writable(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let probe = dir.join(format!(".roamd-probe-{}", process::id()));
    match OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) => {
            debug!("{} not writable: {e}", dir.display());
            false
        }
    }
}
