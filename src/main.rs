//! roamd daemon entry point.
//!
//! Hexagonal layout: the roaming core only sees port traits; this file
//! wires the system adapters in and owns process concerns (CLI, logging,
//! signals, exit codes).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  StationAdapter    NetAdapter     LeaseAdapter   LogEventSink│
//! │  (wpa_cli, iw)     (ip, ping)     (dhcpcd, ...)  (log)       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            RoamingLoop (pure logic)                    │  │
//! │  │  discovery · selector · roam FSM · reconciler          │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  ShutdownSignal ◀── signal thread (SIGINT / SIGTERM)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use roamd::adapters::command::SystemRunner;
use roamd::adapters::lease::LeaseAdapter;
use roamd::adapters::log_sink::LogEventSink;
use roamd::adapters::net::NetAdapter;
use roamd::adapters::pause::ShutdownSignal;
use roamd::adapters::wifi::{StationAdapter, StationTimeouts};
use roamd::app::service::{Ports, RoamingLoop};
use roamd::config::{ConfigOverrides, FileConfig, RoamConfig};
use roamd::domain::BandPreference;
use roamd::error::ConfigError;

/// Exit status for configuration errors.
const EXIT_CONFIG: u8 = 2;

// ── Command line ──────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "roamd", version, about = "Roam between access points of one SSID")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "ROAMD_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Network name to roam within.
    #[arg(long, env = "ROAMD_SSID")]
    ssid: Option<String>,

    /// Wireless interface (default wlan0).
    #[arg(long, env = "ROAMD_INTERFACE")]
    interface: Option<String>,

    #[arg(long, env = "ROAMD_MIN_WAIT_MINUTES", value_name = "MINUTES")]
    min_wait_minutes: Option<u32>,

    #[arg(long, env = "ROAMD_MAX_WAIT_MINUTES", value_name = "MINUTES")]
    max_wait_minutes: Option<u32>,

    /// Ignore candidates weaker than this (dBm, e.g. -75).
    #[arg(long, env = "ROAMD_MIN_SIGNAL_DBM", value_name = "DBM", allow_hyphen_values = true)]
    min_signal_dbm: Option<i32>,

    /// Band to prefer: 2.4G, 5G or 6G.
    #[arg(long, env = "ROAMD_PREFERRED_BAND", value_name = "BAND")]
    preferred_band: Option<BandPreference>,

    /// Log filter (overrides RUST_LOG), e.g. `debug` or `roamd=trace`.
    #[arg(long, env = "ROAMD_LOG_LEVEL", value_name = "FILTER")]
    log_level: Option<String>,

    /// Run a single iteration and exit.
    #[arg(long)]
    once: bool,

    /// Validate the configuration, print it as JSON and exit.
    #[arg(long)]
    check_config: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            ssid: self.ssid.clone(),
            interface: self.interface.clone(),
            min_wait_minutes: self.min_wait_minutes,
            max_wait_minutes: self.max_wait_minutes,
            min_signal_dbm: self.min_signal_dbm,
            preferred_band: self.preferred_band,
        }
    }

    fn resolve_config(&self) -> Result<RoamConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        RoamConfig::resolve(file, self.overrides())
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<ConfigError>().is_some() => {
            error!("configuration error: {e:#}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // ── 1. Configuration ──────────────────────────────────────
    let config = cli.resolve_config()?;
    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("roamd v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Shutdown plumbing ──────────────────────────────────
    let shutdown = ShutdownSignal::new();
    spawn_signal_listener(shutdown.clone())?;

    // ── 3. Adapters ───────────────────────────────────────────
    let timing = &config.timing;
    let mut station = StationAdapter::new(
        SystemRunner::new(),
        &config.interface,
        StationTimeouts::from(timing),
    )
    .context("compiling scan output patterns")?;
    let mut net = NetAdapter::new(SystemRunner::new(), &config.interface, timing);
    let mut lease = LeaseAdapter::new(
        SystemRunner::new(),
        &config.interface,
        &config.lease_state_dir,
        timing,
    );
    let mut sink = LogEventSink::new();

    // ── 4. Roaming loop ───────────────────────────────────────
    let mut roaming = RoamingLoop::new(config.clone());
    let mut ports = Ports {
        station: &mut station,
        net: &mut net,
        lease: &mut lease,
        pause: &shutdown,
        sink: &mut sink,
    };
    roaming.run(&mut ports, cli.once);
    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_millis().init();
}

/// SIGINT / SIGTERM trip `shutdown` from a dedicated thread running a
/// current-thread tokio runtime.
fn spawn_signal_listener(shutdown: ShutdownSignal) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building signal runtime")?;

    thread::Builder::new()
        .name("roamd-signals".into())
        .spawn(move || {
            match runtime.block_on(wait_for_signal()) {
                Ok(name) => {
                    info!("{name} received, shutting down");
                    shutdown.trigger();
                }
                Err(e) => error!("signal handling unavailable: {e}"),
            }
        })
        .context("spawning signal thread")?;
    Ok(())
}

async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}
