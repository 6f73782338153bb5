//! roamd library.
//!
//! Exposes the roaming core and its adapters for the daemon binary,
//! integration tests and fuzz targets.  Everything that touches the
//! system lives under [`adapters`]; the rest is pure logic driven through
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod fsm;
pub mod poll;
pub mod scheduler;
