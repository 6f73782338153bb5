//! Application core: roaming logic with no direct I/O.
//!
//! Discovery, selection, roam execution, address reconciliation and the
//! loop that drives them.  All interaction with the system happens through
//! the **port traits** in [`ports`], so every piece runs against mocks.

pub mod discovery;
pub mod events;
pub mod executor;
pub mod ports;
pub mod reconciler;
pub mod selector;
pub mod service;
pub mod session;
pub mod verify;
