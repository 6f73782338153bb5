//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the mock adapters in `mock_station`.  Nothing here touches a real
//! interface or spawns a process.

mod executor_tests;
mod mock_station;
mod reconciler_tests;
mod roaming_loop_tests;
