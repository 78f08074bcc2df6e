//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against simulated controllers.  All tests run on the host with no real
//! hardware required.

mod mock_hw;
mod stopwatch_tests;
