//! azur-test-harness: Test utilities for azurlib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the protocol engine without an amplifier on the bench.

pub mod mock_serial;

pub use mock_serial::MockTransport;
