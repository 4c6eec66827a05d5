//! Enjambre — Rust-native load-test script generation.
//!
//! Parses HTTP Archive captures, rebuilds each request as a Python call
//! expression, and assembles the result into a runnable Locust scenario.

pub mod cli;
pub mod core;
pub mod locust;
pub mod python;
