//! Core library for the `loadforge` CLI.
//!
//! A test definition names a target, environment and variable bindings, an
//! optional login step, scenarios made of requests and expectations, and a
//! load profile. `runner::run_test` resolves the bindings into an immutable
//! context, performs the login once, drives virtual users through the
//! scenarios, and returns a `report::LoadTestResult` with latency percentiles
//! and per-scenario breakdowns.
pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod model;
pub mod report;
pub mod runner;
pub mod shutdown;
