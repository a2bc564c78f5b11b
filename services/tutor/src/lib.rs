//! PathFinder Tutor Library Crate
//!
//! Configuration, command-line flags and startup wiring for the `pathfinder`
//! binary. The binary itself is a thin wrapper around [`app::run`].

pub mod app;
pub mod cli;
pub mod config;
