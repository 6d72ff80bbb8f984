//! Command-line interface for tarmac-prof
//!
//! This module contains CLI argument parsing and its conversion into a
//! [`RunConfig`](crate::pipeline::RunConfig)

pub mod args;

pub use args::Args;
