//! # molasm
//!
//! Command-line front end for `molasm-core`: configuration loading, file
//! input and output, and the session bridge driven from the terminal.

pub mod cli;
pub mod config;
