//! Mediatidy - audio codec audit and download sorting
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod prompt;
pub mod sorter;
pub mod transcode;
