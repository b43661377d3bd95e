//! houston-tools - client-side utilities for the houston trading platform
//!
//! This library provides the pieces of the houston client that do real work
//! locally: splitting long date intervals into period-aligned request
//! ranges, and reshaping pivoted Pnl CSV exports into typed tables.

pub mod config;
pub mod dates;
pub mod error;
pub mod pnl;

pub use error::{HoustonError, Result};
