//! Provides types and functions that common to both the generator and its tooling.
#![deny(missing_docs)]
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod tenant;
