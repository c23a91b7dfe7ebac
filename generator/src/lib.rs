//! Expands simulated tenants into pods and submits them to a cluster
//! so that a scheduler under test has something to place.
#![warn(missing_docs)]

/// Driver module for submitting every tenant's workload units.
pub mod driver;
/// Error types shared by the generator modules.
pub mod error;
/// Expand module for turning tenants into workload descriptors.
pub mod expand;
/// Identity module for allocating application identifiers.
pub mod identity;
/// Labels module for the scheduler facing pod labels.
pub mod labels;
/// Manifest module for rendering descriptors into pods.
pub mod manifest;
/// Quantity module for parsing resource amounts.
pub mod quantity;
/// Submit module for the cluster submission collaborator.
pub mod submit;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::Error;
