//! Errors raised while expanding and submitting workload units.
use tenantgen_common::tenant::CatalogError;

use crate::quantity::InvalidQuantity;

/// Errors that abort a generator run.
///
/// Each variant carries the owner and sequence of the workload unit it was raised for.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resource value of the tenant could not be parsed.
    #[error("{owner} unit {sequence}: {source}")]
    InvalidQuantity {
        /// Tenant that owns the unit
        owner: String,
        /// Sequence number of the unit
        sequence: u64,
        /// The parse failure
        source: InvalidQuantity,
    },
    /// Sequence numbers start at 1.
    #[error("{owner} unit {sequence}: sequence numbers start at 1")]
    InvalidSequence {
        /// Tenant that owns the unit
        owner: String,
        /// The rejected sequence number
        sequence: u64,
    },
    /// The tenant catalog is not usable.
    #[error("Catalog error: {source}")]
    Catalog {
        #[from]
        /// The catalog failure
        source: CatalogError,
    },
    /// The cluster rejected or failed to receive a workload unit.
    #[error("{owner} unit {sequence}: failed to submit {pod_name}: {source}")]
    Submission {
        /// Tenant that owns the unit
        owner: String,
        /// Sequence number of the unit
        sequence: u64,
        /// Name of the pod that was not created
        pod_name: String,
        /// Error reported by the submission collaborator
        source: anyhow::Error,
    },
    /// Progress output could not be written.
    #[error("Output error: {source}")]
    Output {
        #[from]
        /// The io failure
        source: std::io::Error,
    },
}
