//! Sequential submission of every tenant's workload units.
use std::{fmt, io::Write};

use tenantgen_common::tenant::TenantSpec;
use tracing::{debug, info};

use crate::{
    expand::WorkloadExpander, identity::IdentityAllocator, manifest::ManifestBuilder,
    submit::PodSubmitter, Error,
};

/// Completion summary of a tenant whose units were all submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantSummary {
    /// Tenant name
    pub owner: String,
    /// Number of submitted units
    pub units: u64,
}

impl fmt::Display for TenantSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has {} application", self.owner, self.units)
    }
}

/// Expands, renders and submits workload units one at a time.
///
/// Holds the identity registry for the lifetime of a run.
pub struct SubmissionDriver<S> {
    expander: WorkloadExpander,
    builder: ManifestBuilder,
    submitter: S,
    identities: IdentityAllocator,
}

impl<S: PodSubmitter> SubmissionDriver<S> {
    /// Create a driver with an empty identity registry.
    pub fn new(expander: WorkloadExpander, builder: ManifestBuilder, submitter: S) -> Self {
        Self {
            expander,
            builder,
            submitter,
            identities: IdentityAllocator::new(),
        }
    }

    /// Submit every tenant in order, writing one summary line per completed tenant to `out`.
    ///
    /// The first failure stops the run. Units submitted before it stay on the cluster.
    pub async fn submit_all(
        &mut self,
        tenants: &[TenantSpec],
        out: &mut impl Write,
    ) -> Result<Vec<TenantSummary>, Error> {
        let mut summaries = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            let summary = self.submit_tenant(tenant).await?;
            writeln!(out, "{summary}")?;
            summaries.push(summary);
        }
        Ok(summaries)
    }

    /// Submit all units of a single tenant in ascending sequence order.
    ///
    /// The tenant is validated first; an invalid tenant submits nothing.
    pub async fn submit_tenant(&mut self, tenant: &TenantSpec) -> Result<TenantSummary, Error> {
        tenant.validate()?;
        info!(tenant = %tenant.name, replicas = tenant.replicas, "submitting tenant");
        let units = self.expander.expand(tenant, &mut self.identities)?;
        for unit in &units {
            let pod = self.builder.build(unit);
            self.submitter
                .create(&pod)
                .await
                .map_err(|source| Error::Submission {
                    owner: unit.identity.owner.clone(),
                    sequence: unit.sequence,
                    pod_name: unit.pod_name.clone(),
                    source,
                })?;
            debug!(pod_name = %unit.pod_name, "submitted workload unit");
        }
        let summary = TenantSummary {
            owner: tenant.name.clone(),
            units: units.len() as u64,
        };
        info!(tenant = %summary.owner, units = summary.units, "tenant submitted");
        Ok(summary)
    }

    /// Identities allocated so far.
    pub fn identities(&self) -> &IdentityAllocator {
        &self.identities
    }
}
