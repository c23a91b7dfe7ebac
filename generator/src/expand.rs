//! Expansion of tenant definitions into individual workload units.
use std::collections::BTreeMap;

use tenantgen_common::tenant::{TenantSpec, RESOURCE_CPU, RESOURCE_DURATION, RESOURCE_MEMORY};
use tracing::{debug, warn};

use crate::{
    identity::{pod_name, ApplicationIdentity, IdentityAllocator},
    labels::{workload_labels, ResourceHints},
    quantity::{parse_duration_seconds, InvalidQuantity, ResourceKind, ResourceQuantity},
    Error,
};

/// Queue every workload unit is submitted to.
pub const DEFAULT_QUEUE: &str = "root.sandbox";
/// Namespace every workload unit is created in.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Placement of expanded workload units.
#[derive(Clone, Debug)]
pub struct ExpansionConfig {
    /// Namespace of the pods.
    pub namespace: String,
    /// Scheduling queue label value.
    pub queue: String,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            queue: DEFAULT_QUEUE.to_owned(),
        }
    }
}

/// A single fully expanded workload unit.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadDescriptor {
    /// Application identity of the unit.
    pub identity: ApplicationIdentity,
    /// 1-based position of the unit within its tenant.
    pub sequence: u64,
    /// Name of the pod.
    pub pod_name: String,
    /// Namespace of the pod.
    pub namespace: String,
    /// Scheduler facing labels.
    pub labels: BTreeMap<String, String>,
    /// Resources, used for both requests and limits.
    pub resources: BTreeMap<ResourceKind, ResourceQuantity>,
    /// How long the unit sleeps.
    pub sleep_seconds: u64,
}

/// Turns tenants into their workload descriptors.
#[derive(Clone, Debug, Default)]
pub struct WorkloadExpander {
    config: ExpansionConfig,
}

impl WorkloadExpander {
    /// Create an expander placing units according to `config`.
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    /// Expand a tenant into `tenant.replicas` descriptors in ascending sequence order.
    ///
    /// The first unit that fails to expand aborts the whole tenant.
    pub fn expand(
        &self,
        tenant: &TenantSpec,
        identities: &mut IdentityAllocator,
    ) -> Result<Vec<WorkloadDescriptor>, Error> {
        check_hints(tenant);
        (1..=tenant.replicas)
            .map(|sequence| self.descriptor(tenant, sequence, identities))
            .collect()
    }

    /// Expand the unit `sequence` of a tenant.
    pub fn descriptor(
        &self,
        tenant: &TenantSpec,
        sequence: u64,
        identities: &mut IdentityAllocator,
    ) -> Result<WorkloadDescriptor, Error> {
        let invalid = |source: InvalidQuantity| Error::InvalidQuantity {
            owner: tenant.name.clone(),
            sequence,
            source,
        };

        let cpu = parse_resource(tenant, RESOURCE_CPU, ResourceKind::Cpu).map_err(invalid)?;
        let memory =
            parse_resource(tenant, RESOURCE_MEMORY, ResourceKind::Memory).map_err(invalid)?;
        let sleep_seconds = parse_duration(tenant).map_err(invalid)?;
        // Only units that are actually emitted get registered.
        let identity = identities.allocate(&tenant.name, sequence)?;

        let hints = ResourceHints {
            vcore: tenant
                .hint(RESOURCE_CPU)
                .map(str::to_owned)
                .unwrap_or_else(|| cpu.hint()),
            memory: tenant
                .hint(RESOURCE_MEMORY)
                .map(str::to_owned)
                .unwrap_or_else(|| memory.hint()),
            duration: tenant
                .hint(RESOURCE_DURATION)
                .map(str::to_owned)
                .unwrap_or_else(|| sleep_seconds.to_string()),
        };
        let labels = workload_labels(&identity, &self.config.queue, &hints);

        let descriptor = WorkloadDescriptor {
            pod_name: pod_name(&tenant.name, sequence),
            namespace: self.config.namespace.clone(),
            identity,
            sequence,
            labels,
            resources: BTreeMap::from_iter([
                (ResourceKind::Cpu, cpu),
                (ResourceKind::Memory, memory),
            ]),
            sleep_seconds,
        };
        debug!(pod_name = %descriptor.pod_name, "expanded workload unit");
        Ok(descriptor)
    }
}

fn parse_resource(
    tenant: &TenantSpec,
    key: &'static str,
    kind: ResourceKind,
) -> Result<ResourceQuantity, InvalidQuantity> {
    let raw = tenant.resource(key).ok_or_else(|| InvalidQuantity {
        field: key,
        value: String::new(),
    })?;
    ResourceQuantity::parse(raw, kind)
}

fn parse_duration(tenant: &TenantSpec) -> Result<u64, InvalidQuantity> {
    parse_duration_seconds(tenant.resource(RESOURCE_DURATION).unwrap_or_default())
}

/// Warn when an explicit hint describes a different amount than the resource value.
///
/// Hints and values are compared in base units (millicores, bytes, seconds).
/// Hints are still used verbatim; the scheduler sees exactly what the tenant declares.
fn check_hints(tenant: &TenantSpec) {
    let values = [
        (
            RESOURCE_CPU,
            parse_resource(tenant, RESOURCE_CPU, ResourceKind::Cpu).map(|q| q.value()),
        ),
        (
            RESOURCE_MEMORY,
            parse_resource(tenant, RESOURCE_MEMORY, ResourceKind::Memory).map(|q| q.value()),
        ),
        (RESOURCE_DURATION, parse_duration(tenant)),
    ];
    for (key, value) in values {
        // Unparseable values are reported by the expansion itself.
        let (Some(hint), Ok(value)) = (tenant.hint(key), value) else {
            continue;
        };
        if hint.parse::<u64>().ok() != Some(value) {
            warn!(
                tenant = %tenant.name,
                resource = key,
                hint,
                value,
                "resource hint does not match resource value"
            );
        }
    }
}
