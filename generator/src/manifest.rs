//! Rendering of workload descriptors into pods.
use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{Container, Pod, PodSpec, ResourceRequirements},
    apimachinery::pkg::api::resource::Quantity,
};
use kube::api::ObjectMeta;

use crate::expand::WorkloadDescriptor;

/// Scheduler every workload unit is routed to.
pub const DEFAULT_SCHEDULER_NAME: &str = "yunikorn";
/// Image of the sleeping container.
pub const DEFAULT_IMAGE: &str = "alpine:latest";
/// Name of the single container in each pod.
pub const CONTAINER_NAME: &str = "sleep";

/// Configuration for the rendered pods.
#[derive(Clone, Debug)]
pub struct ManifestConfig {
    /// Scheduler the pods are routed to, instead of the default scheduler.
    pub scheduler_name: String,
    /// Image for the sleeping container.
    pub image: String,
    /// Pull policy for image, the cluster default when unset.
    pub image_pull_policy: Option<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            scheduler_name: DEFAULT_SCHEDULER_NAME.to_owned(),
            image: DEFAULT_IMAGE.to_owned(),
            image_pull_policy: None,
        }
    }
}

/// Renders workload descriptors into pods.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
    config: ManifestConfig,
}

impl ManifestBuilder {
    /// Create a builder rendering pods according to `config`.
    pub fn new(config: ManifestConfig) -> Self {
        Self { config }
    }

    /// Render a single workload unit.
    ///
    /// Requests and limits are always equal so every pod is guaranteed class.
    pub fn build(&self, descriptor: &WorkloadDescriptor) -> Pod {
        let resources: BTreeMap<String, Quantity> = descriptor
            .resources
            .iter()
            .map(|(kind, quantity)| (kind.as_str().to_owned(), quantity.to_quantity()))
            .collect();

        Pod {
            metadata: ObjectMeta {
                name: Some(descriptor.pod_name.clone()),
                namespace: Some(descriptor.namespace.clone()),
                labels: Some(descriptor.labels.clone()),
                ..Default::default()
            },
            spec: Some(PodSpec {
                scheduler_name: Some(self.config.scheduler_name.clone()),
                restart_policy: Some("Never".to_owned()),
                containers: vec![Container {
                    name: CONTAINER_NAME.to_owned(),
                    image: Some(self.config.image.clone()),
                    image_pull_policy: self.config.image_pull_policy.clone(),
                    command: Some(vec![
                        "sleep".to_owned(),
                        descriptor.sleep_seconds.to_string(),
                    ]),
                    resources: Some(ResourceRequirements {
                        requests: Some(resources.clone()),
                        limits: Some(resources),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
