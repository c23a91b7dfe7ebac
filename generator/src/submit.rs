//! The cluster submission collaborator.
use std::{io::Write, sync::Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, PostParams},
    client::Client,
    ResourceExt,
};

/// Define the behavior we consume from the cluster API.
#[async_trait]
pub trait PodSubmitter {
    /// Create a pod, reporting success or failure.
    async fn create(&self, pod: &Pod) -> Result<()>;
}

/// Creates pods through the Kubernetes API.
pub struct KubeSubmitter {
    k_client: Client,
}

impl KubeSubmitter {
    /// Create a submitter using the given client.
    pub fn new(k_client: Client) -> Self {
        Self { k_client }
    }
}

#[async_trait]
impl PodSubmitter for KubeSubmitter {
    async fn create(&self, pod: &Pod) -> Result<()> {
        let pods: Api<Pod> = match pod.namespace() {
            Some(ns) => Api::namespaced(self.k_client.clone(), &ns),
            None => Api::default_namespaced(self.k_client.clone()),
        };
        pods.create(&PostParams::default(), pod).await?;
        Ok(())
    }
}

/// Writes every pod as a YAML document instead of creating it.
pub struct DryRunSubmitter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> DryRunSubmitter<W> {
    /// Create a submitter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the submitter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|err| err.into_inner())
    }
}

#[async_trait]
impl<W: Write + Send> PodSubmitter for DryRunSubmitter<W> {
    async fn create(&self, pod: &Pod) -> Result<()> {
        let doc = serde_yaml::to_string(pod)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("dry run output lock poisoned"))?;
        writeln!(out, "---")?;
        out.write_all(doc.as_bytes())?;
        Ok(())
    }
}
