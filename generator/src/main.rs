//! Tenantgen submits synthetic multi-tenant pods to load test a cluster scheduler
use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use tenantgen::{
    driver::SubmissionDriver,
    expand::{ExpansionConfig, WorkloadExpander, DEFAULT_NAMESPACE, DEFAULT_QUEUE},
    manifest::{ManifestBuilder, ManifestConfig, DEFAULT_IMAGE, DEFAULT_SCHEDULER_NAME},
    submit::{DryRunSubmitter, KubeSubmitter, PodSubmitter},
};
use tenantgen_common::{telemetry, tenant::TenantCatalog};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a kubeconfig file, otherwise the config is inferred from the environment
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// YAML file describing the tenants, otherwise the builtin tenants are used
    #[arg(long, env = "TENANTGEN_TENANTS")]
    tenants: Option<PathBuf>,

    /// Override the replica count of every tenant
    #[arg(long)]
    replicas: Option<u64>,

    /// Namespace the pods are created in
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,

    /// Scheduling queue of the pods
    #[arg(long, default_value = DEFAULT_QUEUE)]
    queue: String,

    /// Scheduler the pods are routed to
    #[arg(long, default_value = DEFAULT_SCHEDULER_NAME)]
    scheduler_name: String,

    /// Image of the sleeping container
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// Pull policy of the image
    #[arg(long)]
    image_pull_policy: Option<String>,

    /// Print the pods as YAML instead of creating them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    telemetry::init()?;
    info!(?args, "starting generator");

    let catalog = match &args.tenants {
        Some(path) => TenantCatalog::from_path(path)?,
        None => TenantCatalog::builtin(),
    };
    let catalog = match args.replicas {
        Some(replicas) => catalog.with_replicas(replicas),
        None => catalog,
    };
    info!(
        tenants = catalog.tenants.len(),
        units = catalog.total_units(),
        "loaded tenant catalog"
    );

    let expander = WorkloadExpander::new(ExpansionConfig {
        namespace: args.namespace.clone(),
        queue: args.queue.clone(),
    });
    let builder = ManifestBuilder::new(ManifestConfig {
        scheduler_name: args.scheduler_name.clone(),
        image: args.image.clone(),
        image_pull_policy: args.image_pull_policy.clone(),
    });

    if args.dry_run {
        // Pods go to stdout, keep summaries out of the YAML stream.
        let submitter = DryRunSubmitter::new(std::io::stdout());
        run(&catalog, expander, builder, submitter, &mut std::io::stderr()).await
    } else {
        let submitter = KubeSubmitter::new(kube_client(args.kubeconfig.as_ref()).await?);
        run(&catalog, expander, builder, submitter, &mut std::io::stdout()).await
    }
}

async fn run(
    catalog: &TenantCatalog,
    expander: WorkloadExpander,
    builder: ManifestBuilder,
    submitter: impl PodSubmitter,
    out: &mut impl Write,
) -> Result<()> {
    let mut driver = SubmissionDriver::new(expander, builder, submitter);
    driver.submit_all(&catalog.tenants, out).await?;
    debug!(
        applications = driver.identities().len(),
        "allocated application identities"
    );
    Ok(())
}

async fn kube_client(kubeconfig: Option<&PathBuf>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        }
        None => Config::infer().await?,
    };
    Ok(Client::try_from(config)?)
}
