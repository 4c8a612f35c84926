use kube::Client;
use tracing::{info, instrument, warn};

use crate::certificate::Certificate;
use crate::client::KubeResourceClient;
use crate::config::Config;
use crate::editor::CertificateAction;
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::{provisioning, telemetry, Result};

/// Run one append or delete against the cluster of the current kubeconfig context.
#[instrument(skip_all, fields(trace_id = display(telemetry::get_trace_id()), action = %config.action, namespace = %config.namespace), err)]
pub async fn run(config: Config) -> Result<RunSummary> {
    let certificate = Certificate::load(&config.cert, &config.file_name).await?;

    let kubeconfig = kube::Config::infer().await?;
    info!(cluster_url = %kubeconfig.cluster_url, "Using cluster from the current context");
    let client = Client::try_from(kubeconfig)?;

    if config.action == CertificateAction::Append && config.side_files {
        provisioning::write_provisioning_files(&config.provisioning_dir, &certificate).await;
        if let Err(e) =
            provisioning::apply_kapp_controller_secret(client.clone(), &certificate).await
        {
            warn!("{e}");
        }
    }

    Orchestrator::new(
        KubeResourceClient::new(client, &config.namespace),
        certificate,
        config.options,
    )
    .run(config.action)
    .await
}
