use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::api::{
    kubeadm_config_template::KubeadmConfigTemplate, kubeadm_control_plane::KubeadmControlPlane,
    machine_deployment::MachineDeployment, BootstrapConfig, ClusterResource,
};
use crate::certificate::Certificate;
use crate::client::{decode, encode, ApplyMode, ResourceClient};
use crate::editor::CertificateAction;
use crate::rollout::bump_rollout;
use crate::{telemetry, Result};

/// Knobs controlling which objects are visited and how failures are treated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Also edit KubeadmControlPlane objects.
    pub include_control_plane: bool,
    /// Skip objects deleted between listing and fetching instead of aborting.
    pub skip_missing: bool,
}

/// Objects written during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub control_planes: usize,
    pub config_templates: usize,
    pub machine_deployments: usize,
    pub skipped: usize,
}

/// Propagates a certificate into every bootstrap configuration and rolls the node groups.
///
/// All configuration writes finish before the first MachineDeployment is touched, so
/// machines created by the rollout always boot from an updated configuration. The first
/// failure aborts the run; objects already written stay written.
pub struct Orchestrator<C> {
    client: C,
    certificate: Certificate,
    options: RunOptions,
}

impl<C: ResourceClient> Orchestrator<C> {
    pub fn new(client: C, certificate: Certificate, options: RunOptions) -> Self {
        Self {
            client,
            certificate,
            options,
        }
    }

    #[instrument(skip(self), fields(trace_id = display(telemetry::get_trace_id()), certificate = self.certificate.name()), err)]
    pub async fn run(&self, action: CertificateAction) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if self.options.include_control_plane {
            let mode = match action {
                CertificateAction::Append => ApplyMode::Replace,
                CertificateAction::Delete => ApplyMode::MergePatch,
            };
            summary.control_planes = self
                .update_configs::<KubeadmControlPlane>(action, mode, &mut summary.skipped)
                .await?;
        }

        summary.config_templates = self
            .update_configs::<KubeadmConfigTemplate>(
                action,
                ApplyMode::MergePatch,
                &mut summary.skipped,
            )
            .await?;

        summary.machine_deployments = self.trigger_rollouts(&mut summary.skipped).await?;

        info!(?summary, %action, "Certificate propagated");
        Ok(summary)
    }

    async fn update_configs<K: BootstrapConfig>(
        &self,
        action: CertificateAction,
        mode: ApplyMode,
        skipped: &mut usize,
    ) -> Result<usize> {
        let mut updated = 0;

        for name in self.client.list(K::KIND).await? {
            let Some(mut config) = self.fetch::<K>(&name).await? else {
                *skipped += 1;
                continue;
            };

            action.edit(config.config_spec_mut(), &self.certificate);
            debug!(kind = %K::KIND, name, files = config.config_spec().files.len(), "Edited bootstrap configuration");

            self.submit(&name, config, mode).await?;
            info!(kind = %K::KIND, name, %action, "Updated bootstrap configuration");
            updated += 1;
        }

        Ok(updated)
    }

    async fn trigger_rollouts(&self, skipped: &mut usize) -> Result<usize> {
        let mut rolled = 0;

        for name in self.client.list(MachineDeployment::KIND).await? {
            let Some(mut deployment) = self.fetch::<MachineDeployment>(&name).await? else {
                *skipped += 1;
                continue;
            };

            bump_rollout(&mut deployment, Utc::now());

            self.submit(&name, deployment, ApplyMode::MergePatch).await?;
            info!(name, "Triggered MachineDeployment rollout");
            rolled += 1;
        }

        Ok(rolled)
    }

    async fn fetch<K: ClusterResource>(&self, name: &str) -> Result<Option<K>> {
        match self.client.get(K::KIND, name).await {
            Ok(object) => Ok(Some(decode(name, object)?)),
            Err(e) if e.is_not_found() && self.options.skip_missing => {
                warn!(kind = %K::KIND, name, "Object disappeared after listing, skipping");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn submit<K: ClusterResource>(
        &self,
        name: &str,
        resource: K,
        mode: ApplyMode,
    ) -> Result<()> {
        let object = encode(resource)?;
        self.client.apply(K::KIND, name, &object, mode).await?;
        Ok(())
    }
}
