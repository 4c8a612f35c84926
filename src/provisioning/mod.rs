//! Side effects of `append` that prepare future clusters rather than running ones.
//!
//! None of these are fatal: failures are logged and the rollout continues.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{ObjectMeta, Patch, PatchParams};
use kube::{Api, Client};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::certificate::{Certificate, DEFAULT_FILE_NAME};
use crate::client::FIELD_MANAGER;

/// ytt overlay picked up by the Tanzu CLI when it renders new cluster manifests.
pub static OVERLAY: &str = include_str!("overlay.yaml");
pub static OVERLAY_FILE_NAME: &str = "overlay.yaml";

/// Directory under `$HOME` the Tanzu CLI reads customizations from.
pub static PROVISIONING_SUBDIR: &str = ".config/tanzu/tkg/providers/ytt/03_customizations";

pub static KAPP_SECRET_NAME: &str = "kapp-controller-config";
pub static KAPP_SECRET_NAMESPACE: &str = "tkg-system";
pub static KAPP_CA_CERTS_KEY: &str = "caCerts";

pub type ProvisioningResult<T> = std::result::Result<T, ProvisioningError>;

#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("Unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to apply kapp-controller secret: {0}")]
    Secret(#[from] kube::Error),
}

pub fn default_provisioning_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(PROVISIONING_SUBDIR)
}

/// Write the overlay and the certificate for the next cluster created by the Tanzu CLI.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub async fn write_provisioning_files(dir: &Path, cert: &Certificate) {
    let files = [
        (dir.join(OVERLAY_FILE_NAME), overlay(cert)),
        (dir.join(format!("{}.pem", cert.name())), cert.content().to_string()),
    ];

    for (path, content) in files {
        match write_file(&path, &content).await {
            Ok(()) => info!(path = %path.display(), "Wrote provisioning file"),
            Err(e) => warn!("{e}"),
        }
    }
}

/// Overlay with the embedded file name switched to the certificate's.
pub fn overlay(cert: &Certificate) -> String {
    OVERLAY.replace(DEFAULT_FILE_NAME, cert.name())
}

async fn write_file(path: &Path, content: &str) -> ProvisioningResult<()> {
    let write = async {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await
    };

    write.await.map_err(|source| ProvisioningError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl From<&Certificate> for Secret {
    fn from(cert: &Certificate) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(KAPP_SECRET_NAME.to_string()),
                namespace: Some(KAPP_SECRET_NAMESPACE.to_string()),
                ..Default::default()
            },
            type_: Some("Opaque".to_string()),
            data: Some(BTreeMap::from([(
                KAPP_CA_CERTS_KEY.to_string(),
                ByteString(cert.content().as_bytes().to_vec()),
            )])),
            ..Default::default()
        }
    }
}

/// Hand the certificate to kapp-controller so packages pulled from private registries
/// keep working.
pub async fn apply_kapp_controller_secret(
    client: Client,
    cert: &Certificate,
) -> ProvisioningResult<()> {
    let api: Api<Secret> = Api::namespaced(client, KAPP_SECRET_NAMESPACE);
    let secret = Secret::from(cert);

    api.patch(
        KAPP_SECRET_NAME,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(&secret),
    )
    .await?;

    info!(
        namespace = KAPP_SECRET_NAMESPACE,
        name = KAPP_SECRET_NAME,
        "Applied kapp-controller secret"
    );
    Ok(())
}
