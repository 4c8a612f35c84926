use std::path::PathBuf;

use clap::Parser;

use crate::certificate::DEFAULT_FILE_NAME;
use crate::editor::{CertificateAction, UnknownAction};
use crate::orchestrator::RunOptions;
use crate::provisioning::default_provisioning_dir;

/// Manage the lifecycle of a custom CA certificate on Cluster API managed nodes
#[derive(Parser, Debug)]
#[command(name = "custom-ca-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Action to execute: `append` adds the certificate, `delete` removes it
    #[arg(short, long)]
    pub action: String,

    /// Path to the PEM encoded CA certificate, e.g. ./tkg-custom-ca.crt
    #[arg(short, long)]
    pub cert: PathBuf,

    /// Namespace holding the Cluster API objects
    #[arg(short, long, env = "CUSTOM_CA_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// File name stem of the certificate on the nodes
    #[arg(long, default_value = DEFAULT_FILE_NAME)]
    pub file_name: String,

    /// Also edit KubeadmControlPlane objects
    #[arg(long)]
    pub include_control_plane: bool,

    /// Skip objects removed between listing and fetching instead of aborting
    #[arg(long)]
    pub skip_missing: bool,

    /// Do not write local provisioning files nor the kapp-controller secret
    #[arg(long)]
    pub skip_side_files: bool,

    /// Directory receiving the ytt overlay, defaults to the Tanzu CLI customizations
    #[arg(long, env = "CUSTOM_CA_PROVISIONING_DIR")]
    pub provisioning_dir: Option<PathBuf>,
}

/// Validated settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub action: CertificateAction,
    pub cert: PathBuf,
    pub namespace: String,
    pub file_name: String,
    pub options: RunOptions,
    pub side_files: bool,
    pub provisioning_dir: PathBuf,
}

impl TryFrom<Cli> for Config {
    type Error = UnknownAction;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        Ok(Self {
            action: cli.action.parse()?,
            cert: cli.cert,
            namespace: cli.namespace,
            file_name: cli.file_name,
            options: RunOptions {
                include_control_plane: cli.include_control_plane,
                skip_missing: cli.skip_missing,
            },
            side_files: !cli.skip_side_files,
            provisioning_dir: cli.provisioning_dir.unwrap_or_else(default_provisioning_dir),
        })
    }
}
