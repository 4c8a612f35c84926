use thiserror::Error;

use certificate::CertificateError;
use client::ClientError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kube Error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] kube::config::InferConfigError),

    #[error("Cluster API error: {0}")]
    Client(#[from] ClientError),

    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Entry point used by main
pub mod controller;
pub use crate::controller::*;
pub mod api;
pub mod certificate;
pub mod client;
pub mod config;
pub use config::{Cli, Config};
pub mod editor;
pub mod orchestrator;
pub mod provisioning;
pub mod rollout;

/// Log and trace integrations
pub mod telemetry;
