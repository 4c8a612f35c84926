use std::{fmt::Display, str::FromStr};

use thiserror::Error;

use crate::api::kubeadm::{File, KubeadmConfigSpec};
use crate::certificate::Certificate;

pub static FILE_OWNER: &str = "root";
pub static FILE_PERMISSIONS: &str = "0644";

/// What to do with the certificate across the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CertificateAction {
    Append,
    Delete,
}

impl CertificateAction {
    /// Apply the action to a bootstrap configuration.
    pub fn edit(&self, spec: &mut KubeadmConfigSpec, cert: &Certificate) {
        match self {
            Self::Append => spec.append_certificate(cert),
            Self::Delete => spec.remove_certificate(cert),
        }
    }
}

impl FromStr for CertificateAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(Self::Append),
            "delete" => Ok(Self::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl Display for CertificateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Append => "append",
            Self::Delete => "delete",
        })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown action `{0}`, expected `append` or `delete`")]
pub struct UnknownAction(pub String);

impl From<&Certificate> for File {
    fn from(cert: &Certificate) -> Self {
        Self {
            path: cert.node_path(),
            content: Some(cert.content().to_string()),
            owner: Some(FILE_OWNER.to_string()),
            permissions: Some(FILE_PERMISSIONS.to_string()),
            ..Default::default()
        }
    }
}

impl KubeadmConfigSpec {
    /// Add the certificate file unless an entry with the same content is already present.
    pub fn append_certificate(&mut self, cert: &Certificate) {
        if !self.has_certificate(cert) {
            self.files.push(cert.into());
        }
        self.pre_kubeadm_commands = cert.trust_store_commands();
    }

    /// Drop every file entry carrying the certificate content.
    pub fn remove_certificate(&mut self, cert: &Certificate) {
        self.files
            .retain(|file| file.content.as_deref() != Some(cert.content()));
        self.pre_kubeadm_commands = cert.trust_store_commands();
    }

    pub fn has_certificate(&self, cert: &Certificate) -> bool {
        self.files
            .iter()
            .any(|file| file.content.as_deref() == Some(cert.content()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cert(content: &str) -> Certificate {
        Certificate::new(content, "tkg-custom-ca")
    }

    fn spec_with_files() -> KubeadmConfigSpec {
        serde_json::from_value(json!({
            "files": [
                {"path": "/etc/kubernetes/admission.yaml", "content": "kind: AdmissionConfiguration", "owner": "root:root"},
                {"path": "/etc/kubernetes/azure.json", "contentFrom": {"secret": {"name": "azure-json", "key": "worker-node-azure.json"}}}
            ],
            "preKubeadmCommands": ["hostname \"{{ ds.meta_data.hostname }}\"", "echo done"],
            "postKubeadmCommands": ["echo joined"]
        }))
        .unwrap()
    }

    fn count(spec: &KubeadmConfigSpec, cert: &Certificate) -> usize {
        spec.files
            .iter()
            .filter(|f| f.content.as_deref() == Some(cert.content()))
            .count()
    }

    #[test]
    fn append_adds_the_root_owned_file() {
        let cert = cert("CERT_A");
        let mut spec = spec_with_files();
        spec.append_certificate(&cert);

        assert_eq!(spec.files.len(), 3);
        let added = spec.files.last().unwrap();
        assert_eq!(added.path, "/etc/ssl/certs/tkg-custom-ca.pem");
        assert_eq!(added.content.as_deref(), Some("CERT_A"));
        assert_eq!(added.owner.as_deref(), Some("root"));
        assert_eq!(added.permissions.as_deref(), Some("0644"));
        assert_eq!(spec.other["postKubeadmCommands"], json!(["echo joined"]));
    }

    #[test]
    fn append_is_idempotent() {
        let cert = cert("CERT_A");
        let mut once = spec_with_files();
        once.append_certificate(&cert);
        let mut twice = once.clone();
        twice.append_certificate(&cert);

        assert_eq!(count(&twice, &cert), 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn remove_is_idempotent() {
        let cert = cert("CERT_A");
        let mut spec = spec_with_files();
        spec.append_certificate(&cert);

        spec.remove_certificate(&cert);
        let once = spec.clone();
        spec.remove_certificate(&cert);

        assert_eq!(once, spec);
        assert_eq!(count(&spec, &cert), 0);
    }

    #[test]
    fn remove_after_append_restores_files() {
        let cert = cert("CERT_A");
        let original = spec_with_files();
        let mut spec = original.clone();

        spec.append_certificate(&cert);
        spec.remove_certificate(&cert);

        assert_eq!(spec.files, original.files);
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let cert = cert("CERT_A");
        let mut spec = spec_with_files();
        spec.files.push((&cert).into());
        spec.files.insert(0, (&cert).into());
        assert_eq!(count(&spec, &cert), 2);

        spec.remove_certificate(&cert);
        assert_eq!(count(&spec, &cert), 0);
        assert_eq!(spec.files.len(), 2);
    }

    #[test]
    fn remove_keeps_other_certificates() {
        let keep = cert("CERT_B");
        let mut spec = spec_with_files();
        spec.append_certificate(&keep);

        spec.remove_certificate(&cert("CERT_A"));
        assert!(spec.has_certificate(&keep));
    }

    #[test]
    fn commands_are_replaced_not_merged() {
        let cert = cert("CERT_A");
        let canonical = cert.trust_store_commands();

        let mut appended = spec_with_files();
        appended.append_certificate(&cert);
        assert_eq!(appended.pre_kubeadm_commands, canonical);

        let mut removed = spec_with_files();
        removed.remove_certificate(&cert);
        assert_eq!(removed.pre_kubeadm_commands, canonical);

        let mut empty = KubeadmConfigSpec::default();
        CertificateAction::Delete.edit(&mut empty, &cert);
        assert_eq!(empty.pre_kubeadm_commands, canonical);
        assert!(empty.files.is_empty());
    }

    #[test]
    fn actions_parse_from_cli_values() {
        assert_eq!(
            "append".parse::<CertificateAction>(),
            Ok(CertificateAction::Append)
        );
        assert_eq!(
            "delete".parse::<CertificateAction>(),
            Ok(CertificateAction::Delete)
        );
        assert_eq!(
            "rotate".parse::<CertificateAction>(),
            Err(UnknownAction("rotate".into()))
        );
    }
}
