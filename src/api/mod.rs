use kube::Resource;
use serde::{de::DeserializeOwned, Serialize};

use crate::client::ResourceKind;

pub mod kubeadm;
pub mod kubeadm_config_template;
pub mod kubeadm_control_plane;
pub mod machine_deployment;

#[allow(unused_imports)]
mod prelude {
    pub use kube::CustomResource;
    pub use schemars::JsonSchema;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;
    pub use std::collections::BTreeMap;
}

/// Cluster API object the tool reads and writes through the dynamic client.
pub trait ClusterResource:
    Resource<DynamicType = ()> + Serialize + DeserializeOwned + Clone + std::fmt::Debug
{
    const KIND: ResourceKind;
}

/// Object embedding a kubeadm bootstrap configuration.
pub trait BootstrapConfig: ClusterResource {
    fn config_spec(&self) -> &kubeadm::KubeadmConfigSpec;
    fn config_spec_mut(&mut self) -> &mut kubeadm::KubeadmConfigSpec;
}
