use kube::{
    api::{ObjectMeta, TypeMeta},
    Resource,
};

use super::kubeadm::KubeadmConfigSpec;
use super::prelude::*;
use super::{BootstrapConfig, ClusterResource};
use crate::client::ResourceKind;

mod control_plane {
    use super::super::prelude::*;

    #[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
    #[kube(
        kind = "KubeadmControlPlane",
        group = "controlplane.cluster.x-k8s.io",
        version = "v1beta1",
        namespaced
    )]
    pub struct KubeadmControlPlaneFantomSpec {}
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[resource(inherit = control_plane::KubeadmControlPlane)]
pub struct KubeadmControlPlane {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    pub metadata: ObjectMeta,
    pub spec: KubeadmControlPlaneSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeadmControlPlaneSpec {
    #[serde(default)]
    pub kubeadm_config_spec: KubeadmConfigSpec,

    /// `replicas`, `version`, `machineTemplate`, `rolloutStrategy`...
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl ClusterResource for KubeadmControlPlane {
    const KIND: ResourceKind = ResourceKind::KubeadmControlPlane;
}

impl BootstrapConfig for KubeadmControlPlane {
    fn config_spec(&self) -> &KubeadmConfigSpec {
        &self.spec.kubeadm_config_spec
    }

    fn config_spec_mut(&mut self) -> &mut KubeadmConfigSpec {
        &mut self.spec.kubeadm_config_spec
    }
}
