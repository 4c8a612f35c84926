use kube::{
    api::{ObjectMeta, TypeMeta},
    Resource,
};

use super::kubeadm::KubeadmConfigSpec;
use super::prelude::*;
use super::{BootstrapConfig, ClusterResource};
use crate::client::ResourceKind;

mod template {
    use super::super::prelude::*;

    #[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
    #[kube(
        kind = "KubeadmConfigTemplate",
        group = "bootstrap.cluster.x-k8s.io",
        version = "v1beta1",
        namespaced
    )]
    pub struct KubeadmConfigTemplateFantomSpec {}
}

/// Worker bootstrap configuration shared by the machines of a MachineDeployment.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[resource(inherit = template::KubeadmConfigTemplate)]
pub struct KubeadmConfigTemplate {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    pub metadata: ObjectMeta,
    pub spec: KubeadmConfigTemplateSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct KubeadmConfigTemplateSpec {
    pub template: KubeadmConfigTemplateResource,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct KubeadmConfigTemplateResource {
    #[serde(default)]
    pub spec: KubeadmConfigSpec,

    /// Template `metadata`.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl ClusterResource for KubeadmConfigTemplate {
    const KIND: ResourceKind = ResourceKind::KubeadmConfigTemplate;
}

impl BootstrapConfig for KubeadmConfigTemplate {
    fn config_spec(&self) -> &KubeadmConfigSpec {
        &self.spec.template.spec
    }

    fn config_spec_mut(&mut self) -> &mut KubeadmConfigSpec {
        &mut self.spec.template.spec
    }
}
