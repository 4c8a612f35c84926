use kube::{
    api::{ObjectMeta, TypeMeta},
    Resource,
};

use super::prelude::*;
use super::ClusterResource;
use crate::client::ResourceKind;

mod deployment {
    use super::super::prelude::*;

    #[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug, JsonSchema)]
    #[kube(
        kind = "MachineDeployment",
        group = "cluster.x-k8s.io",
        version = "v1beta1",
        namespaced
    )]
    pub struct MachineDeploymentFantomSpec {}
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[resource(inherit = deployment::MachineDeployment)]
pub struct MachineDeployment {
    #[serde(flatten, default)]
    pub types: Option<TypeMeta>,
    pub metadata: ObjectMeta,
    pub spec: MachineDeploymentSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MachineDeploymentSpec {
    #[serde(default)]
    pub template: MachineTemplateSpec,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MachineTemplateSpec {
    #[serde(default)]
    pub metadata: TemplateMeta,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Metadata stamped onto every Machine created from the template.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TemplateMeta {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ClusterResource for MachineDeployment {
    const KIND: ResourceKind = ResourceKind::MachineDeployment;
}
