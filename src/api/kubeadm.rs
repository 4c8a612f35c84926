use super::prelude::*;

/// Subset of the CABPK `KubeadmConfigSpec` touched by certificate edits.
///
/// Fields that are not modelled are carried in `other` and written back untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeadmConfigSpec {
    /// Always serialized, an empty list has to reach the server to clear the field on merge.
    #[serde(default)]
    pub files: Vec<File>,

    #[serde(default)]
    pub pre_kubeadm_commands: Vec<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// File written to the node before kubeadm runs.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,

    /// `encoding`, `contentFrom`, `append` and anything newer.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}
