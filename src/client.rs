//! Dynamic Cluster API client
//!
//! Every remote call the orchestrator makes goes through [`ResourceClient`], so tests can
//! substitute the cluster with a mock while production code talks to the API server.

use std::fmt::{self, Display};

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams, Patch, PatchParams, PostParams, TypeMeta};
use kube::discovery::ApiResource;
use kube::Client;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::api::{
    kubeadm_config_template::KubeadmConfigTemplate,
    kubeadm_control_plane::KubeadmControlPlane, machine_deployment::MachineDeployment,
    ClusterResource,
};

pub static FIELD_MANAGER: &str = "custom-ca-manager";

/// Page size used while listing. Listing follows continue tokens, so this only bounds a
/// single response, not the number of objects processed.
pub const LIST_PAGE_SIZE: u32 = 500;

/// Cluster API kinds the tool touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    KubeadmControlPlane,
    KubeadmConfigTemplate,
    MachineDeployment,
}

impl ResourceKind {
    pub fn api_resource(&self) -> ApiResource {
        match self {
            Self::KubeadmControlPlane => ApiResource::erase::<KubeadmControlPlane>(&()),
            Self::KubeadmConfigTemplate => ApiResource::erase::<KubeadmConfigTemplate>(&()),
            Self::MachineDeployment => ApiResource::erase::<MachineDeployment>(&()),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KubeadmControlPlane => "KubeadmControlPlane",
            Self::KubeadmConfigTemplate => "KubeadmConfigTemplate",
            Self::MachineDeployment => "MachineDeployment",
        })
    }
}

/// How a mutated object is written back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// POST to the collection. Not used by the orchestrator, which only rewrites existing
    /// objects.
    Create,
    /// PUT of the whole object.
    Replace,
    /// PATCH with `application/merge-patch+json`.
    MergePatch,
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{object} not found")]
    NotFound { object: String },

    #[error("Access to {object} denied: {source}")]
    Unauthorized {
        object: String,
        #[source]
        source: kube::Error,
    },

    #[error("Conflicting write to {object}: {source}")]
    Conflict {
        object: String,
        #[source]
        source: kube::Error,
    },

    #[error("Request for {object} failed: {source}")]
    Transport {
        object: String,
        #[source]
        source: kube::Error,
    },

    #[error("Unable to decode {object}: {source}")]
    Decode {
        object: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Classify a kube error raised while working on `object`.
    pub fn from_kube(object: impl Into<String>, err: kube::Error) -> Self {
        let object = object.into();
        let code = match &err {
            kube::Error::Api(response) => Some(response.code),
            _ => None,
        };

        match err {
            kube::Error::SerdeError(source) => Self::Decode { object, source },
            source => match code {
                Some(404) => Self::NotFound { object },
                Some(401 | 403) => Self::Unauthorized { object, source },
                Some(409) => Self::Conflict { object, source },
                _ => Self::Transport { object, source },
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// `Kind/name` reference used in errors and logs.
pub fn object_ref(kind: ResourceKind, name: &str) -> String {
    format!("{kind}/{name}")
}

/// Decode a fetched object into its typed form.
pub fn decode<K: ClusterResource>(name: &str, object: DynamicObject) -> ClientResult<K> {
    serde_json::to_value(object)
        .and_then(serde_json::from_value)
        .map_err(|source| ClientError::Decode {
            object: object_ref(K::KIND, name),
            source,
        })
}

/// Encode a typed object for submission, dropping server-managed bookkeeping.
pub fn encode<K: ClusterResource>(mut resource: K) -> ClientResult<DynamicObject> {
    let name = resource.meta().name.clone().unwrap_or_default();
    resource.meta_mut().managed_fields = None;

    let mut object: DynamicObject = serde_json::to_value(&resource)
        .and_then(serde_json::from_value)
        .map_err(|source| ClientError::Decode {
            object: object_ref(K::KIND, &name),
            source,
        })?;
    object.types = Some(TypeMeta::resource::<K>());

    Ok(object)
}

/// Operations the orchestrator needs from the cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Names of every object of `kind`, in the order the API server returns them.
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<String>>;

    /// Fetch a single object.
    async fn get(&self, kind: ResourceKind, name: &str) -> ClientResult<DynamicObject>;

    /// Write `object` back using the given mode.
    async fn apply(
        &self,
        kind: ResourceKind,
        name: &str,
        object: &DynamicObject,
        mode: ApplyMode,
    ) -> ClientResult<()>;
}

/// [`ResourceClient`] backed by the API server, scoped to one namespace.
pub struct KubeResourceClient {
    client: Client,
    namespace: String,
}

impl KubeResourceClient {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api(&self, kind: ResourceKind) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), &self.namespace, &kind.api_resource())
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<String>> {
        let api = self.api(kind);
        let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
        let mut names = vec![];

        loop {
            let page = api
                .list(&params)
                .await
                .map_err(|e| ClientError::from_kube(kind.to_string(), e))?;
            names.extend(page.items.into_iter().filter_map(|o| o.metadata.name));

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => params = params.continue_token(&token),
                _ => break,
            }
        }

        debug!(%kind, namespace = %self.namespace, count = names.len(), "Listed objects");
        Ok(names)
    }

    async fn get(&self, kind: ResourceKind, name: &str) -> ClientResult<DynamicObject> {
        self.api(kind)
            .get(name)
            .await
            .map_err(|e| ClientError::from_kube(object_ref(kind, name), e))
    }

    async fn apply(
        &self,
        kind: ResourceKind,
        name: &str,
        object: &DynamicObject,
        mode: ApplyMode,
    ) -> ClientResult<()> {
        let api = self.api(kind);
        let post_params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        let result = match mode {
            ApplyMode::Create => api.create(&post_params, object).await,
            ApplyMode::Replace => api.replace(name, &post_params, object).await,
            ApplyMode::MergePatch => {
                let patch_params = PatchParams {
                    field_manager: Some(FIELD_MANAGER.to_string()),
                    ..Default::default()
                };
                api.patch(name, &patch_params, &Patch::Merge(object)).await
            }
        };

        result.map_err(|e| ClientError::from_kube(object_ref(kind, name), e))?;
        debug!(%kind, name, ?mode, "Applied object");
        Ok(())
    }
}
