use anyhow::Result;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;

use crate::{
    features::{
        cluster_config::kube::ClusterConfig,
        custom_resources::kube::CustomResourceList,
        rbac::{
            kube::{ApiGroupOption, ResourcesSnapshot, RoleSummary},
            ResourcesRequest,
        },
    },
    kube::{KubeTable, NamespaceSelection},
    message::Message,
};

/// 描画スレッドから kube ワーカーへの要求
#[derive(Debug, Clone)]
pub enum KubeRequest {
    ClusterRoles,
    Roles,
    Crds,
    CustomResources(Box<CustomResourceDefinition>),
    ApiGroups,
    Resources(ResourcesRequest),
}

#[derive(Debug)]
pub enum KubeResponse {
    Connected {
        context: String,
        scope: NamespaceSelection,
    },
    ClusterConfig(ClusterConfig),
    ClusterRoles(Result<Vec<RoleSummary>>),
    Roles(Result<Vec<RoleSummary>>),
    Crds(Result<Vec<CustomResourceDefinition>>),
    /// `crd` is the name of the definition the list was requested for
    CustomResources {
        crd: String,
        result: Result<(CustomResourceList, KubeTable)>,
    },
    ApiGroups(Result<Vec<ApiGroupOption>>),
    Resources {
        request: ResourcesRequest,
        result: Result<ResourcesSnapshot>,
    },
}

#[derive(Debug)]
pub enum Kube {
    Request(KubeRequest),
    Response(KubeResponse),
}

impl From<KubeRequest> for Message {
    fn from(req: KubeRequest) -> Self {
        Message::Kube(Kube::Request(req))
    }
}

impl From<KubeResponse> for Message {
    fn from(res: KubeResponse) -> Self {
        Message::Kube(Kube::Response(res))
    }
}
