use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::Utc;
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use tokio::sync::OnceCell;

use crate::{
    features::{
        cluster_config::kube::{fetch_cluster_config, ClusterConfig},
        custom_resources::kube::{default_version, fetch_crds, CustomResourceList},
        rbac::kube::{
            api_group_options, fetch_cluster_roles, fetch_group_versions, fetch_roles,
            GroupVersions, ResourcesCache, ResourcesSnapshot, RoleSummary,
        },
    },
    kube::{
        read_context, read_kubeconfig, KubeClientRequest, KubeContext, KubeTable,
        NamespaceSelection,
    },
    logger,
    message::Message,
};

use super::{
    config::KubeWorkerConfig,
    message::{Kube, KubeRequest, KubeResponse},
};

/// Serves [`KubeRequest`]s against one cluster.
///
/// The discovered group versions and the per-group resources are kept for
/// the lifetime of the handler.
pub struct RequestHandler<C> {
    client: C,
    scope: NamespaceSelection,
    group_versions: OnceCell<GroupVersions>,
    resources: ResourcesCache,
}

impl<C: KubeClientRequest> RequestHandler<C> {
    pub fn new(client: C, scope: NamespaceSelection) -> Self {
        Self {
            client,
            scope,
            group_versions: OnceCell::new(),
            resources: ResourcesCache::new(),
        }
    }

    async fn group_versions(&self) -> Result<&GroupVersions> {
        self.group_versions
            .get_or_try_init(|| fetch_group_versions(&self.client))
            .await
    }

    pub async fn handle(&self, req: KubeRequest) -> KubeResponse {
        let now = Utc::now();

        match req {
            KubeRequest::ClusterRoles => {
                let roles = fetch_cluster_roles(&self.client).await.map(|roles| {
                    roles
                        .into_iter()
                        .map(|role| RoleSummary::from_cluster_role(role, now))
                        .collect()
                });

                KubeResponse::ClusterRoles(roles)
            }
            KubeRequest::Roles => {
                let roles = fetch_roles(&self.client, &self.scope).await.map(|roles| {
                    roles
                        .into_iter()
                        .map(|role| RoleSummary::from_role(role, now))
                        .collect()
                });

                KubeResponse::Roles(roles)
            }
            KubeRequest::Crds => KubeResponse::Crds(fetch_crds(&self.client).await),
            KubeRequest::CustomResources(crd) => KubeResponse::CustomResources {
                crd: crd.metadata.name.clone().unwrap_or_default(),
                result: self.custom_resources(&crd).await,
            },
            KubeRequest::ApiGroups => {
                let options = self.group_versions().await.map(api_group_options);

                KubeResponse::ApiGroups(options)
            }
            KubeRequest::Resources(request) => {
                let result = self.resources(&request.api_groups).await;

                KubeResponse::Resources { request, result }
            }
        }
    }

    async fn custom_resources(
        &self,
        crd: &CustomResourceDefinition,
    ) -> Result<(CustomResourceList, KubeTable)> {
        let version = default_version(crd).ok_or_else(|| {
            anyhow!(
                "{} has no versions",
                crd.metadata.name.as_deref().unwrap_or_default()
            )
        })?;

        let scope = if crd.spec.scope == "Namespaced" {
            self.scope.clone()
        } else {
            NamespaceSelection::All
        };

        let list = CustomResourceList::new(crd, version, scope);

        let table = list.fetch(&self.client).await?;

        Ok((list, table))
    }

    async fn resources(&self, api_groups: &[String]) -> Result<ResourcesSnapshot> {
        let group_versions = self.group_versions().await?;

        self.resources
            .fetch(&self.client, group_versions, api_groups)
            .await
    }
}

pub struct KubeController {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    config: KubeWorkerConfig,
}

impl KubeController {
    pub fn new(tx: Sender<Message>, rx: Receiver<Message>, config: KubeWorkerConfig) -> Self {
        Self { tx, rx, config }
    }

    pub async fn run(self) -> Result<()> {
        let Self { tx, rx, config } = self;

        let kubeconfig = read_kubeconfig(config.kubeconfig.clone())?;

        let context = read_context(&kubeconfig, config.context.as_deref())?;

        let KubeContext {
            name,
            client,
            default_namespace,
        } = KubeContext::try_new(&kubeconfig, &context).await?;

        let scope = config.scope(&default_namespace);

        logger!(info, "connected to {} (scope {})", name, scope);

        tx.send(
            KubeResponse::Connected {
                context: name,
                scope: scope.clone(),
            }
            .into(),
        )?;

        let source = &config.cluster_config;

        let cluster_config = fetch_cluster_config(&client, &source.namespace, &source.name)
            .await
            .unwrap_or_else(|err| {
                logger!(error, "failed to read cluster configuration: {}", err);
                ClusterConfig::default()
            });

        tx.send(KubeResponse::ClusterConfig(cluster_config).into())?;

        let handler = Arc::new(RequestHandler::new(client, scope));

        loop {
            let rx = rx.clone();

            let task = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(1)));

            let Ok(recv) = task.await else { continue };

            match recv {
                Ok(Message::Kube(Kube::Request(req))) => {
                    logger!(debug, "kube request {:?}", req);

                    let handler = handler.clone();
                    let tx = tx.clone();

                    tokio::spawn(async move {
                        let res = handler.handle(req).await;

                        if tx.send(res.into()).is_err() {
                            logger!(error, "failed to send kube response");
                        }
                    });
                }
                Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(anyhow!("kube request channel disconnected"));
                }
            }
        }
    }
}
