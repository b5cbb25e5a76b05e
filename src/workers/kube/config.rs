use std::path::PathBuf;

use crate::{config::ClusterConfigSource, kube::NamespaceSelection};

#[derive(Debug, Default, Clone)]
pub struct KubeWorkerConfig {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    pub cluster_config: ClusterConfigSource,
}

impl KubeWorkerConfig {
    /// `-A` > `-n` > context のデフォルト namespace
    pub fn scope(&self, default_namespace: &str) -> NamespaceSelection {
        if self.all_namespaces {
            return NamespaceSelection::All;
        }

        let namespace = self.namespace.as_deref().unwrap_or(default_namespace);

        NamespaceSelection::from(Some(namespace))
    }
}
