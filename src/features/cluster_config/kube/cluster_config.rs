use anyhow::Result;
use k8s_openapi::api::core::v1::ConfigMap;
use serde::{Deserialize, Deserializer};
use strum::Display;
use thiserror::Error;

use crate::{kube::KubeClientRequest, logger};

/// ConfigMap のうち設定が入っているキー
pub const CONFIG_KEY: &str = "config";

#[derive(Debug, Error)]
pub enum ClusterConfigError {
    #[error("ConfigMap {namespace}/{name} has no \"config\" key")]
    MissingKey { namespace: String, name: String },

    #[error("malformed cluster configuration: {0}")]
    Malformed(#[from] serde_yaml::Error),
}

/// 設定値の保存先
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display)]
pub enum StorageType {
    #[default]
    #[strum(to_string = "Local storage")]
    LocalStorage,
    #[strum(to_string = "Session storage")]
    SessionStorage,
    #[strum(to_string = "In memory")]
    InMemory,
}

impl From<&str> for StorageType {
    fn from(value: &str) -> Self {
        match value {
            "localStorage" => Self::LocalStorage,
            "sessionStorage" => Self::SessionStorage,
            "inMemory" => Self::InMemory,
            other => {
                logger!(warn, "unknown storage type {:?}; using localStorage", other);
                Self::default()
            }
        }
    }
}

impl<'de> Deserialize<'de> for StorageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Ok(Self::from(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalNode {
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalCategory {
    pub category: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub children: Vec<ExternalNode>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNodesFeature {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub nodes: Vec<ExternalCategory>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabledNodesFeature {
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub nodes: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Features {
    #[serde(rename = "EXTERNAL_NODES", default)]
    pub external_nodes: ExternalNodesFeature,
    #[serde(rename = "DISABLED_NODES", default)]
    pub disabled_nodes: DisabledNodesFeature,
}

/// Console configuration published by the target cluster.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub storage: StorageType,
}

impl ClusterConfig {
    pub fn external_categories(&self) -> &[ExternalCategory] {
        let feature = &self.features.external_nodes;

        if feature.is_enabled {
            &feature.nodes
        } else {
            &[]
        }
    }

    pub fn disabled_nodes(&self) -> &[String] {
        let feature = &self.features.disabled_nodes;

        if feature.is_enabled {
            &feature.nodes
        } else {
            &[]
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    config: ClusterConfig,
}

/// `config` キーの値 (JSON/YAML) を読み込む
pub fn parse_cluster_config(document: &str) -> Result<ClusterConfig, ClusterConfigError> {
    let document: ConfigDocument = serde_yaml::from_str(document)?;

    Ok(document.config)
}

pub fn config_map_url(namespace: &str, name: &str) -> String {
    format!("/api/v1/namespaces/{}/configmaps/{}", namespace, name)
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<kube::Error>(),
        Some(kube::Error::Api(response)) if response.code == 404
    )
}

/// Reads the cluster configuration from `namespace/name`.
///
/// A missing ConfigMap or a malformed document yields the default
/// configuration; other request failures are returned.
pub async fn fetch_cluster_config<C: KubeClientRequest>(
    client: &C,
    namespace: &str,
    name: &str,
) -> Result<ClusterConfig> {
    let config_map: ConfigMap = match client.request(&config_map_url(namespace, name)).await {
        Ok(cm) => cm,
        Err(err) if is_not_found(&err) => {
            logger!(info, "ConfigMap {}/{} not found; using defaults", namespace, name);
            return Ok(ClusterConfig::default());
        }
        Err(err) => return Err(err),
    };

    let document = config_map
        .data
        .as_ref()
        .and_then(|data| data.get(CONFIG_KEY))
        .ok_or_else(|| ClusterConfigError::MissingKey {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

    let parsed = document.and_then(|document| parse_cluster_config(document));

    match parsed {
        Ok(config) => Ok(config),
        Err(err) => {
            logger!(warn, "{}; using defaults", err);
            Ok(ClusterConfig::default())
        }
    }
}
