use std::path::PathBuf;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::features::preferences::PageSize;

pub const DEFAULT_CLUSTER_CONFIG_NAMESPACE: &str = "kube-public";
pub const DEFAULT_CLUSTER_CONFIG_NAME: &str = "kubeconsole-config";

#[derive(Debug, Default)]
pub enum ConfigLoadOption {
    #[default]
    Default,

    Path(PathBuf),
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreferencesConfig {
    #[serde(default)]
    pub page_size: PageSize,
}

/// 設定を読み込む ConfigMap の場所
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClusterConfigSource {
    pub namespace: String,
    pub name: String,
}

impl Default for ClusterConfigSource {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_CLUSTER_CONFIG_NAMESPACE.to_string(),
            name: DEFAULT_CLUSTER_CONFIG_NAME.to_string(),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub path: Option<PathBuf>,
}

#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub cluster_config: ClusterConfigSource,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load(option: ConfigLoadOption) -> Result<Self> {
        Self::figment(option).extract_lossy().map_err(Into::into)
    }

    fn figment(option: ConfigLoadOption) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Self::default()));

        match option {
            ConfigLoadOption::Default => figment,
            ConfigLoadOption::Path(path) => figment.merge(Yaml::file(path)),
        }
        .merge(Env::prefixed("KUBECONSOLE_").split("__"))
    }
}
