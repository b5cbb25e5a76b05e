use std::path::PathBuf;

use anyhow::{anyhow, Result};
use kube::{
    config::{KubeConfigOptions, Kubeconfig, KubeconfigError, NamedContext},
    Client, Config,
};

use super::KubeClient;

/// 接続先クラスタの情報
#[derive(Clone)]
pub struct KubeContext {
    pub name: String,
    pub client: KubeClient,
    pub default_namespace: String,
}

pub fn read_kubeconfig(path: Option<PathBuf>) -> Result<Kubeconfig, KubeconfigError> {
    if let Some(path) = path {
        Kubeconfig::read_from(path)
    } else {
        Kubeconfig::read()
    }
}

pub fn read_context(kubeconfig: &Kubeconfig, context: Option<&str>) -> Result<NamedContext> {
    let context = if let Some(context) = context {
        kubeconfig
            .contexts
            .iter()
            .find(|ctx| ctx.name == context)
            .cloned()
            .ok_or_else(|| anyhow!(format!("Cannot find context {}", context)))?
    } else if let Some(current_context) = &kubeconfig.current_context {
        kubeconfig
            .contexts
            .iter()
            .find(|ctx| ctx.name == *current_context)
            .cloned()
            .ok_or_else(|| anyhow!(format!("Cannot find context {}", current_context)))?
    } else {
        kubeconfig
            .contexts
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("Empty contexts"))?
    };

    Ok(context)
}

pub fn read_contexts(path: Option<PathBuf>) -> Result<Vec<String>> {
    let kubeconfig = read_kubeconfig(path)?;

    Ok(kubeconfig
        .contexts
        .iter()
        .map(|ctx| ctx.name.to_string())
        .collect())
}

impl KubeContext {
    pub async fn try_new(kubeconfig: &Kubeconfig, context: &NamedContext) -> Result<Self> {
        let options = KubeConfigOptions {
            context: Some(context.name.to_string()),
            ..Default::default()
        };

        let config = Config::from_custom_kubeconfig(kubeconfig.clone(), &options).await?;

        let default_namespace = config.default_namespace.to_string();

        let client = Client::try_from(config)?;

        Ok(Self {
            name: context.name.to_string(),
            client: KubeClient::new(client),
            default_namespace,
        })
    }
}
