use anyhow::Result;
use clap::Parser;
use k8s_openapi::api::core::v1::Namespace;
use kube::{api::ListParams, Api, ResourceExt as _};

use crate::kube::{read_context, read_contexts, read_kubeconfig, KubeContext};

use super::Command;

#[derive(Parser, Debug, Clone)]
pub enum SubCommand {
    /// シェル補完スクリプトから呼ばれる
    #[command(subcommand, name = "__complete", hide = true)]
    Complete(CompletionCandidate),
}

#[derive(Parser, Debug, Clone)]
pub enum CompletionCandidate {
    Context {
        #[arg(raw = true)]
        args: Vec<String>,
    },
    Namespace {
        #[arg(raw = true)]
        args: Vec<String>,
    },
}

impl SubCommand {
    pub fn run(self) -> Result<()> {
        let candidates = match self {
            SubCommand::Complete(CompletionCandidate::Context { args }) => complete_context(args)?,
            SubCommand::Complete(CompletionCandidate::Namespace { args }) => {
                complete_namespace(args)?
            }
        };

        candidates.iter().for_each(|candidate| println!("{}", candidate));

        Ok(())
    }
}

fn filter_prefix(candidates: Vec<String>, prefix: Option<&str>) -> Vec<String> {
    match prefix {
        Some(prefix) => candidates
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect(),
        None => candidates,
    }
}

fn complete_context(args: Vec<String>) -> Result<Vec<String>> {
    let cmd = Command::try_parse_from(args)?;

    let contexts = read_contexts(cmd.kubeconfig)?;

    Ok(filter_prefix(contexts, cmd.context.as_deref()))
}

fn complete_namespace(args: Vec<String>) -> Result<Vec<String>> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let cmd = Command::try_parse_from(args)?;

        let kubeconfig = read_kubeconfig(cmd.kubeconfig.clone())?;

        let context = read_context(&kubeconfig, cmd.context.as_deref())?;

        let kube_context = KubeContext::try_new(&kubeconfig, &context).await?;

        let api: Api<Namespace> = Api::all(kube_context.client.to_client());

        let namespaces = api
            .list(&ListParams::default())
            .await?
            .iter()
            .map(|ns| ns.name_any())
            .collect();

        Ok(filter_prefix(namespaces, cmd.namespace.as_deref()))
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn prefixで候補を絞り込む() {
        let candidates = vec!["kind-dev".to_string(), "kind-prod".into(), "minikube".into()];

        assert_eq!(
            filter_prefix(candidates.clone(), Some("kind")),
            vec!["kind-dev", "kind-prod"]
        );
        assert_eq!(filter_prefix(candidates.clone(), None), candidates);
    }

    #[test]
    fn contextの候補をkubeconfigから返す() {
        let dir = std::env::temp_dir().join(format!("kubeconsole-complete-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config");
        std::fs::write(
            &path,
            indoc! {
                "
                apiVersion: v1
                kind: Config
                clusters: []
                users: []
                contexts:
                  - name: kind-dev
                    context: { cluster: dev, user: dev }
                  - name: minikube
                    context: { cluster: minikube, user: minikube }
                "
            },
        )
        .unwrap();

        let args = ["kubeconsole", "-C", path.to_str().unwrap(), "-c", "ki"]
            .iter()
            .map(ToString::to_string)
            .collect();

        let candidates = complete_context(args).unwrap();

        assert_eq!(candidates, vec!["kind-dev"]);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
