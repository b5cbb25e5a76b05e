use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::{
    config::{ClusterConfigSource, ConfigLoadOption},
    features::preferences::PageSize,
    workers::kube::KubeWorkerConfig,
};

use super::{args::AllNamespaces, SubCommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, disable_help_subcommand = true)]
pub struct Command {
    /// Namespace of the Roles list
    #[arg(short, long, conflicts_with = "all_namespaces", display_order = 1000)]
    pub namespace: Option<String>,

    /// Context
    #[arg(short, long, display_order = 1000)]
    pub context: Option<String>,

    /// List Roles of all namespaces
    //
    // boolだと `num_args = 0..=1` と組み合わせられないため専用のenumにしている
    #[arg(
        short = 'A',
        long,
        value_name = "true|false",
        num_args = 0..=1,
        require_equals = true,
        default_value = "false",
        default_missing_value = "true",
        hide_possible_values = true,
        value_enum,
        display_order = 1000
    )]
    pub all_namespaces: AllNamespaces,

    /// kubeconfig path
    #[arg(short = 'C', long, display_order = 1000)]
    pub kubeconfig: Option<PathBuf>,

    /// Logging
    #[arg(short = 'l', long, display_order = 1000)]
    pub logging: bool,

    /// Config file path
    #[arg(long, display_order = 1000)]
    pub config_file: Option<PathBuf>,

    /// Rows per page (10, 20, 50 or 100). Overrides `preferences.page_size`.
    #[arg(long, value_name = "10|20|50|100", value_parser = parse_page_size, display_order = 1000)]
    pub page_size: Option<PageSize>,

    #[command(subcommand)]
    pub subcommand: Option<SubCommand>,
}

fn parse_page_size(s: &str) -> Result<PageSize, String> {
    s.parse::<PageSize>().map_err(|err| err.to_string())
}

impl Command {
    pub fn init() -> Self {
        Self::parse()
    }

    pub fn kube_worker_config(&self, cluster_config: ClusterConfigSource) -> KubeWorkerConfig {
        let Self {
            namespace,
            context,
            all_namespaces,
            kubeconfig,
            ..
        } = self.clone();

        KubeWorkerConfig {
            kubeconfig,
            context,
            namespace,
            all_namespaces: all_namespaces.into(),
            cluster_config,
        }
    }

    pub fn config_load_option(&self) -> Result<ConfigLoadOption> {
        let path = match &self.config_file {
            Some(path) => path.clone(),
            None => xdg_config_home()?.join("config.yaml"),
        };

        let option = match path.try_exists() {
            Ok(true) => ConfigLoadOption::Path(path),
            Ok(false) => {
                if self.config_file.is_some() {
                    eprintln!("Config file not found: {:?}", path);
                }

                ConfigLoadOption::Default
            }
            Err(err) => {
                eprintln!("Failed to check config file exists: {}", err);

                ConfigLoadOption::Default
            }
        };

        Ok(option)
    }
}

fn xdg_config_home() -> Result<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(path) => Ok(PathBuf::from(path).join("kubeconsole")),
        None => dirs::home_dir()
            .map(|home| home.join(".config").join("kubeconsole"))
            .ok_or_else(|| anyhow::anyhow!("Failed to get home directory")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod namespace {
        use clap::error::ErrorKind;
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn 値を設定しないとエラーを返す() {
            let cmd = Command::try_parse_from(["kubeconsole", "-n"]);
            assert_eq!(cmd.unwrap_err().kind(), ErrorKind::InvalidValue)
        }

        #[test]
        fn namespaceをworker設定に渡す() {
            let cmd = Command::try_parse_from(["kubeconsole", "-n", "dev"]).unwrap();
            let config = cmd.kube_worker_config(ClusterConfigSource::default());

            assert_eq!(config.namespace, Some("dev".to_string()));
            assert!(!config.all_namespaces);
        }

        #[test]
        fn all_namespacesと併用するとエラーを返す() {
            let cmd = Command::try_parse_from(["kubeconsole", "-A", "-n", "dev"]);
            assert_eq!(cmd.unwrap_err().kind(), ErrorKind::ArgumentConflict)
        }
    }

    mod all_namespaces {
        use pretty_assertions::assert_eq;
        use rstest::rstest;

        use super::*;

        #[rstest]
        #[case::flag(&["kubeconsole", "-A"], AllNamespaces::True)]
        #[case::explicit_true(&["kubeconsole", "--all-namespaces=true"], AllNamespaces::True)]
        #[case::explicit_false(&["kubeconsole", "--all-namespaces=false"], AllNamespaces::False)]
        #[case::none(&["kubeconsole"], AllNamespaces::False)]
        fn 設定した値になる(#[case] args: &[&str], #[case] expected: AllNamespaces) {
            let cmd = Command::try_parse_from(args).unwrap();
            assert_eq!(cmd.all_namespaces, expected)
        }
    }

    mod page_size {
        use clap::error::ErrorKind;
        use pretty_assertions::assert_eq;

        use super::*;

        #[test]
        fn 指定しないときはnone() {
            let cmd = Command::try_parse_from(["kubeconsole"]).unwrap();
            assert_eq!(cmd.page_size, None)
        }

        #[test]
        fn 許可された値を設定できる() {
            let cmd = Command::try_parse_from(["kubeconsole", "--page-size", "50"]).unwrap();
            assert_eq!(cmd.page_size, Some(PageSize::Fifty))
        }

        #[test]
        fn 許可されていない値はエラーを返す() {
            let cmd = Command::try_parse_from(["kubeconsole", "--page-size", "30"]);
            assert_eq!(cmd.unwrap_err().kind(), ErrorKind::ValueValidation)
        }
    }
}
