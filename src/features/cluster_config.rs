pub mod kube {
    pub(crate) mod cluster_config;

    pub use cluster_config::*;
}
