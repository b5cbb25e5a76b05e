pub mod cluster_config;
pub mod custom_resources;
pub mod navigation;
pub mod preferences;
pub mod rbac;
