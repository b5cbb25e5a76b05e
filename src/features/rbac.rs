pub mod kube {
    mod api_groups;
    mod resources_cache;
    mod role;

    pub use api_groups::*;
    pub use resources_cache::*;
    pub use role::*;
}

pub mod rule;
mod rule_editor;
pub mod validation;

pub use rule_editor::*;
