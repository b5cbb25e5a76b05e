pub mod kube {
    mod crd;
    mod custom_resource_list;
    mod printer_column;
    pub(crate) mod resource_url;

    pub use crd::*;
    pub use custom_resource_list::*;
    pub use printer_column::*;
    pub use resource_url::{default_version, resource_url, resource_url_prefix};
}
