mod all_namespaces;

pub use all_namespaces::AllNamespaces;
