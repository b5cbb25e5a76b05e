mod client;
mod context;
mod table;

pub use client::*;
pub use context::*;
pub use table::*;

/// `-all-` はクラスタ全体を表す
pub const ALL_NAMESPACES: &str = "-all-";

/// 一覧表示の対象スコープ
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum NamespaceSelection {
    #[default]
    All,
    Namespace(String),
}

impl NamespaceSelection {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Namespace(ns) => Some(ns),
        }
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self, Self::Namespace(_))
    }
}

impl From<Option<&str>> for NamespaceSelection {
    fn from(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some(ALL_NAMESPACES) => Self::All,
            Some(ns) => Self::Namespace(ns.to_string()),
        }
    }
}

impl From<&str> for NamespaceSelection {
    fn from(value: &str) -> Self {
        Some(value).into()
    }
}

impl std::fmt::Display for NamespaceSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "{}", ALL_NAMESPACES),
            Self::Namespace(ns) => write!(f, "{}", ns),
        }
    }
}
