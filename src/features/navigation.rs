use super::cluster_config::kube::ClusterConfig;

/// コンソール内で開ける画面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    ClusterOverview,
    ClusterDetails,
    ClusterRoles,
    Roles,
    CustomResourceDefinitions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTarget {
    View(ViewId),
    Link(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
    pub id: String,
    pub label: String,
    pub target: NavTarget,
}

impl NavNode {
    fn view(id: &str, label: &str, view: ViewId) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            target: NavTarget::View(view),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavCategory {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub nodes: Vec<NavNode>,
}

/// サイドナビゲーション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    categories: Vec<NavCategory>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            categories: builtin_categories(),
        }
    }
}

fn builtin_categories() -> Vec<NavCategory> {
    vec![
        NavCategory {
            id: "cluster".into(),
            label: "Cluster".into(),
            icon: None,
            nodes: vec![
                NavNode::view("overview", "Cluster Overview", ViewId::ClusterOverview),
                NavNode::view("details", "Cluster Details", ViewId::ClusterDetails),
            ],
        },
        NavCategory {
            id: "configuration".into(),
            label: "Configuration".into(),
            icon: None,
            nodes: vec![
                NavNode::view("cluster-roles", "Cluster Roles", ViewId::ClusterRoles),
                NavNode::view("roles", "Roles", ViewId::Roles),
                NavNode::view(
                    "custom-resource-definitions",
                    "Custom Resource Definitions",
                    ViewId::CustomResourceDefinitions,
                ),
            ],
        },
    ]
}

/// `category.node` or a bare `node` id.
fn is_disabled(disabled: &[String], category: &NavCategory, node: &NavNode) -> bool {
    disabled.iter().any(|entry| match entry.split_once('.') {
        Some((c, n)) => c == category.id && n == node.id,
        None => *entry == node.id,
    })
}

fn category_id(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl Navigation {
    /// Built-in categories without the disabled nodes, followed by the
    /// external categories of the cluster configuration.
    pub fn from_cluster_config(config: &ClusterConfig) -> Self {
        let disabled = config.disabled_nodes();

        let builtin = builtin_categories().into_iter().filter_map(|mut category| {
            let nodes = std::mem::take(&mut category.nodes);

            category.nodes = nodes
                .into_iter()
                .filter(|node| !is_disabled(disabled, &category, node))
                .collect();

            (!category.nodes.is_empty()).then_some(category)
        });

        let external = config
            .external_categories()
            .iter()
            .map(|external| NavCategory {
                id: category_id(&external.category),
                label: external.category.clone(),
                icon: external.icon.clone(),
                nodes: external
                    .children
                    .iter()
                    .map(|child| NavNode {
                        id: category_id(&child.label),
                        label: child.label.clone(),
                        target: NavTarget::Link(child.link.clone()),
                    })
                    .collect(),
            });

        Self {
            categories: builtin.chain(external).collect(),
        }
    }

    pub fn categories(&self) -> &[NavCategory] {
        &self.categories
    }

    /// Nodes in display order.
    pub fn nodes(&self) -> impl Iterator<Item = &NavNode> {
        self.categories.iter().flat_map(|c| c.nodes.iter())
    }

    pub fn contains_view(&self, view: ViewId) -> bool {
        self.nodes().any(|node| node.target == NavTarget::View(view))
    }
}
