use anyhow::Result;
use chrono::{DateTime, Utc};
use k8s_openapi::{
    api::rbac::v1::{ClusterRole, PolicyRule, Role},
    List,
};

use crate::{
    kube::{KubeClientRequest, KubeTable, KubeTableRow, NamespaceSelection},
    util::creation_age,
};

const RBAC_API: &str = "/apis/rbac.authorization.k8s.io/v1";

/// 編集対象のロール
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRef {
    ClusterRole(String),
    Role { namespace: String, name: String },
}

impl RoleRef {
    pub fn name(&self) -> &str {
        match self {
            Self::ClusterRole(name) => name,
            Self::Role { name, .. } => name,
        }
    }

    /// Scope the rules of this role apply to.
    pub fn scope(&self) -> NamespaceSelection {
        match self {
            Self::ClusterRole(_) => NamespaceSelection::All,
            Self::Role { namespace, .. } => NamespaceSelection::Namespace(namespace.clone()),
        }
    }
}

pub fn cluster_roles_url() -> String {
    format!("{}/clusterroles", RBAC_API)
}

pub fn roles_url(namespace: &NamespaceSelection) -> String {
    match namespace.namespace() {
        Some(ns) => format!("{}/namespaces/{}/roles", RBAC_API, ns),
        None => format!("{}/roles", RBAC_API),
    }
}

pub async fn fetch_cluster_roles<C: KubeClientRequest>(client: &C) -> Result<Vec<ClusterRole>> {
    let list: List<ClusterRole> = client.request(&cluster_roles_url()).await?;

    Ok(list.items)
}

pub async fn fetch_roles<C: KubeClientRequest>(
    client: &C,
    namespace: &NamespaceSelection,
) -> Result<Vec<Role>> {
    let list: List<Role> = client.request(&roles_url(namespace)).await?;

    Ok(list.items)
}

/// 一覧テーブルに変換するための共通表現
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSummary {
    pub role: RoleRef,
    pub rules: Vec<PolicyRule>,
    pub created: Option<String>,
}

impl RoleSummary {
    pub fn from_cluster_role(role: ClusterRole, now: DateTime<Utc>) -> Self {
        let created = age_of(&role.metadata, now);

        Self {
            role: RoleRef::ClusterRole(role.metadata.name.unwrap_or_default()),
            rules: role.rules.unwrap_or_default(),
            created,
        }
    }

    pub fn from_role(role: Role, now: DateTime<Utc>) -> Self {
        let created = age_of(&role.metadata, now);

        Self {
            role: RoleRef::Role {
                namespace: role.metadata.namespace.unwrap_or_default(),
                name: role.metadata.name.unwrap_or_default(),
            },
            rules: role.rules.unwrap_or_default(),
            created,
        }
    }
}

fn age_of(
    metadata: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta,
    now: DateTime<Utc>,
) -> Option<String> {
    let value = serde_json::to_value(metadata).ok()?;

    creation_age(&serde_json::json!({ "metadata": value }), now)
}

pub fn role_table(roles: &[RoleSummary]) -> KubeTable {
    let show_namespace = roles
        .iter()
        .any(|r| matches!(r.role, RoleRef::Role { .. }));

    let mut header = vec!["Name"];
    if show_namespace {
        header.push("Namespace");
    }
    header.extend(["Rules", "Age"]);

    let mut table = KubeTable::new(header);

    for summary in roles {
        let namespace = match &summary.role {
            RoleRef::Role { namespace, .. } => Some(namespace.clone()),
            RoleRef::ClusterRole(_) => None,
        };

        let mut row = vec![summary.role.name().to_string()];

        if show_namespace {
            row.push(namespace.clone().unwrap_or_default());
        }

        row.push(summary.rules.len().to_string());
        row.push(summary.created.clone().unwrap_or_else(|| "-".to_string()));

        table.push_row(KubeTableRow {
            namespace,
            name: summary.role.name().to_string(),
            row,
        });
    }

    table
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use crate::{kube::mock::MockTestKubeClient, mock_expect};

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:10:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn cluster_role() -> ClusterRole {
        serde_yaml::from_str(indoc! {
            "
            apiVersion: rbac.authorization.k8s.io/v1
            kind: ClusterRole
            metadata:
              name: view
              creationTimestamp: 2024-01-01T00:00:00Z
            rules:
              - apiGroups: ['']
                resources: [pods]
                verbs: [get, list]
            "
        })
        .unwrap()
    }

    #[test]
    fn roles_url_depends_on_namespace() {
        assert_eq!(
            roles_url(&NamespaceSelection::Namespace("dev".into())),
            "/apis/rbac.authorization.k8s.io/v1/namespaces/dev/roles"
        );
        assert_eq!(
            roles_url(&NamespaceSelection::All),
            "/apis/rbac.authorization.k8s.io/v1/roles"
        );
    }

    #[test]
    fn cluster_role_table() {
        let summary = RoleSummary::from_cluster_role(cluster_role(), now());

        assert_eq!(summary.role.scope(), NamespaceSelection::All);

        let table = role_table(&[summary]);

        assert_eq!(table.header, vec!["Name", "Rules", "Age"]);
        assert_eq!(table.rows[0].row, vec!["view", "1", "10m"]);
    }

    #[tokio::test]
    async fn fetch_cluster_roles_from_rbac_api() {
        let mut client = MockTestKubeClient::new();

        mock_expect!(
            client,
            request,
            List<ClusterRole>,
            mockall::predicate::eq("/apis/rbac.authorization.k8s.io/v1/clusterroles"),
            Ok(List {
                items: vec![cluster_role()],
                metadata: Default::default(),
            })
        );

        let roles = fetch_cluster_roles(&client).await.unwrap();

        assert_eq!(roles.len(), 1);
    }
}
