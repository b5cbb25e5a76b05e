use anyhow::Result;
use k8s_openapi::{
    apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition, List,
};

use crate::kube::{KubeClientRequest, KubeTable, KubeTableRow};

pub const CRD_URL: &str = "/apis/apiextensions.k8s.io/v1/customresourcedefinitions";

pub async fn fetch_crds<C: KubeClientRequest>(client: &C) -> Result<Vec<CustomResourceDefinition>> {
    let list: List<CustomResourceDefinition> = client.request(CRD_URL).await?;

    let mut crds = list.items;

    crds.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));

    Ok(crds)
}

pub fn crd_table(crds: &[CustomResourceDefinition]) -> KubeTable {
    let mut table = KubeTable::new(["Name", "Group", "Kind", "Scope", "Versions"]);

    for crd in crds {
        let name = crd.metadata.name.clone().unwrap_or_default();

        let versions = crd
            .spec
            .versions
            .iter()
            .filter(|v| v.served)
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(",");

        table.push_row(KubeTableRow {
            namespace: None,
            name: name.clone(),
            row: vec![
                name,
                crd.spec.group.clone(),
                crd.spec.names.kind.clone(),
                crd.spec.scope.clone(),
                versions,
            ],
        });
    }

    table
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        features::custom_resources::kube::resource_url::tests::crd, kube::mock::MockTestKubeClient,
        mock_expect,
    };

    use super::*;

    #[test]
    fn crd_table_lists_served_versions() {
        let table = crd_table(&[crd()]);

        assert_eq!(
            table.rows[0].row,
            vec![
                "functions.serverless.example.io",
                "serverless.example.io",
                "Function",
                "Namespaced",
                "v1alpha1,v1alpha2"
            ]
        );
    }

    #[tokio::test]
    async fn fetch_crds_sorts_by_name() {
        let mut client = MockTestKubeClient::new();

        mock_expect!(
            client,
            request,
            List<CustomResourceDefinition>,
            mockall::predicate::eq(CRD_URL),
            {
                let mut first = crd();
                first.metadata.name = Some("zones.example.io".into());

                Ok(List {
                    items: vec![first, crd()],
                    metadata: Default::default(),
                })
            }
        );

        let crds = fetch_crds(&client).await.unwrap();

        let names: Vec<_> = crds.iter().map(|c| c.metadata.name.clone().unwrap()).collect();

        assert_eq!(
            names,
            vec!["functions.serverless.example.io", "zones.example.io"]
        );
    }
}
